//! Parser adapter: converts raw text into syntax tree nodes.
//!
//! Built on a pest PEG grammar (`grammar.pest`). This stage is purely
//! syntactic; it will happily build nodes for constructs the validator later
//! rejects, such as lambdas or bytes literals. Syntax failures carry the
//! parser's own diagnostic and are never rewritten into policy errors.

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::{
    to_source_span, DiagnosticInfo, ErrorKind, GateError, SourceContext, SourceInfo,
};
use crate::syntax::{
    BinOpKind, BoolOpKind, CmpOpKind, Comprehension, Expr, ExprKind, Keyword, Literal, Span, Stmt,
    StmtKind, UnaryOpKind,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct ExprParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse source text into a sequence of top-level statements.
pub fn parse(source_text: &str, source: &SourceContext) -> Result<Vec<Stmt>, GateError> {
    let pairs = ExprParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, source))?;

    let program = pairs.peek().unwrap(); // pest guarantees the program rule exists

    program
        .into_inner()
        .filter(|p| p.as_rule() == Rule::statement)
        .map(|p| build_stmt(p, source))
        .collect()
}

// ============================================================================
// STATEMENT BUILDERS
// ============================================================================

fn build_stmt(pair: Pair<Rule>, source: &SourceContext) -> Result<Stmt, GateError> {
    let span = get_span(&pair);
    let inner = pair.into_inner().next().unwrap(); // statement wraps exactly one form

    let kind = match inner.as_rule() {
        Rule::expr_stmt => {
            let list = inner.into_inner().next().unwrap();
            StmtKind::Expr(build_expression_list(list, source)?)
        }

        Rule::assignment => {
            let mut parts = inner
                .into_inner()
                .map(|p| build_expression_list(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            let value = parts.pop().unwrap(); // grammar guarantees two or more parts
            StmtKind::Assign {
                targets: parts,
                value,
            }
        }

        Rule::aug_assignment => {
            let mut it = inner.into_inner();
            let target = build_expr(it.next().unwrap(), source)?;
            let op = aug_op_kind(it.next().unwrap().as_str());
            let value = build_expression_list(it.next().unwrap(), source)?;
            StmtKind::AugAssign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            }
        }

        Rule::import_stmt => StmtKind::Import {
            names: inner
                .into_inner()
                .filter(|p| p.as_rule() == Rule::dotted_name)
                .map(|p| p.as_str().to_string())
                .collect(),
        },

        Rule::import_from_stmt => {
            let mut module = String::new();
            let mut names = Vec::new();
            for p in inner.into_inner() {
                match p.as_rule() {
                    Rule::dotted_name => module = p.as_str().to_string(),
                    Rule::ident => names.push(p.as_str().to_string()),
                    _ => {}
                }
            }
            StmtKind::ImportFrom { module, names }
        }

        Rule::del_stmt => {
            let list = find_rule(inner, Rule::expression_list).unwrap(); // grammar guarantees targets
            StmtKind::Delete {
                targets: build_expr_vec(list, source)?,
            }
        }

        Rule::pass_stmt => StmtKind::Pass,

        Rule::return_stmt => {
            let value = match find_rule(inner, Rule::expression_list) {
                Some(list) => Some(build_expression_list(list, source)?),
                None => None,
            };
            StmtKind::Return(value)
        }

        Rule::raise_stmt => {
            let exc = match find_rule(inner, Rule::expression) {
                Some(p) => Some(build_expr(p, source)?),
                None => None,
            };
            StmtKind::Raise(exc)
        }

        Rule::assert_stmt => {
            let mut exprs = inner
                .into_inner()
                .filter(|p| p.as_rule() == Rule::expression)
                .map(|p| build_expr(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            let msg = if exprs.len() > 1 { exprs.pop() } else { None };
            let test = exprs.pop().unwrap(); // grammar guarantees the test expression
            StmtKind::Assert { test, msg }
        }

        Rule::global_stmt => StmtKind::Global {
            names: inner
                .into_inner()
                .filter(|p| p.as_rule() == Rule::ident)
                .map(|p| p.as_str().to_string())
                .collect(),
        },

        rule => {
            return Err(make_error(
                source,
                ErrorKind::Syntax {
                    message: format!("unsupported statement rule: {:?}", rule),
                },
                span,
            ))
        }
    };

    Ok(Stmt { kind, span })
}

// ============================================================================
// EXPRESSION BUILDERS
// ============================================================================

fn build_expr(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::expression | Rule::atom | Rule::literal => {
            let inner = pair.into_inner().next().unwrap(); // single-child wrappers
            build_expr(inner, source)
        }

        Rule::lambda_expr => {
            let mut params = Vec::new();
            let mut body = None;
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::param_names => {
                        params = p
                            .into_inner()
                            .filter(|q| q.as_rule() == Rule::ident)
                            .map(|q| q.as_str().to_string())
                            .collect();
                    }
                    Rule::expression => body = Some(build_expr(p, source)?),
                    _ => {}
                }
            }
            Ok(Expr::new(
                ExprKind::Lambda {
                    params,
                    body: Box::new(body.unwrap()), // grammar guarantees a body
                },
                span,
            ))
        }

        Rule::conditional => {
            let mut parts = pair
                .into_inner()
                .filter(|p| !is_keyword_rule(p.as_rule()))
                .map(|p| build_expr(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            if parts.len() == 1 {
                return Ok(parts.pop().unwrap());
            }
            // grammar guarantees exactly three parts otherwise
            let orelse = parts.pop().unwrap();
            let test = parts.pop().unwrap();
            let body = parts.pop().unwrap();
            Ok(Expr::new(
                ExprKind::IfExp {
                    test: Box::new(test),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                },
                span,
            ))
        }

        Rule::or_test => build_bool_chain(pair, BoolOpKind::Or, source),
        Rule::and_test => build_bool_chain(pair, BoolOpKind::And, source),

        Rule::not_test => {
            let mut nots = 0usize;
            let mut operand = None;
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::kw_not => nots += 1,
                    _ => operand = Some(build_expr(p, source)?),
                }
            }
            let mut expr = operand.unwrap(); // grammar guarantees the comparison
            for _ in 0..nots {
                expr = Expr::new(
                    ExprKind::UnaryOp {
                        op: UnaryOpKind::Not,
                        operand: Box::new(expr),
                    },
                    span,
                );
            }
            Ok(expr)
        }

        Rule::comparison => {
            let mut it = pair.into_inner();
            let left = build_expr(it.next().unwrap(), source)?;
            let mut ops = Vec::new();
            let mut comparators = Vec::new();
            for p in it {
                if p.as_rule() == Rule::comp_op {
                    ops.push(cmp_op_kind(p));
                } else {
                    comparators.push(build_expr(p, source)?);
                }
            }
            if ops.is_empty() {
                return Ok(left);
            }
            Ok(Expr::new(
                ExprKind::Compare {
                    left: Box::new(left),
                    ops,
                    comparators,
                },
                span,
            ))
        }

        Rule::bitor_expr
        | Rule::bitxor_expr
        | Rule::bitand_expr
        | Rule::shift_expr
        | Rule::arith_expr
        | Rule::term => build_left_assoc(pair, source),

        Rule::factor => {
            let mut ops = Vec::new();
            let mut operand = None;
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::unary_op => ops.push((unary_op_kind(p.as_str()), get_span(&p))),
                    _ => operand = Some(build_expr(p, source)?),
                }
            }
            let mut expr = operand.unwrap(); // grammar guarantees the power operand
            for (op, op_span) in ops.into_iter().rev() {
                let wrapped = op_span.join(expr.span);
                expr = Expr::new(
                    ExprKind::UnaryOp {
                        op,
                        operand: Box::new(expr),
                    },
                    wrapped,
                );
            }
            Ok(expr)
        }

        Rule::power => {
            let mut it = pair.into_inner();
            let base = build_expr(it.next().unwrap(), source)?;
            match it.next() {
                None => Ok(base),
                Some(exp) => {
                    let right = build_expr(exp, source)?;
                    Ok(Expr::new(
                        ExprKind::BinOp {
                            left: Box::new(base),
                            op: BinOpKind::Pow,
                            right: Box::new(right),
                        },
                        span,
                    ))
                }
            }
        }

        Rule::postfix => {
            let mut it = pair.into_inner();
            let mut expr = build_expr(it.next().unwrap(), source)?;
            for trailer in it {
                expr = apply_trailer(expr, trailer, source)?;
            }
            Ok(expr)
        }

        Rule::name => {
            let ident = pair.into_inner().next().unwrap();
            Ok(Expr::new(ExprKind::Name(ident.as_str().to_string()), span))
        }

        Rule::number => {
            let inner = pair.into_inner().next().unwrap();
            build_number(inner, source)
        }

        Rule::str_literal => {
            let (raw, inner) = split_quoted(pair.as_str());
            let content = if raw { inner.to_string() } else { unescape(inner) };
            Ok(Expr::new(ExprKind::Literal(Literal::Str(content)), span))
        }

        Rule::bytes_literal => {
            let (raw, inner) = split_quoted(pair.as_str());
            let content = if raw { inner.to_string() } else { unescape(inner) };
            Ok(Expr::new(
                ExprKind::Literal(Literal::Bytes(content.into_bytes())),
                span,
            ))
        }

        Rule::kw_true => Ok(Expr::new(ExprKind::Literal(Literal::Bool(true)), span)),
        Rule::kw_false => Ok(Expr::new(ExprKind::Literal(Literal::Bool(false)), span)),
        Rule::kw_none => Ok(Expr::new(ExprKind::Literal(Literal::None), span)),
        Rule::ellipsis => Ok(Expr::new(ExprKind::Literal(Literal::Ellipsis), span)),

        Rule::empty_tuple => Ok(Expr::new(ExprKind::Tuple(Vec::new()), span)),

        Rule::paren_expr => {
            let inner = pair.into_inner().next().unwrap();
            build_expr(inner, source)
        }

        Rule::tuple_display => {
            let items = pair
                .into_inner()
                .map(|p| build_expr(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprKind::Tuple(items), span))
        }

        Rule::genexp => build_comp_display(pair, span, source, CompForm::Generator),
        Rule::list_comp => build_comp_display(pair, span, source, CompForm::List),
        Rule::set_comp => build_comp_display(pair, span, source, CompForm::Set),

        Rule::list_display => {
            let items = pair
                .into_inner()
                .map(|p| build_expr(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprKind::List(items), span))
        }

        Rule::set_display => {
            let items = pair
                .into_inner()
                .map(|p| build_expr(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprKind::Set(items), span))
        }

        Rule::dict_display => {
            let pairs = pair
                .into_inner()
                .map(|item| {
                    let mut it = item.into_inner();
                    let key = build_expr(it.next().unwrap(), source)?;
                    let value = build_expr(it.next().unwrap(), source)?;
                    Ok((key, value))
                })
                .collect::<Result<Vec<_>, GateError>>()?;
            Ok(Expr::new(ExprKind::Dict(pairs), span))
        }

        Rule::dict_comp => {
            let mut it = pair.into_inner();
            let key = build_expr(it.next().unwrap(), source)?;
            let value = build_expr(it.next().unwrap(), source)?;
            let generators = it
                .map(|p| build_comprehension(p, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(
                ExprKind::DictComp {
                    key: Box::new(key),
                    value: Box::new(value),
                    generators,
                },
                span,
            ))
        }

        rule => Err(make_error(
            source,
            ErrorKind::Syntax {
                message: format!("unsupported rule: {:?}", rule),
            },
            span,
        )),
    }
}

enum CompForm {
    List,
    Set,
    Generator,
}

fn build_comp_display(
    pair: Pair<Rule>,
    span: Span,
    source: &SourceContext,
    form: CompForm,
) -> Result<Expr, GateError> {
    let mut it = pair.into_inner();
    let elt = Box::new(build_expr(it.next().unwrap(), source)?);
    let generators = it
        .map(|p| build_comprehension(p, source))
        .collect::<Result<Vec<_>, _>>()?;
    let kind = match form {
        CompForm::List => ExprKind::ListComp { elt, generators },
        CompForm::Set => ExprKind::SetComp { elt, generators },
        CompForm::Generator => ExprKind::GeneratorExp { elt, generators },
    };
    Ok(Expr::new(kind, span))
}

fn build_comprehension(
    pair: Pair<Rule>,
    source: &SourceContext,
) -> Result<Comprehension, GateError> {
    let span = get_span(&pair);
    let mut target = None;
    let mut iter = None;
    let mut ifs = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::target_list => target = Some(build_target_list(p, source)?),
            Rule::or_test => iter = Some(build_expr(p, source)?),
            Rule::comp_if => {
                let cond = find_rule(p, Rule::or_test).unwrap(); // grammar guarantees a condition
                ifs.push(build_expr(cond, source)?);
            }
            _ => {}
        }
    }
    Ok(Comprehension {
        target: target.unwrap(), // grammar guarantees the binding target
        iter: iter.unwrap(),     // grammar guarantees the iterable
        ifs,
        span,
    })
}

fn build_target_list(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let span = get_span(&pair);
    let mut items = pair
        .into_inner()
        .map(|p| build_expr(p, source))
        .collect::<Result<Vec<_>, _>>()?;
    if items.len() == 1 {
        Ok(items.pop().unwrap())
    } else {
        Ok(Expr::new(ExprKind::Tuple(items), span))
    }
}

fn apply_trailer(
    expr: Expr,
    trailer: Pair<Rule>,
    source: &SourceContext,
) -> Result<Expr, GateError> {
    let trailer_span = get_span(&trailer);
    let span = expr.span.join(trailer_span);
    let inner = trailer.into_inner().next().unwrap(); // trailer wraps exactly one form

    match inner.as_rule() {
        Rule::call_trailer => {
            let mut args = Vec::new();
            let mut keywords = Vec::new();
            for p in inner.into_inner() {
                match p.as_rule() {
                    Rule::genexp_arg => {
                        let genexp_span = get_span(&p);
                        args.push(build_comp_display(
                            p,
                            genexp_span,
                            source,
                            CompForm::Generator,
                        )?);
                    }
                    Rule::argument => {
                        let arg_span = get_span(&p);
                        let arg = p.into_inner().next().unwrap();
                        match arg.as_rule() {
                            Rule::keyword_arg => {
                                let mut it = arg.into_inner();
                                let name = it.next().unwrap().as_str().to_string();
                                let value = build_expr(it.next().unwrap(), source)?;
                                keywords.push(Keyword {
                                    arg: Some(name),
                                    value,
                                    span: arg_span,
                                });
                            }
                            Rule::double_star_arg => {
                                let value = build_expr(arg.into_inner().next().unwrap(), source)?;
                                keywords.push(Keyword {
                                    arg: None,
                                    value,
                                    span: arg_span,
                                });
                            }
                            Rule::star_arg => {
                                let value = build_expr(arg.into_inner().next().unwrap(), source)?;
                                args.push(Expr::new(ExprKind::Starred(Box::new(value)), arg_span));
                            }
                            _ => args.push(build_expr(arg, source)?),
                        }
                    }
                    _ => {}
                }
            }
            Ok(Expr::new(
                ExprKind::Call {
                    func: Box::new(expr),
                    args,
                    keywords,
                },
                span,
            ))
        }

        Rule::subscript_trailer => {
            let mut items = Vec::new();
            let mut has_trailing = false;
            for p in inner.into_inner() {
                match p.as_rule() {
                    Rule::trailing_comma => has_trailing = true,
                    Rule::subscript_item => {
                        let item = p.into_inner().next().unwrap();
                        match item.as_rule() {
                            Rule::slice_item => items.push(build_slice(item, source)?),
                            _ => items.push(build_expr(item, source)?),
                        }
                    }
                    _ => {}
                }
            }
            let index = if items.len() == 1 && !has_trailing {
                items.pop().unwrap()
            } else {
                Expr::new(ExprKind::Tuple(items), trailer_span)
            };
            Ok(Expr::new(
                ExprKind::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            ))
        }

        Rule::attr_trailer => {
            let ident = inner.into_inner().next().unwrap();
            Ok(Expr::new(
                ExprKind::Attribute {
                    value: Box::new(expr),
                    attr: ident.as_str().to_string(),
                },
                span,
            ))
        }

        rule => Err(make_error(
            source,
            ErrorKind::Syntax {
                message: format!("unsupported trailer rule: {:?}", rule),
            },
            span,
        )),
    }
}

/// `a[lo:hi:step]`: the visible `colon` pairs mark which slot each
/// expression fills, since any of the three may be omitted.
fn build_slice(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let span = get_span(&pair);
    let mut slots: [Option<Box<Expr>>; 3] = [None, None, None];
    let mut slot = 0usize;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::colon => slot += 1,
            _ => slots[slot] = Some(Box::new(build_expr(p, source)?)),
        }
    }
    let [lower, upper, step] = slots;
    Ok(Expr::new(ExprKind::Slice { lower, upper, step }, span))
}

fn build_bool_chain(
    pair: Pair<Rule>,
    op: BoolOpKind,
    source: &SourceContext,
) -> Result<Expr, GateError> {
    let span = get_span(&pair);
    let mut values = pair
        .into_inner()
        .filter(|p| !is_keyword_rule(p.as_rule()))
        .map(|p| build_expr(p, source))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() == 1 {
        Ok(values.pop().unwrap())
    } else {
        Ok(Expr::new(ExprKind::BoolOp { op, values }, span))
    }
}

/// Folds `a op b op c` chains into left-leaning binary nodes. The bitwise
/// levels carry their operator implicitly in the rule; the others interleave
/// visible operator pairs.
fn build_left_assoc(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let rule = pair.as_rule();
    let mut it = pair.into_inner();
    let mut expr = build_expr(it.next().unwrap(), source)?;
    let mut pending: Option<BinOpKind> = None;

    for p in it {
        match p.as_rule() {
            Rule::shift_op | Rule::add_op | Rule::mul_op => {
                pending = Some(binary_op_kind(p.as_str()));
            }
            _ => {
                let op = match rule {
                    Rule::bitor_expr => BinOpKind::BitOr,
                    Rule::bitxor_expr => BinOpKind::BitXor,
                    Rule::bitand_expr => BinOpKind::BitAnd,
                    _ => pending.take().unwrap(), // grammar interleaves operator pairs
                };
                let right = build_expr(p, source)?;
                let span = expr.span.join(right.span);
                expr = Expr::new(
                    ExprKind::BinOp {
                        left: Box::new(expr),
                        op,
                        right: Box::new(right),
                    },
                    span,
                );
            }
        }
    }
    Ok(expr)
}

/// Builds a comma-separated expression list; more than one expression, or a
/// trailing comma, denotes a tuple.
fn build_expression_list(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let span = get_span(&pair);
    let mut has_trailing = false;
    let mut exprs = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::trailing_comma => has_trailing = true,
            _ => exprs.push(build_expr(p, source)?),
        }
    }
    if exprs.len() == 1 && !has_trailing {
        Ok(exprs.pop().unwrap())
    } else {
        Ok(Expr::new(ExprKind::Tuple(exprs), span))
    }
}

fn build_expr_vec(pair: Pair<Rule>, source: &SourceContext) -> Result<Vec<Expr>, GateError> {
    pair.into_inner()
        .filter(|p| p.as_rule() != Rule::trailing_comma)
        .map(|p| build_expr(p, source))
        .collect()
}

// ============================================================================
// LITERALS
// ============================================================================

fn build_number(pair: Pair<Rule>, source: &SourceContext) -> Result<Expr, GateError> {
    let span = get_span(&pair);
    let text = pair.as_str();
    let digits: String = text.chars().filter(|c| *c != '_').collect();

    let literal = match pair.as_rule() {
        Rule::int_lit => {
            let parsed = if let Some(rest) = strip_radix_prefix(&digits, "0x", "0X") {
                i64::from_str_radix(rest, 16)
            } else if let Some(rest) = strip_radix_prefix(&digits, "0o", "0O") {
                i64::from_str_radix(rest, 8)
            } else if let Some(rest) = strip_radix_prefix(&digits, "0b", "0B") {
                i64::from_str_radix(rest, 2)
            } else {
                digits.parse::<i64>()
            };
            // Integers beyond 64 bits are rejected rather than silently
            // truncated.
            match parsed {
                Ok(n) => Literal::Int(n),
                Err(_) => {
                    return Err(make_error(
                        source,
                        ErrorKind::InvalidLiteral {
                            literal_type: "integer",
                            value: text.into(),
                        },
                        span,
                    ))
                }
            }
        }
        Rule::float_lit => match digits.parse::<f64>() {
            Ok(n) => Literal::Float(n),
            Err(_) => {
                return Err(make_error(
                    source,
                    ErrorKind::InvalidLiteral {
                        literal_type: "float",
                        value: text.into(),
                    },
                    span,
                ))
            }
        },
        Rule::imaginary => {
            let body = digits.trim_end_matches(['j', 'J']);
            match body.parse::<f64>() {
                Ok(n) => Literal::Complex(n),
                Err(_) => {
                    return Err(make_error(
                        source,
                        ErrorKind::InvalidLiteral {
                            literal_type: "imaginary",
                            value: text.into(),
                        },
                        span,
                    ))
                }
            }
        }
        rule => {
            return Err(make_error(
                source,
                ErrorKind::Syntax {
                    message: format!("unsupported numeric rule: {:?}", rule),
                },
                span,
            ))
        }
    };

    Ok(Expr::new(ExprKind::Literal(literal), span))
}

fn strip_radix_prefix<'a>(text: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    text.strip_prefix(lower).or_else(|| text.strip_prefix(upper))
}

/// Strips string prefix letters and quotes, reporting whether the literal was
/// raw. The grammar guarantees well-formed quoting.
fn split_quoted(text: &str) -> (bool, &str) {
    let mut raw = false;
    let mut idx = 0;
    for ch in text.chars() {
        match ch {
            'r' | 'R' => {
                raw = true;
                idx += 1;
            }
            'b' | 'B' | 'u' | 'U' => idx += 1,
            _ => break,
        }
    }
    let rest = &text[idx..];
    let inner = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        &rest[3..rest.len() - 3]
    } else {
        &rest[1..rest.len() - 1]
    };
    (raw, inner)
}

fn unescape(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            // Unknown escapes are preserved verbatim, as the source
            // language does.
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

// ============================================================================
// OPERATOR TABLES
// ============================================================================

fn binary_op_kind(text: &str) -> BinOpKind {
    match text {
        "+" => BinOpKind::Add,
        "-" => BinOpKind::Sub,
        "*" => BinOpKind::Mult,
        "/" => BinOpKind::Div,
        "//" => BinOpKind::FloorDiv,
        "%" => BinOpKind::Mod,
        "<<" => BinOpKind::LShift,
        ">>" => BinOpKind::RShift,
        other => unreachable!("grammar admits no binary operator {:?}", other),
    }
}

fn unary_op_kind(text: &str) -> UnaryOpKind {
    match text {
        "+" => UnaryOpKind::UAdd,
        "-" => UnaryOpKind::USub,
        "~" => UnaryOpKind::Invert,
        other => unreachable!("grammar admits no unary operator {:?}", other),
    }
}

fn aug_op_kind(text: &str) -> BinOpKind {
    match text {
        "+=" => BinOpKind::Add,
        "-=" => BinOpKind::Sub,
        "*=" => BinOpKind::Mult,
        "/=" => BinOpKind::Div,
        "//=" => BinOpKind::FloorDiv,
        "%=" => BinOpKind::Mod,
        "**=" => BinOpKind::Pow,
        "<<=" => BinOpKind::LShift,
        ">>=" => BinOpKind::RShift,
        "&=" => BinOpKind::BitAnd,
        "|=" => BinOpKind::BitOr,
        "^=" => BinOpKind::BitXor,
        other => unreachable!("grammar admits no augmented operator {:?}", other),
    }
}

fn cmp_op_kind(pair: Pair<Rule>) -> CmpOpKind {
    match pair.clone().into_inner().next().map(|p| p.as_rule()) {
        Some(Rule::not_in_op) => CmpOpKind::NotIn,
        Some(Rule::is_not_op) => CmpOpKind::IsNot,
        Some(Rule::kw_in) => CmpOpKind::In,
        Some(Rule::kw_is) => CmpOpKind::Is,
        _ => match pair.as_str() {
            "==" => CmpOpKind::Eq,
            "!=" => CmpOpKind::NotEq,
            "<=" => CmpOpKind::LtE,
            ">=" => CmpOpKind::GtE,
            "<" => CmpOpKind::Lt,
            ">" => CmpOpKind::Gt,
            other => unreachable!("grammar admits no comparison operator {:?}", other),
        },
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn is_keyword_rule(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_and
            | Rule::kw_or
            | Rule::kw_not
            | Rule::kw_in
            | Rule::kw_is
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_lambda
            | Rule::kw_for
            | Rule::kw_import
            | Rule::kw_from
            | Rule::kw_as
            | Rule::kw_del
            | Rule::kw_pass
            | Rule::kw_return
            | Rule::kw_raise
            | Rule::kw_assert
            | Rule::kw_global
    )
}

fn find_rule(pair: Pair<Rule>, rule: Rule) -> Option<Pair<Rule>> {
    pair.into_inner().find(|p| p.as_rule() == rule)
}

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn make_error(source: &SourceContext, kind: ErrorKind, span: Span) -> GateError {
    let error_code = format!("exprgate::{}::{}", kind.category(), kind.code_suffix());
    GateError {
        kind,
        source_info: SourceInfo {
            source: source.to_named_source(),
            primary_span: to_source_span(span),
        },
        diagnostic_info: DiagnosticInfo {
            help: None,
            error_code,
        },
    }
}

fn convert_parse_error(error: pest::error::Error<Rule>, source: &SourceContext) -> GateError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };
    let message = error.variant.message().to_string();
    make_error(source, ErrorKind::Syntax { message }, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> Stmt {
        let source = SourceContext::from_expression(text);
        let mut stmts = parse(text, &source).expect("parse should succeed");
        assert_eq!(stmts.len(), 1, "expected one statement in {:?}", text);
        stmts.pop().unwrap()
    }

    fn parse_expr(text: &str) -> Expr {
        match parse_one(text).kind {
            StmtKind::Expr(e) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_yields_no_statements() {
        let source = SourceContext::from_expression("");
        assert!(parse("", &source).unwrap().is_empty());
    }

    #[test]
    fn simple_number() {
        let e = parse_expr("42");
        assert_eq!(e.kind, ExprKind::Literal(Literal::Int(42)));
    }

    #[test]
    fn radix_and_underscore_integers() {
        assert_eq!(
            parse_expr("0xFF").kind,
            ExprKind::Literal(Literal::Int(255))
        );
        assert_eq!(
            parse_expr("1_000_000").kind,
            ExprKind::Literal(Literal::Int(1_000_000))
        );
    }

    #[test]
    fn oversized_integer_is_rejected() {
        let text = "99999999999999999999999999";
        let source = SourceContext::from_expression(text);
        let err = parse(text, &source).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::InvalidLiteral {
                literal_type: "integer",
                ..
            }
        ));
    }

    #[test]
    fn unclosed_paren_is_a_syntax_error() {
        let source = SourceContext::from_expression("(1 + 2");
        let err = parse("(1 + 2", &source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    }

    #[test]
    fn assignment_is_parsed_as_a_statement() {
        let stmt = parse_one("x = 1");
        assert!(matches!(stmt.kind, StmtKind::Assign { .. }));
        assert_eq!(stmt.kind.name(), "assignment");
    }

    #[test]
    fn semicolons_separate_statements() {
        let source = SourceContext::from_expression("1 + 1; 2 + 2");
        let stmts = parse("1 + 1; 2 + 2", &source).unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            parse_expr(r#""a\nb""#).kind,
            ExprKind::Literal(Literal::Str("a\nb".into()))
        );
        assert_eq!(
            parse_expr(r#"r"a\nb""#).kind,
            ExprKind::Literal(Literal::Str("a\\nb".into()))
        );
    }
}
