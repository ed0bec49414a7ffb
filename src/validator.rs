//! Structural validator: walks a parsed expression and checks every node
//! against the admission policy.
//!
//! The walk is depth-first, pre-order, and short-circuits on the first
//! violation. Each `ExprKind` variant is traversed explicitly, child by
//! child, so a node kind can never slip through by structural accident:
//! a variant missing from the match below is a compile error, not a bypass.

use crate::errors::{to_source_span, CheckSession, ErrorReporting, GateError};
use crate::policy::{GrammarTable, LiteralTypeSet};
use crate::syntax::{Comprehension, Expr, ExprKind, Keyword, NodeKind};

pub struct StructuralValidator<'a> {
    grammar: &'a GrammarTable,
    literals: &'a LiteralTypeSet,
    max_depth: usize,
    session: &'a CheckSession,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(
        grammar: &'a GrammarTable,
        literals: &'a LiteralTypeSet,
        max_depth: usize,
        session: &'a CheckSession,
    ) -> Self {
        Self {
            grammar,
            literals,
            max_depth,
            session,
        }
    }

    pub fn validate(&self, expr: &Expr) -> Result<(), GateError> {
        self.validate_expr(expr, 0)
    }

    fn validate_expr(&self, expr: &Expr, depth: usize) -> Result<(), GateError> {
        if depth > self.max_depth {
            return Err(self
                .session
                .too_deep(self.max_depth, to_source_span(expr.span)));
        }
        let depth = depth + 1;

        match &expr.kind {
            ExprKind::Literal(literal) => {
                let kind = literal.kind();
                if !self.literals.permits(kind) {
                    return Err(self
                        .session
                        .disallowed_literal(kind, to_source_span(expr.span)));
                }
                Ok(())
            }

            ExprKind::Name(_) => self.require(expr),

            ExprKind::Attribute { value, .. } => {
                self.require(expr)?;
                self.validate_expr(value, depth)
            }

            ExprKind::Subscript { value, index } => {
                self.require(expr)?;
                self.validate_expr(value, depth)?;
                self.validate_expr(index, depth)
            }

            ExprKind::Slice { lower, upper, step } => {
                self.require(expr)?;
                for part in [lower, upper, step].into_iter().flatten() {
                    self.validate_expr(part, depth)?;
                }
                Ok(())
            }

            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                self.require(expr)?;
                self.validate_expr(func, depth)?;
                for arg in args {
                    self.validate_expr(arg, depth)?;
                }
                for keyword in keywords {
                    self.validate_keyword(keyword, depth)?;
                }
                Ok(())
            }

            ExprKind::Starred(value) => {
                self.require(expr)?;
                self.validate_expr(value, depth)
            }

            ExprKind::Tuple(items) | ExprKind::List(items) | ExprKind::Set(items) => {
                self.require(expr)?;
                for item in items {
                    self.validate_expr(item, depth)?;
                }
                Ok(())
            }

            ExprKind::Dict(pairs) => {
                self.require(expr)?;
                for (key, value) in pairs {
                    self.validate_expr(key, depth)?;
                    self.validate_expr(value, depth)?;
                }
                Ok(())
            }

            ExprKind::UnaryOp { op, operand } => {
                self.require(expr)?;
                self.require_kind(op.node_kind(), expr)?;
                self.validate_expr(operand, depth)
            }

            ExprKind::BinOp { left, op, right } => {
                self.require(expr)?;
                self.require_kind(op.node_kind(), expr)?;
                self.validate_expr(left, depth)?;
                self.validate_expr(right, depth)
            }

            ExprKind::BoolOp { op, values } => {
                self.require(expr)?;
                self.require_kind(op.node_kind(), expr)?;
                for value in values {
                    self.validate_expr(value, depth)?;
                }
                Ok(())
            }

            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                self.require(expr)?;
                for op in ops {
                    self.require_kind(op.node_kind(), expr)?;
                }
                self.validate_expr(left, depth)?;
                for comparator in comparators {
                    self.validate_expr(comparator, depth)?;
                }
                Ok(())
            }

            ExprKind::IfExp { test, body, orelse } => {
                self.require(expr)?;
                self.validate_expr(test, depth)?;
                self.validate_expr(body, depth)?;
                self.validate_expr(orelse, depth)
            }

            ExprKind::Lambda { body, .. } => {
                self.require(expr)?;
                self.validate_expr(body, depth)
            }

            ExprKind::ListComp { elt, generators }
            | ExprKind::SetComp { elt, generators }
            | ExprKind::GeneratorExp { elt, generators } => {
                self.require(expr)?;
                self.validate_expr(elt, depth)?;
                for generator in generators {
                    self.validate_comprehension(generator, depth)?;
                }
                Ok(())
            }

            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                self.require(expr)?;
                self.validate_expr(key, depth)?;
                self.validate_expr(value, depth)?;
                for generator in generators {
                    self.validate_comprehension(generator, depth)?;
                }
                Ok(())
            }
        }
    }

    fn validate_keyword(&self, keyword: &Keyword, depth: usize) -> Result<(), GateError> {
        if !self.grammar.permits(NodeKind::Keyword) {
            return Err(self
                .session
                .disallowed_construct(NodeKind::Keyword, to_source_span(keyword.span)));
        }
        self.validate_expr(&keyword.value, depth)
    }

    fn validate_comprehension(
        &self,
        generator: &Comprehension,
        depth: usize,
    ) -> Result<(), GateError> {
        if !self.grammar.permits(NodeKind::Comprehension) {
            return Err(self
                .session
                .disallowed_construct(NodeKind::Comprehension, to_source_span(generator.span)));
        }
        self.validate_expr(&generator.target, depth)?;
        self.validate_expr(&generator.iter, depth)?;
        for condition in &generator.ifs {
            self.validate_expr(condition, depth)?;
        }
        Ok(())
    }

    /// Checks the node's own kind against the table.
    fn require(&self, expr: &Expr) -> Result<(), GateError> {
        match expr.node_kind() {
            Some(kind) => self.require_kind(kind, expr),
            None => Ok(()),
        }
    }

    fn require_kind(&self, kind: NodeKind, expr: &Expr) -> Result<(), GateError> {
        if self.grammar.permits(kind) {
            Ok(())
        } else {
            Err(self
                .session
                .disallowed_construct(kind, to_source_span(expr.span)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::syntax::parser;

    fn validate_with(text: &str, grammar: &GrammarTable) -> Result<(), GateError> {
        let session = CheckSession::new(text);
        let stmts = parser::parse(text, &session.source).expect("test input should parse");
        let expr = match &stmts[0].kind {
            crate::syntax::StmtKind::Expr(e) => e,
            other => panic!("expected expression statement, got {:?}", other),
        };
        let literals = LiteralTypeSet::default_policy();
        StructuralValidator::new(grammar, &literals, 100, &session).validate(expr)
    }

    #[test]
    fn plain_arithmetic_passes() {
        let grammar = GrammarTable::default_policy();
        assert!(validate_with("1 + 2 * 3", &grammar).is_ok());
    }

    #[test]
    fn removing_an_operator_kind_flips_the_verdict() {
        let grammar = GrammarTable::default_policy();
        assert!(validate_with("10 % 3", &grammar).is_ok());

        let grammar = grammar.forbid(NodeKind::Mod);
        let err = validate_with("10 % 3", &grammar).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::DisallowedConstruct {
                kind: NodeKind::Mod
            }
        ));
    }

    #[test]
    fn violation_deep_inside_a_comprehension_is_found() {
        let grammar = GrammarTable::default_policy();
        let text = "[x for x in items if f(lambda y: y)]";
        let err = validate_with(text, &grammar).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::DisallowedConstruct {
                kind: NodeKind::Lambda
            }
        ));
    }

    #[test]
    fn first_violation_wins() {
        let grammar = GrammarTable::default_policy()
            .forbid(NodeKind::Add)
            .forbid(NodeKind::Sub);
        // Pre-order walk reaches the outer (rightmost) operator first.
        let err = validate_with("1 + 2 - 3", &grammar).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::DisallowedConstruct {
                kind: NodeKind::Sub
            }
        ));
    }
}
