//! Validation entry point.
//!
//! `Gate` owns a policy configuration and exposes `check`, the one operation
//! the rest of the world calls. The free function [`check`] runs against a
//! shared stock-policy gate.

use once_cell::sync::Lazy;

use crate::errors::{to_source_span, CheckSession, ErrorKind, ErrorReporting, GateError};
use crate::policy::{GrammarTable, LiteralTypeSet, DEFAULT_GRAMMAR, DEFAULT_LITERALS};
use crate::syntax::{parser, Span, StmtKind};
use crate::validator::StructuralValidator;

/// Nesting beyond this many levels is treated as resource exhaustion, not as
/// a policy question.
pub const DEFAULT_MAX_DEPTH: usize = 100;

static DEFAULT_GATE: Lazy<Gate> = Lazy::new(Gate::default);

/// Check an expression against the stock policy.
pub fn check(expression: &str) -> Result<(), GateError> {
    DEFAULT_GATE.check(expression)
}

/// A configured validator: grammar table, literal set, depth limit.
#[derive(Debug, Clone)]
pub struct Gate {
    grammar: GrammarTable,
    literals: LiteralTypeSet,
    max_depth: usize,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            grammar: DEFAULT_GRAMMAR.clone(),
            literals: DEFAULT_LITERALS.clone(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grammar(mut self, grammar: GrammarTable) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_literals(mut self, literals: LiteralTypeSet) -> Self {
        self.literals = literals;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decide whether `expression` is admissible. `Ok(())` means every node
    /// passed the policy; the input is otherwise untouched and unevaluated.
    pub fn check(&self, expression: &str) -> Result<(), GateError> {
        let session = CheckSession::new(expression);

        if expression.trim().is_empty() {
            return Err(session.report(
                ErrorKind::EmptyExpression,
                to_source_span(Span {
                    start: 0,
                    end: expression.len(),
                }),
            ));
        }

        // The depth limit must bound parser recursion, so it is enforced
        // before the parser ever sees the text.
        self.check_nesting(expression, &session)?;

        let stmts = parser::parse(expression, &session.source)?;

        match stmts.len() {
            0 => {
                return Err(session.report(
                    ErrorKind::EmptyExpression,
                    to_source_span(Span {
                        start: 0,
                        end: expression.len(),
                    }),
                ))
            }
            1 => {}
            count => {
                return Err(session.report(
                    ErrorKind::MultiStatementExpression { count },
                    to_source_span(stmts[1].span),
                ))
            }
        }

        let stmt = &stmts[0];
        let expr = match &stmt.kind {
            StmtKind::Expr(expr) => expr,
            other => {
                return Err(session.report(
                    ErrorKind::NotAnExpression {
                        statement: other.name(),
                    },
                    to_source_span(stmt.span),
                ))
            }
        };

        StructuralValidator::new(&self.grammar, &self.literals, self.max_depth, &session)
            .validate(expr)
    }

    /// Pre-parse scan of nesting depth. The parser recurses once per open
    /// bracket, but also once per `else`, `lambda`, and `**`, none of which
    /// any bracket ever closes. All four are counted here, outside string
    /// literals and comments, so pathological input is rejected before it
    /// can exhaust the parser's stack. The scan is conservative: quote
    /// prefixes are ignored and `**` in argument position counts too.
    fn check_nesting(&self, expression: &str, session: &CheckSession) -> Result<(), GateError> {
        let bytes = expression.as_bytes();
        let mut depth = 0usize;
        let mut chain = 0usize;
        let mut in_comment = false;
        // Quote byte and delimiter length of the string being skipped.
        let mut closer: Option<(u8, usize)> = None;
        let mut word_start: Option<usize> = None;
        let mut i = 0usize;

        while i < bytes.len() {
            let b = bytes[i];

            if let Some((quote, len)) = closer {
                let closes = b == quote
                    && (len == 1
                        || (bytes.get(i + 1) == Some(&quote) && bytes.get(i + 2) == Some(&quote)));
                if b == b'\\' {
                    i += 2;
                } else if closes {
                    closer = None;
                    i += len;
                } else {
                    i += 1;
                }
                continue;
            }
            if in_comment {
                if b == b'\n' {
                    in_comment = false;
                }
                i += 1;
                continue;
            }

            if b.is_ascii_alphanumeric() || b == b'_' {
                if word_start.is_none() {
                    word_start = Some(i);
                }
                i += 1;
                continue;
            }
            if let Some(start) = word_start.take() {
                if matches!(&expression[start..i], "else" | "lambda") {
                    chain += 1;
                }
            }

            match b {
                b'\'' | b'"' => {
                    closer = if bytes.get(i + 1) == Some(&b) && bytes.get(i + 2) == Some(&b) {
                        i += 3;
                        Some((b, 3))
                    } else {
                        i += 1;
                        Some((b, 1))
                    };
                    continue;
                }
                b'#' => in_comment = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b'*' => {
                    if bytes.get(i + 1) == Some(&b'*') {
                        chain += 1;
                        i += 1;
                    }
                }
                _ => {}
            }
            if depth + chain > self.max_depth {
                return Err(session.too_deep(
                    self.max_depth,
                    to_source_span(Span {
                        start: i,
                        end: i + 1,
                    }),
                ));
            }
            i += 1;
        }

        if let Some(start) = word_start {
            if matches!(&expression[start..], "else" | "lambda") {
                chain += 1;
            }
        }
        if depth + chain > self.max_depth {
            return Err(session.too_deep(
                self.max_depth,
                to_source_span(Span {
                    start: expression.len().saturating_sub(1),
                    end: expression.len(),
                }),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    #[test]
    fn nesting_scan_ignores_brackets_in_strings() {
        let gate = Gate::new().with_max_depth(2);
        assert!(gate.check(r#""((((((((((""#).is_ok());
    }

    #[test]
    fn nesting_scan_counts_mixed_brackets() {
        let gate = Gate::new().with_max_depth(3);
        let err = gate.check("[({[1]})]").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
        assert!(matches!(
            err.kind,
            ErrorKind::ExpressionTooDeep { limit: 3 }
        ));
    }

    #[test]
    fn unbalanced_closers_do_not_underflow() {
        let gate = Gate::new().with_max_depth(2);
        // Still a syntax error, but the scan itself must survive it.
        let err = gate.check("))))((").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn nesting_scan_reads_triple_quotes_as_one_delimiter() {
        let gate = Gate::new().with_max_depth(2);
        // An odd number of embedded quotes must not leave the scan stuck
        // in the in-string state.
        assert!(gate.check("'''a'b''' + 'c'").is_ok());
        let err = gate.check("'''a'b''' + (((1)))").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn nesting_scan_counts_conditional_chains() {
        let gate = Gate::new().with_max_depth(3);
        assert!(gate.check("1 if a else 2 if b else 3").is_ok());
        let err = gate
            .check("1 if a else 2 if b else 3 if c else 4 if d else 5")
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { limit: 3 }));
    }

    #[test]
    fn nesting_scan_counts_lambda_and_power_chains() {
        let gate = Gate::new().with_max_depth(3);
        let err = gate.check("lambda: lambda: lambda: lambda: 1").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);

        let err = gate.check("2 ** 2 ** 2 ** 2 ** 2").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn keyword_lookalike_names_do_not_count_toward_depth() {
        let gate = Gate::new().with_max_depth(2);
        assert!(gate.check("elsewhere + lambdas + else_ + my_else").is_ok());
    }

    #[test]
    fn chain_tokens_inside_strings_do_not_count() {
        let gate = Gate::new().with_max_depth(1);
        assert!(gate.check("'else else else lambda ** else'").is_ok());
    }
}
