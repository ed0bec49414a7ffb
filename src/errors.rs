//! Unified error handling for the expression gate.
//!
//! Every failure mode (syntax, policy, resource) is represented by a single
//! [`GateError`] carrying a kind, the source it points into, and diagnostic
//! metadata. Callers that only need the coarse classification use
//! [`ErrorCategory`]; `miette` consumers get labeled spans for free.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::{LiteralKind, NodeKind, Span};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// The source text an error points into, with a display name.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Context for a bare expression string with no file of origin.
    pub fn from_expression(content: impl Into<String>) -> Self {
        Self::new("expression", content)
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// All failure modes of the gate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// The text could not be parsed at all. Carries the parser's own
    /// diagnostic, never rewritten into a policy message.
    #[error("syntax error: {message}")]
    Syntax { message: String },
    #[error("invalid {literal_type} literal '{value}'")]
    InvalidLiteral {
        literal_type: &'static str,
        value: String,
    },
    #[error("empty expression")]
    EmptyExpression,
    #[error("expected a single expression, found {count} statements")]
    MultiStatementExpression { count: usize },
    #[error("expected an expression, found {statement} statement")]
    NotAnExpression { statement: &'static str },
    #[error("'{kind}' is not allowed in expressions")]
    DisallowedConstruct { kind: NodeKind },
    #[error("'{kind}' literal is not allowed in expressions")]
    DisallowedLiteral { kind: LiteralKind },
    #[error("expression nesting exceeds the limit of {limit}")]
    ExpressionTooDeep { limit: usize },
}

impl ErrorKind {
    /// Coarse classification for callers that dispatch on failure class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::InvalidLiteral { .. } => ErrorCategory::Syntax,
            Self::EmptyExpression
            | Self::MultiStatementExpression { .. }
            | Self::NotAnExpression { .. }
            | Self::DisallowedConstruct { .. }
            | Self::DisallowedLiteral { .. } => ErrorCategory::Policy,
            Self::ExpressionTooDeep { .. } => ErrorCategory::Resource,
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::EmptyExpression => "empty_expression",
            Self::MultiStatementExpression { .. } => "multi_statement",
            Self::NotAnExpression { .. } => "not_an_expression",
            Self::DisallowedConstruct { .. } => "disallowed_construct",
            Self::DisallowedLiteral { .. } => "disallowed_literal",
            Self::ExpressionTooDeep { .. } => "too_deep",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The text is not a well-formed expression.
    Syntax,
    /// The text parsed but violates the admission policy.
    Policy,
    /// The text exceeded a resource-exhaustion boundary.
    Resource,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Policy => "policy",
            ErrorCategory::Resource => "resource",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THE ERROR TYPE
// ============================================================================

/// Where an error happened.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// The single error type: essential data, no wrapper variants.
#[derive(Debug)]
pub struct GateError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

impl GateError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::Syntax { .. } => "unparseable here".into(),
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::EmptyExpression => "nothing to validate".into(),
            ErrorKind::MultiStatementExpression { .. } => "additional statement".into(),
            ErrorKind::NotAnExpression { statement } => format!("{} statement", statement),
            ErrorKind::DisallowedConstruct { kind } => format!("'{}' used here", kind),
            ErrorKind::DisallowedLiteral { kind } => format!("'{}' literal here", kind),
            ErrorKind::ExpressionTooDeep { .. } => "nesting limit reached here".into(),
        }
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for GateError {}

impl Diagnostic for GateError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.diagnostic_info.help {
            Some(help) => Some(Box::new(help)),
            None => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR CREATION
// ============================================================================

/// Context-aware error creation; each phase builds errors through this so
/// `GateError` structs are never assembled by hand at call sites.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GateError;

    fn disallowed_construct(&self, kind: NodeKind, span: SourceSpan) -> GateError {
        self.report(ErrorKind::DisallowedConstruct { kind }, span)
    }

    fn disallowed_literal(&self, kind: LiteralKind, span: SourceSpan) -> GateError {
        self.report(ErrorKind::DisallowedLiteral { kind }, span)
    }

    fn too_deep(&self, limit: usize, span: SourceSpan) -> GateError {
        self.report(ErrorKind::ExpressionTooDeep { limit }, span)
    }
}

/// Error-reporting state for one `check` call.
#[derive(Debug)]
pub struct CheckSession {
    pub source: SourceContext,
}

impl CheckSession {
    pub fn new(expression: &str) -> Self {
        Self {
            source: SourceContext::from_expression(expression),
        }
    }
}

impl ErrorReporting for CheckSession {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> GateError {
        let error_code = format!("exprgate::{}::{}", kind.category(), kind.code_suffix());
        let help = match &kind {
            ErrorKind::DisallowedConstruct { .. } | ErrorKind::DisallowedLiteral { .. } => Some(
                "only constructs enumerated in the grammar table are admitted".to_string(),
            ),
            ErrorKind::MultiStatementExpression { .. } => {
                Some("supply a single expression without ';' or newlines".to_string())
            }
            _ => None,
        };

        GateError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

/// Converts an AST span to a miette span.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CheckSession {
        CheckSession::new("1 + 1")
    }

    #[test]
    fn categories_partition_the_kinds() {
        let s = session();
        let err = s.report(
            ErrorKind::Syntax {
                message: "unexpected token".into(),
            },
            (0..1).into(),
        );
        assert_eq!(err.category(), ErrorCategory::Syntax);

        let err = s.disallowed_construct(NodeKind::Lambda, (0..1).into());
        assert_eq!(err.category(), ErrorCategory::Policy);

        let err = s.too_deep(100, (0..1).into());
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn error_codes_name_category_and_kind() {
        let err = session().disallowed_literal(LiteralKind::Bytes, (0..1).into());
        assert_eq!(
            err.diagnostic_info.error_code,
            "exprgate::policy::disallowed_literal"
        );
    }

    #[test]
    fn display_names_the_offending_kind() {
        let err = session().disallowed_construct(NodeKind::Lambda, (0..6).into());
        assert_eq!(err.to_string(), "'lambda' is not allowed in expressions");

        let err = session().report(
            ErrorKind::NotAnExpression {
                statement: "assignment",
            },
            (0..5).into(),
        );
        assert_eq!(
            err.to_string(),
            "expected an expression, found assignment statement"
        );
    }
}
