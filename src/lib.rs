//! exprgate: a fail-closed structural validator for untrusted expressions.
//!
//! Given a text string in a Python-style expression language, `exprgate`
//! decides, without evaluating anything, whether the expression stays
//! inside a restricted capability envelope. The decision is an allow-list
//! over syntactic constructs and literal types; anything the policy does not
//! explicitly enumerate is rejected.
//!
//! ```
//! use exprgate::check;
//!
//! assert!(check("price * (1 + tax_rate)").is_ok());
//! assert!(check("lambda x: x").is_err());
//! ```
//!
//! A configurable [`Gate`] supports custom policies:
//!
//! ```
//! use exprgate::{Gate, GrammarTable, NodeKind};
//!
//! let gate = Gate::new().with_grammar(GrammarTable::default_policy().forbid(NodeKind::Call));
//! assert!(gate.check("f(x)").is_err());
//! ```

pub mod cli;
pub mod errors;
pub mod gate;
pub mod policy;
pub mod syntax;
pub mod validator;

pub use errors::{ErrorCategory, ErrorKind, GateError, SourceContext};
pub use gate::{check, Gate, DEFAULT_MAX_DEPTH};
pub use policy::{GrammarTable, LiteralTypeSet};
pub use syntax::{LiteralKind, NodeKind};
