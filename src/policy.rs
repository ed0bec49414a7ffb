//! Admission policy: which node kinds and literal types an expression may
//! contain.
//!
//! Both tables are plain allow-lists. Anything not enumerated is rejected,
//! which is the load-bearing property of the whole crate: a construct added
//! to the grammar stays inert until someone deliberately admits it here.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::syntax::{LiteralKind, NodeKind};

// ============================================================================
// GRAMMAR TABLE
// ============================================================================

/// The set of syntactic constructs an expression may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarTable {
    allowed: HashSet<NodeKind>,
}

impl GrammarTable {
    /// An empty table; everything is rejected.
    pub fn empty() -> Self {
        Self {
            allowed: HashSet::new(),
        }
    }

    /// The stock admission policy.
    pub fn default_policy() -> Self {
        Self {
            allowed: NodeKind::ALL
                .iter()
                .copied()
                .filter(|kind| allowed_by_default(*kind))
                .collect(),
        }
    }

    pub fn permit(mut self, kind: NodeKind) -> Self {
        self.allowed.insert(kind);
        self
    }

    pub fn forbid(mut self, kind: NodeKind) -> Self {
        self.allowed.remove(&kind);
        self
    }

    pub fn permits(&self, kind: NodeKind) -> bool {
        self.allowed.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl Default for GrammarTable {
    fn default() -> Self {
        Self::default_policy()
    }
}

/// The stock policy, spelled out per kind. An exhaustive match so that a new
/// `NodeKind` variant forces an explicit decision here.
const fn allowed_by_default(kind: NodeKind) -> bool {
    match kind {
        NodeKind::Name
        | NodeKind::Attribute
        | NodeKind::Subscript
        | NodeKind::Slice
        | NodeKind::Call
        | NodeKind::Keyword
        | NodeKind::Tuple
        | NodeKind::List
        | NodeKind::Dict
        | NodeKind::Set
        | NodeKind::UnaryOp
        | NodeKind::BinOp
        | NodeKind::BoolOp
        | NodeKind::Compare
        | NodeKind::IfExp
        | NodeKind::ListComp
        | NodeKind::SetComp
        | NodeKind::DictComp
        | NodeKind::GeneratorExp
        | NodeKind::Comprehension => true,

        // Deferred code and unpacking stay out of the stock policy.
        NodeKind::Lambda | NodeKind::Starred => false,

        NodeKind::Add
        | NodeKind::Sub
        | NodeKind::Mult
        | NodeKind::Div
        | NodeKind::FloorDiv
        | NodeKind::Mod
        | NodeKind::Pow
        | NodeKind::LShift
        | NodeKind::RShift
        | NodeKind::BitOr
        | NodeKind::BitXor
        | NodeKind::BitAnd
        | NodeKind::UAdd
        | NodeKind::USub
        | NodeKind::Invert
        | NodeKind::Not
        | NodeKind::And
        | NodeKind::Or
        | NodeKind::Eq
        | NodeKind::NotEq
        | NodeKind::Lt
        | NodeKind::LtE
        | NodeKind::Gt
        | NodeKind::GtE
        | NodeKind::Is
        | NodeKind::IsNot
        | NodeKind::In
        | NodeKind::NotIn => true,
    }
}

// ============================================================================
// LITERAL TYPE SET
// ============================================================================

/// The set of literal value types an expression may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralTypeSet {
    allowed: HashSet<LiteralKind>,
}

impl LiteralTypeSet {
    pub fn empty() -> Self {
        Self {
            allowed: HashSet::new(),
        }
    }

    pub fn default_policy() -> Self {
        Self {
            allowed: LiteralKind::ALL
                .iter()
                .copied()
                .filter(|kind| literal_allowed_by_default(*kind))
                .collect(),
        }
    }

    pub fn permit(mut self, kind: LiteralKind) -> Self {
        self.allowed.insert(kind);
        self
    }

    pub fn forbid(mut self, kind: LiteralKind) -> Self {
        self.allowed.remove(&kind);
        self
    }

    pub fn permits(&self, kind: LiteralKind) -> bool {
        self.allowed.contains(&kind)
    }
}

impl Default for LiteralTypeSet {
    fn default() -> Self {
        Self::default_policy()
    }
}

const fn literal_allowed_by_default(kind: LiteralKind) -> bool {
    match kind {
        LiteralKind::Str
        | LiteralKind::Int
        | LiteralKind::Float
        | LiteralKind::Complex
        | LiteralKind::Bool
        | LiteralKind::NoneType => true,
        LiteralKind::Bytes | LiteralKind::Ellipsis => false,
    }
}

// ============================================================================
// SHARED DEFAULTS
// ============================================================================

/// Read-only stock table, shared by every default-configured gate.
pub static DEFAULT_GRAMMAR: Lazy<GrammarTable> = Lazy::new(GrammarTable::default_policy);

/// Read-only stock literal set.
pub static DEFAULT_LITERALS: Lazy<LiteralTypeSet> = Lazy::new(LiteralTypeSet::default_policy);
