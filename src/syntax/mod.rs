//! Syntax tree types for the expression language.
//!
//! Every construct the parser can produce is represented by a closed, tagged
//! enum, and every node carries the byte span it was parsed from. The
//! [`NodeKind`] tag mirrors that closed set one-to-one so the grammar table
//! can classify constructs without inspecting node payloads.

use serde::{Deserialize, Serialize};

pub mod parser;

/// Byte range into the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A top-level unit of input.
///
/// Only a bare expression statement is admissible; the other variants exist
/// so the entry point can name what it found instead of reporting a vague
/// syntax error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Expr(Expr),
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Box<Expr>,
        op: BinOpKind,
        value: Box<Expr>,
    },
    Import {
        names: Vec<String>,
    },
    ImportFrom {
        module: String,
        names: Vec<String>,
    },
    Delete {
        targets: Vec<Expr>,
    },
    Pass,
    Return(Option<Expr>),
    Raise(Option<Expr>),
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Global {
        names: Vec<String>,
    },
}

impl StmtKind {
    /// Human-readable statement name, used when rejecting non-expressions.
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Expr(_) => "expression",
            StmtKind::Assign { .. } => "assignment",
            StmtKind::AugAssign { .. } => "augmented assignment",
            StmtKind::Import { .. } => "import",
            StmtKind::ImportFrom { .. } => "from-import",
            StmtKind::Delete { .. } => "del",
            StmtKind::Pass => "pass",
            StmtKind::Return(_) => "return",
            StmtKind::Raise(_) => "raise",
            StmtKind::Assert { .. } => "assert",
            StmtKind::Global { .. } => "global",
        }
    }
}

/// An expression node: a tagged kind plus its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The grammar-table tag for this node, or `None` for literal leaves,
    /// which are classified by the literal type set instead.
    pub fn node_kind(&self) -> Option<NodeKind> {
        self.kind.node_kind()
    }
}

/// Every expression construct the parser can produce.
///
/// Child positions are explicit per variant; the validator traverses them by
/// designed intent rather than by iterating over whatever fields exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Starred(Box<Expr>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOpKind,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOpKind,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOpKind>,
        comparators: Vec<Expr>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
}

impl ExprKind {
    pub fn node_kind(&self) -> Option<NodeKind> {
        let kind = match self {
            ExprKind::Literal(_) => return None,
            ExprKind::Name(_) => NodeKind::Name,
            ExprKind::Attribute { .. } => NodeKind::Attribute,
            ExprKind::Subscript { .. } => NodeKind::Subscript,
            ExprKind::Slice { .. } => NodeKind::Slice,
            ExprKind::Call { .. } => NodeKind::Call,
            ExprKind::Starred(_) => NodeKind::Starred,
            ExprKind::Tuple(_) => NodeKind::Tuple,
            ExprKind::List(_) => NodeKind::List,
            ExprKind::Set(_) => NodeKind::Set,
            ExprKind::Dict(_) => NodeKind::Dict,
            ExprKind::UnaryOp { .. } => NodeKind::UnaryOp,
            ExprKind::BinOp { .. } => NodeKind::BinOp,
            ExprKind::BoolOp { .. } => NodeKind::BoolOp,
            ExprKind::Compare { .. } => NodeKind::Compare,
            ExprKind::IfExp { .. } => NodeKind::IfExp,
            ExprKind::Lambda { .. } => NodeKind::Lambda,
            ExprKind::ListComp { .. } => NodeKind::ListComp,
            ExprKind::SetComp { .. } => NodeKind::SetComp,
            ExprKind::DictComp { .. } => NodeKind::DictComp,
            ExprKind::GeneratorExp { .. } => NodeKind::GeneratorExp,
        };
        Some(kind)
    }
}

/// A keyword argument in a call. `arg: None` is the `**mapping` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
    pub span: Span,
}

/// One `for target in iter [if cond]*` clause of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub span: Span,
}

/// A leaf value embedded directly in source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    /// Imaginary literal; the source form never carries a real component.
    Complex(f64),
    Bool(bool),
    None,
    Ellipsis,
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Str(_) => LiteralKind::Str,
            Literal::Bytes(_) => LiteralKind::Bytes,
            Literal::Int(_) => LiteralKind::Int,
            Literal::Float(_) => LiteralKind::Float,
            Literal::Complex(_) => LiteralKind::Complex,
            Literal::Bool(_) => LiteralKind::Bool,
            Literal::None => LiteralKind::NoneType,
            Literal::Ellipsis => LiteralKind::Ellipsis,
        }
    }
}

/// Runtime kind of a literal leaf, checked against the literal type set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Str,
    Bytes,
    Int,
    Float,
    Complex,
    Bool,
    NoneType,
    Ellipsis,
}

impl LiteralKind {
    pub const ALL: &'static [LiteralKind] = &[
        LiteralKind::Str,
        LiteralKind::Bytes,
        LiteralKind::Int,
        LiteralKind::Float,
        LiteralKind::Complex,
        LiteralKind::Bool,
        LiteralKind::NoneType,
        LiteralKind::Ellipsis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Str => "str",
            LiteralKind::Bytes => "bytes",
            LiteralKind::Int => "int",
            LiteralKind::Float => "float",
            LiteralKind::Complex => "complex",
            LiteralKind::Bool => "bool",
            LiteralKind::NoneType => "None",
            LiteralKind::Ellipsis => "Ellipsis",
        }
    }
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOpKind {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinOpKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            BinOpKind::Add => NodeKind::Add,
            BinOpKind::Sub => NodeKind::Sub,
            BinOpKind::Mult => NodeKind::Mult,
            BinOpKind::Div => NodeKind::Div,
            BinOpKind::FloorDiv => NodeKind::FloorDiv,
            BinOpKind::Mod => NodeKind::Mod,
            BinOpKind::Pow => NodeKind::Pow,
            BinOpKind::LShift => NodeKind::LShift,
            BinOpKind::RShift => NodeKind::RShift,
            BinOpKind::BitOr => NodeKind::BitOr,
            BinOpKind::BitXor => NodeKind::BitXor,
            BinOpKind::BitAnd => NodeKind::BitAnd,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOpKind {
    UAdd,
    USub,
    Invert,
    Not,
}

impl UnaryOpKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            UnaryOpKind::UAdd => NodeKind::UAdd,
            UnaryOpKind::USub => NodeKind::USub,
            UnaryOpKind::Invert => NodeKind::Invert,
            UnaryOpKind::Not => NodeKind::Not,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOpKind {
    And,
    Or,
}

impl BoolOpKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            BoolOpKind::And => NodeKind::And,
            BoolOpKind::Or => NodeKind::Or,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOpKind {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOpKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            CmpOpKind::Eq => NodeKind::Eq,
            CmpOpKind::NotEq => NodeKind::NotEq,
            CmpOpKind::Lt => NodeKind::Lt,
            CmpOpKind::LtE => NodeKind::LtE,
            CmpOpKind::Gt => NodeKind::Gt,
            CmpOpKind::GtE => NodeKind::GtE,
            CmpOpKind::Is => NodeKind::Is,
            CmpOpKind::IsNot => NodeKind::IsNot,
            CmpOpKind::In => NodeKind::In,
            CmpOpKind::NotIn => NodeKind::NotIn,
        }
    }
}

/// The tag identifying which syntactic construct a node represents.
///
/// This is the closed set the grammar table classifies. Structural kinds and
/// operator kinds are enumerated at the same granularity so a single operator
/// (say, `Mod`) can be withdrawn from the allow-list without touching the
/// rest of binary arithmetic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Structure
    Name,
    Attribute,
    Subscript,
    Slice,
    Call,
    Keyword,
    Starred,
    Tuple,
    List,
    Dict,
    Set,
    UnaryOp,
    BinOp,
    BoolOp,
    Compare,
    IfExp,
    Lambda,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Comprehension,
    // Binary operators
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    // Unary operators
    UAdd,
    USub,
    Invert,
    Not,
    // Boolean operators
    And,
    Or,
    // Comparison operators
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl NodeKind {
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Name,
        NodeKind::Attribute,
        NodeKind::Subscript,
        NodeKind::Slice,
        NodeKind::Call,
        NodeKind::Keyword,
        NodeKind::Starred,
        NodeKind::Tuple,
        NodeKind::List,
        NodeKind::Dict,
        NodeKind::Set,
        NodeKind::UnaryOp,
        NodeKind::BinOp,
        NodeKind::BoolOp,
        NodeKind::Compare,
        NodeKind::IfExp,
        NodeKind::Lambda,
        NodeKind::ListComp,
        NodeKind::SetComp,
        NodeKind::DictComp,
        NodeKind::GeneratorExp,
        NodeKind::Comprehension,
        NodeKind::Add,
        NodeKind::Sub,
        NodeKind::Mult,
        NodeKind::Div,
        NodeKind::FloorDiv,
        NodeKind::Mod,
        NodeKind::Pow,
        NodeKind::LShift,
        NodeKind::RShift,
        NodeKind::BitOr,
        NodeKind::BitXor,
        NodeKind::BitAnd,
        NodeKind::UAdd,
        NodeKind::USub,
        NodeKind::Invert,
        NodeKind::Not,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Eq,
        NodeKind::NotEq,
        NodeKind::Lt,
        NodeKind::LtE,
        NodeKind::Gt,
        NodeKind::GtE,
        NodeKind::Is,
        NodeKind::IsNot,
        NodeKind::In,
        NodeKind::NotIn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Name => "name",
            NodeKind::Attribute => "attribute",
            NodeKind::Subscript => "subscript",
            NodeKind::Slice => "slice",
            NodeKind::Call => "call",
            NodeKind::Keyword => "keyword",
            NodeKind::Starred => "starred",
            NodeKind::Tuple => "tuple",
            NodeKind::List => "list",
            NodeKind::Dict => "dict",
            NodeKind::Set => "set",
            NodeKind::UnaryOp => "unaryop",
            NodeKind::BinOp => "binop",
            NodeKind::BoolOp => "boolop",
            NodeKind::Compare => "compare",
            NodeKind::IfExp => "ifexp",
            NodeKind::Lambda => "lambda",
            NodeKind::ListComp => "listcomp",
            NodeKind::SetComp => "setcomp",
            NodeKind::DictComp => "dictcomp",
            NodeKind::GeneratorExp => "generatorexp",
            NodeKind::Comprehension => "comprehension",
            NodeKind::Add => "add",
            NodeKind::Sub => "sub",
            NodeKind::Mult => "mult",
            NodeKind::Div => "div",
            NodeKind::FloorDiv => "floordiv",
            NodeKind::Mod => "mod",
            NodeKind::Pow => "pow",
            NodeKind::LShift => "lshift",
            NodeKind::RShift => "rshift",
            NodeKind::BitOr => "bitor",
            NodeKind::BitXor => "bitxor",
            NodeKind::BitAnd => "bitand",
            NodeKind::UAdd => "uadd",
            NodeKind::USub => "usub",
            NodeKind::Invert => "invert",
            NodeKind::Not => "not",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Eq => "eq",
            NodeKind::NotEq => "noteq",
            NodeKind::Lt => "lt",
            NodeKind::LtE => "lte",
            NodeKind::Gt => "gt",
            NodeKind::GtE => "gte",
            NodeKind::Is => "is",
            NodeKind::IsNot => "isnot",
            NodeKind::In => "in",
            NodeKind::NotIn => "notin",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
