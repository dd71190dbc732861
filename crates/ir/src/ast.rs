//! Tagged-variant AST for the expression/statement shapes the taint core
//! understands.
//!
//! Unlike a flattened, stringly-kinded tree, every shape here is a closed
//! enum variant. Adding a new shape is a compile error at every match site
//! until handled: the analyzer's transfer functions (see the `engine`
//! crate) must make an explicit decision for each one rather than falling
//! through a wildcard arm.

use serde::{Deserialize, Serialize};

/// A source-level name: a variable, parameter, field, or function name.
pub type Identifier = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Meta {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Negate,
    Invert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(String),
    Str(String),
    Bool(bool),
    None,
}

/// One expression node, tagged with source location for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub meta: Meta,
}

impl Expression {
    pub fn new(kind: ExpressionKind, meta: Meta) -> Self {
        Self { kind, meta }
    }
}

/// Every expression shape the core's transfer functions dispatch on.
/// Only `Identifier`, `Access`, and `Call` carry special-cased semantics;
/// every other variant is a deliberate under-approximation (empty taint
/// forward, identity backward); see `engine::transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Identifier(Identifier),
    Access {
        receiver: Box<Expression>,
        member: Identifier,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Literal(Literal),
    Comprehension,
    Lambda,
    Comparison {
        left: Box<Expression>,
        ops: Vec<CompareOperator>,
        comparators: Vec<Expression>,
    },
    Await(Box<Expression>),
    Yield(Option<Box<Expression>>),
    Starred(Box<Expression>),
    Ternary {
        test: Box<Expression>,
        body: Box<Expression>,
        orelse: Box<Expression>,
    },
    Tuple(Vec<Expression>),
    List(Vec<Expression>),
    Set(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    BoolOp {
        op: BoolOperator,
        values: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Ellipsis,
}

/// One statement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub meta: Meta,
}

impl Statement {
    pub fn new(kind: StatementKind, meta: Meta) -> Self {
        Self { kind, meta }
    }
}

/// Every statement shape the core's transfer functions dispatch on.
/// Only `Assign` and `Return` carry special-cased semantics; `Define` is
/// fatal (nested function definitions are not supported); every other
/// variant is identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    Assign {
        target: Expression,
        value: Expression,
    },
    Return(Option<Expression>),
    /// A nested function definition. Fatal when reached by the transfer
    /// functions: the top-level `Define` under analysis never appears as a
    /// statement, only its body does.
    Define(Box<crate::Define>),
    Assert(Expression),
    Break,
    Class {
        name: Identifier,
        body: Vec<Statement>,
    },
    Continue,
    Delete(Vec<Expression>),
    /// A bare expression statement, e.g. a call for its side effects.
    Expression(Expression),
    For {
        target: Expression,
        iter: Expression,
        body: Vec<Statement>,
    },
    Global(Vec<Identifier>),
    If {
        test: Expression,
        body: Vec<Statement>,
        orelse: Vec<Statement>,
    },
    Import(String),
    Nonlocal(Vec<Identifier>),
    Pass,
    Raise(Option<Expression>),
    Try {
        body: Vec<Statement>,
        handlers: Vec<Vec<Statement>>,
        orelse: Vec<Statement>,
        finalbody: Vec<Statement>,
    },
    While {
        test: Expression,
        body: Vec<Statement>,
    },
    With {
        items: Vec<Expression>,
        body: Vec<Statement>,
    },
    Yield(Option<Expression>),
    YieldFrom(Expression),
}
