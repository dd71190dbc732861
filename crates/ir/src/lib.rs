//! Intermediate representation shared between the taint analyzer core and
//! its external collaborators: a tagged-variant AST, a control-flow graph,
//! callable identities, and the type-resolution store interface. No
//! analysis logic lives here; that is `engine`'s job.

pub mod ast;
pub mod callable;
pub mod cfg;
pub mod define;
pub mod types;

pub use ast::{
    BinaryOperator, BoolOperator, CompareOperator, Expression, ExpressionKind, Identifier,
    Literal, Meta, Statement, StatementKind, UnaryOperator,
};
pub use callable::Callable;
pub use cfg::{BasicBlock, BlockId, Cfg};
pub use define::{Define, Parameter};
pub use types::{NoTypeStore, ProgramPointTypes, TypeAnnotation, TypeStore};
