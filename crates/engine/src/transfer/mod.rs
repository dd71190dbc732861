//! Transfer functions: statement- and expression-level updates to the
//! analysis state. Forward and backward share the call-handling recursion
//! structure but read and mutate state differently, see `forward` and
//! `backward`.

mod backward;
mod forward;

pub use backward::BackwardTransfer;
pub use forward::ForwardTransfer;

use crate::taint::Lattice;
use ir::{Callable, Expression, ExpressionKind, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A direction-specific transfer instance, parameterized over the taint
/// domain it operates on so the fixpoint driver can be generic over both
/// passes.
pub trait Transfer {
    type Elem: Lattice + Clone;

    fn direction(&self) -> Direction;

    /// `program_point_key` conventionally identifies this statement's
    /// position as `"{block_id}:{statement_index}"`, the key forward-mode
    /// call resolution hands to the type-resolution store.
    fn statement(
        &self,
        stmt: &Statement,
        program_point_key: &str,
        state: &crate::state::State<Self::Elem>,
    ) -> anyhow::Result<crate::state::State<Self::Elem>>;
}

/// Shared half of general callee resolution: a bare identifier callee
/// always names a callable directly, in both directions. The
/// `Access{receiver, member}` case additionally consults the type store and
/// is forward-mode only, so it lives in `forward` alone.
pub(crate) fn resolve_bare_identifier(callee: &Expression) -> Option<Callable> {
    match &callee.kind {
        ExpressionKind::Identifier(name) => Some(Callable::new(name.clone())),
        _ => None,
    }
}
