//! Access-path extraction: normalizes an AST expression to a `{root, path}`
//! pair when it syntactically denotes an assignable location, or `None`
//! otherwise. No alias inference is performed; anything that isn't a
//! variable or a chain of field accesses ending in a variable yields
//! `None`.

use crate::label::Label;
use crate::state::Root;
use ir::{Expression, ExpressionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPath {
    pub root: Root,
    pub path: Vec<Label>,
}

pub fn access_path(expr: &Expression) -> Option<AccessPath> {
    match &expr.kind {
        ExpressionKind::Identifier(name) => Some(AccessPath {
            root: Root::Variable { name: name.clone() },
            path: Vec::new(),
        }),
        ExpressionKind::Access { receiver, member } => {
            let mut ap = access_path(receiver)?;
            ap.path.push(Label::Field(member.clone()));
            Some(ap)
        }
        _ => None,
    }
}
