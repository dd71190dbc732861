//! The type-resolution store: an external collaborator consulted only by
//! forward-mode call resolution, to turn `receiver.method(...)` into a
//! concrete callable when the receiver's static type is a known nominal
//! type.

use crate::ast::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved static type. Only the nominal case carries a method namespace
/// the analyzer can dispatch into; anything else resolves no target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeAnnotation {
    Primitive(String),
    Unknown,
}

/// Type information attached to one program point (identified by
/// `program_point_key`, conventionally `"{block_id}:{statement_index}"`):
/// the static type of every access-path root visible there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPointTypes {
    pub program_point_key: String,
    pub annotations: HashMap<Identifier, TypeAnnotation>,
}

/// `get_types(function_name) -> Option<sequence<{program_point_key, map<Access,
/// {annotation}>}>>`, as a trait so the core can be driven by whatever
/// type-checking collaborator a caller has.
pub trait TypeStore: Send + Sync {
    fn get_types(&self, function_name: &str) -> Option<Vec<ProgramPointTypes>>;

    /// Looks up the static type of `receiver` at `program_point_key` within
    /// `function_name`, if the store has anything for that point at all.
    fn resolve_receiver_type(
        &self,
        function_name: &str,
        program_point_key: &str,
        receiver: &str,
    ) -> Option<TypeAnnotation> {
        let envs = self.get_types(function_name)?;
        let env = envs
            .into_iter()
            .find(|e| e.program_point_key == program_point_key)?;
        env.annotations.get(receiver).cloned()
    }
}

/// A type store with nothing recorded. Used when no type-resolution
/// collaborator is wired in; every method-call target resolves to "no
/// target", falling back to the default propagation policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypeStore;

impl TypeStore for NoTypeStore {
    fn get_types(&self, _function_name: &str) -> Option<Vec<ProgramPointTypes>> {
        None
    }
}
