//! Model store: the read side of the interprocedural summary cache the
//! fixpoint driver consults when it meets a call to an already-analyzed
//! callable. Construction and population of the store (running callables
//! in dependency order, handling recursion) is the interprocedural
//! driver's job, out of scope here. This just defines the read contract
//! and a simple in-process implementation of it.

use crate::model::Summary;
use ir::Callable;
use std::collections::HashMap;
use std::sync::RwLock;

/// Read-only view a transfer function needs onto previously computed
/// summaries. Implementations may be backed by an in-memory map, a
/// persisted cache, or a lazily-populated one driven by the caller's own
/// scheduling; the core only ever reads through this trait.
pub trait ModelStore: Send + Sync {
    fn get_model(&self, callable: &Callable) -> Option<Summary>;
}

/// Simple in-process store, populated up front by whatever computes
/// summaries in dependency order.
#[derive(Default)]
pub struct InMemoryModelStore {
    models: RwLock<HashMap<Callable, Summary>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, callable: Callable, summary: Summary) {
        self.models
            .write()
            .expect("model store lock poisoned")
            .insert(callable, summary);
    }

    /// Clears all stored models. Test helper only.
    pub fn reset(&self) {
        self.models.write().expect("model store lock poisoned").clear();
    }
}

impl ModelStore for InMemoryModelStore {
    fn get_model(&self, callable: &Callable) -> Option<Summary> {
        self.models
            .read()
            .expect("model store lock poisoned")
            .get(callable)
            .cloned()
    }
}
