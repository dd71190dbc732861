//! Analysis state: a mapping from roots to access-path trees, with lattice
//! operations lifted pointwise. A missing root is bottom.

use crate::label::{Label, Path};
use crate::taint::Lattice;
use crate::tree::TaintTree;
use ir::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Roots partition the state; no cross-root aliasing is modeled.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Root {
    LocalResult,
    Parameter { position: u32 },
    Variable { name: Identifier },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State<E> {
    roots: BTreeMap<Root, TaintTree<E>>,
}

impl<E: Lattice> Default for State<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: Lattice> State<E> {
    pub fn empty() -> Self {
        Self {
            roots: BTreeMap::new(),
        }
    }

    /// The tree stored at `root`, or an empty (bottom) tree if absent.
    pub fn get(&self, root: &Root) -> TaintTree<E> {
        self.roots.get(root).cloned().unwrap_or_else(TaintTree::empty)
    }

    pub fn read_access_path(&self, root: &Root, path: &Path) -> TaintTree<E> {
        self.get(root).read(path)
    }

    pub fn assign(&mut self, root: Root, path: &[Label], subtree: TaintTree<E>) {
        let mut tree = self.roots.remove(&root).unwrap_or_else(TaintTree::empty);
        tree.assign(path, subtree);
        self.reinsert(root, tree);
    }

    pub fn assign_weak(&mut self, root: Root, path: &[Label], subtree: TaintTree<E>) {
        let mut tree = self.roots.remove(&root).unwrap_or_else(TaintTree::empty);
        tree.assign_weak(path, subtree);
        self.reinsert(root, tree);
    }

    fn reinsert(&mut self, root: Root, tree: TaintTree<E>) {
        if !tree.is_empty_tree() {
            self.roots.insert(root, tree);
        }
    }

    pub fn join(&self, other: &Self) -> Self {
        let mut roots = BTreeMap::new();
        for root in self.roots.keys().chain(other.roots.keys()) {
            if roots.contains_key(root) {
                continue;
            }
            let merged = self.get(root).join(&other.get(root));
            if !merged.is_empty_tree() {
                roots.insert(root.clone(), merged);
            }
        }
        Self { roots }
    }

    pub fn less_or_equal(&self, other: &Self) -> bool {
        self.roots
            .iter()
            .all(|(root, tree)| tree.less_or_equal(&other.get(root)))
    }

    pub fn widen(&self, other: &Self, iteration: usize) -> Self {
        let mut roots = BTreeMap::new();
        for root in self.roots.keys().chain(other.roots.keys()) {
            if roots.contains_key(root) {
                continue;
            }
            let widened = self.get(root).widen(&other.get(root), iteration);
            if !widened.is_empty_tree() {
                roots.insert(root.clone(), widened);
            }
        }
        Self { roots }
    }
}

impl<E: Lattice + serde::Serialize> State<E> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
