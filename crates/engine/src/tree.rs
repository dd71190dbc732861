//! Access-path tree: a prefix tree whose nodes each carry a taint element.
//! The taint at path `p` is the join of every node's element from the root
//! down to `p`.

use crate::label::Label;
use crate::taint::Lattice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// After this many revisits of a CFG node, widening replaces plain join.
pub(crate) const WIDEN_AFTER_ITERATIONS: usize = 3;
/// Widening collapses any node deeper than this, measured from the tree
/// root, into its parent.
pub(crate) const MAX_TREE_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintTree<E> {
    element: E,
    children: BTreeMap<Label, TaintTree<E>>,
}

impl<E: Lattice> Default for TaintTree<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: Lattice> TaintTree<E> {
    pub fn empty() -> Self {
        Self {
            element: E::bottom(),
            children: BTreeMap::new(),
        }
    }

    /// A tree with only a root element and no children.
    pub fn make_leaf(element: E) -> Self {
        Self {
            element,
            children: BTreeMap::new(),
        }
    }

    /// This node's own element, not accumulated from ancestors.
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn is_empty_tree(&self) -> bool {
        self.element.is_bottom() && self.children.values().all(TaintTree::is_empty_tree)
    }

    /// Returns the subtree rooted at `path`, with every ancestor's element
    /// along the way joined onto the returned root.
    pub fn read(&self, path: &[Label]) -> Self {
        match path.split_first() {
            None => self.clone(),
            Some((label, rest)) => {
                let sub = match self.children.get(label) {
                    Some(child) => child.read(rest),
                    None => Self::empty().read(rest),
                };
                Self {
                    element: sub.element.join(&self.element),
                    children: sub.children,
                }
            }
        }
    }

    /// Replaces whatever is at `path` with `subtree` (strong update).
    pub fn assign(&mut self, path: &[Label], subtree: Self) {
        match path.split_first() {
            None => *self = subtree,
            Some((label, rest)) => {
                let mut child = self.children.remove(label).unwrap_or_else(Self::empty);
                child.assign(rest, subtree);
                self.reinsert(label.clone(), child);
            }
        }
    }

    /// Joins `subtree` into whatever is at `path` (monotone).
    pub fn assign_weak(&mut self, path: &[Label], subtree: Self) {
        match path.split_first() {
            None => *self = self.join(&subtree),
            Some((label, rest)) => {
                let mut child = self.children.remove(label).unwrap_or_else(Self::empty);
                child.assign_weak(rest, subtree);
                self.reinsert(label.clone(), child);
            }
        }
    }

    /// `assign` expressed functionally: place `subtree` at `path` within
    /// `base`, returning the result.
    pub fn assign_tree_path(path: &[Label], mut base: Self, subtree: Self) -> Self {
        base.assign(path, subtree);
        base
    }

    fn reinsert(&mut self, label: Label, child: Self) {
        if !child.is_empty_tree() {
            self.children.insert(label, child);
        }
    }

    pub fn join(&self, other: &Self) -> Self {
        let element = self.element.join(&other.element);
        let mut children = BTreeMap::new();
        let keys = self.children.keys().chain(other.children.keys());
        for label in keys {
            if children.contains_key(label) {
                continue;
            }
            let merged = match (self.children.get(label), other.children.get(label)) {
                (Some(a), Some(b)) => a.join(b),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => unreachable!("label drawn from one of the two key sets"),
            };
            if !merged.is_empty_tree() {
                children.insert(label.clone(), merged);
            }
        }
        Self { element, children }
    }

    pub fn join_trees(a: &Self, b: &Self) -> Self {
        a.join(b)
    }

    pub fn less_or_equal(&self, other: &Self) -> bool {
        if !self.element.less_or_equal(&other.element) {
            return false;
        }
        self.children.iter().all(|(label, child)| {
            let other_child = other.children.get(label);
            match other_child {
                Some(oc) => child.less_or_equal(oc),
                None => child.is_empty_tree(),
            }
        })
    }

    /// Widens `self` (the prior iteration) against `other` (the new
    /// candidate). Must terminate: once `iteration` passes the configured
    /// threshold, any node deeper than `MAX_TREE_DEPTH` is collapsed into
    /// its ancestor, bounding the tree's shape regardless of how the
    /// underlying `E` domain behaves.
    pub fn widen(&self, other: &Self, iteration: usize) -> Self {
        let joined = self.join(other);
        if iteration >= WIDEN_AFTER_ITERATIONS {
            joined.bound_depth(0)
        } else {
            joined
        }
    }

    fn bound_depth(&self, depth: usize) -> Self {
        if depth >= MAX_TREE_DEPTH {
            Self::make_leaf(self.collapse())
        } else {
            let children = self
                .children
                .iter()
                .map(|(label, child)| (label.clone(), child.bound_depth(depth + 1)))
                .collect();
            Self {
                element: self.element.clone(),
                children,
            }
        }
    }

    /// Joins every node in the tree into a single top-level element.
    pub fn collapse(&self) -> E {
        self.children
            .values()
            .fold(self.element.clone(), |acc, child| acc.join(&child.collapse()))
    }

    /// Applies `f` to every node's element, preserving shape.
    pub fn filter_map(&self, f: impl Fn(&E) -> E + Copy) -> Self {
        let element = f(&self.element);
        let children = self
            .children
            .iter()
            .map(|(label, child)| (label.clone(), child.filter_map(f)))
            .filter(|(_, child)| !child.is_empty_tree())
            .collect();
        Self { element, children }
    }
}

impl<E: Lattice> Lattice for TaintTree<E> {
    fn bottom() -> Self {
        Self::empty()
    }

    fn is_bottom(&self) -> bool {
        self.is_empty_tree()
    }

    fn join(&self, other: &Self) -> Self {
        TaintTree::join(self, other)
    }

    fn equivalent(&self, other: &Self) -> bool {
        self == other
    }
}

impl<E: Lattice + Serialize> TaintTree<E> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
