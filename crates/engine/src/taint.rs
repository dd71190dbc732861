//! Taint kinds and the lattice element built over them.
//!
//! There are two parallel domains that never mix: `ForwardTaint` (a set of
//! `SourceKind`s, used by the forward/source pass) and `BackwardTaint` (a
//! set of `SinkKind`s, used by the backward/sink+TITO pass). Both share the
//! same `TaintSet<K>` machinery: bottom is the empty set, join is union,
//! `less_or_equal` is subset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where tainted data may have come from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    TestSource,
    UserControlled,
    /// Extension point for sources not wired into this core directly.
    Custom(String),
}

/// Where tainted data may flow to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SinkKind {
    /// Sentinel meaning "flows to the function's return". Used only as a
    /// marker for TITO extraction, never reported as a real sink.
    LocalReturn,
    TestSink,
    RemoteCodeExecution,
    /// Extension point for sinks not wired into this core directly.
    Custom(String),
}

/// A bounded join-semilattice: bottom element, associative commutative
/// idempotent join, and the `less_or_equal` order it induces.
pub trait Lattice: Clone {
    fn bottom() -> Self;
    fn is_bottom(&self) -> bool;
    fn join(&self, other: &Self) -> Self;
    fn less_or_equal(&self, other: &Self) -> bool {
        let joined = self.join(other);
        // Structural equality is sound for finite powerset lattices: `self`
        // is below `other` exactly when joining contributes nothing new.
        joined.equivalent(other)
    }
    /// Structural equivalence, used by `less_or_equal`'s default impl and by
    /// fixpoint convergence checks. Override only if `PartialEq` isn't
    /// available or isn't the right notion of equivalence.
    fn equivalent(&self, other: &Self) -> bool;
}

/// A finite set of taint kinds of a single flavor (sources, xor sinks,
/// never mixed; `K` picks which).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintSet<K: Ord>(BTreeSet<K>);

impl<K: Ord + Clone> Default for TaintSet<K> {
    fn default() -> Self {
        Self::bottom_set()
    }
}

impl<K: Ord + Clone> TaintSet<K> {
    fn bottom_set() -> Self {
        Self(BTreeSet::new())
    }

    pub fn singleton(kind: K) -> Self {
        let mut s = BTreeSet::new();
        s.insert(kind);
        Self(s)
    }

    pub fn contains(&self, kind: &K) -> bool {
        self.0.contains(kind)
    }

    pub fn add(&mut self, kind: K) {
        self.0.insert(kind);
    }

    pub fn kinds(&self) -> impl Iterator<Item = &K> {
        self.0.iter()
    }

    /// Keeps only kinds matching `predicate`. Used by model extraction to
    /// partition `LocalReturn` from real sinks.
    pub fn filter(&self, predicate: impl Fn(&K) -> bool) -> Self {
        Self(self.0.iter().filter(|k| predicate(k)).cloned().collect())
    }
}

impl<K: Ord + Clone> Lattice for TaintSet<K> {
    fn bottom() -> Self {
        Self::bottom_set()
    }

    fn is_bottom(&self) -> bool {
        self.0.is_empty()
    }

    fn join(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    fn equivalent(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

pub type ForwardTaint = TaintSet<SourceKind>;
pub type BackwardTaint = TaintSet<SinkKind>;
