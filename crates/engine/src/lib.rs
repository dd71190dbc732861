//! Per-function taint analysis core: the abstract taint domain, the
//! intraprocedural forward/backward dataflow passes, and model extraction.
//!
//! Parsing, CFG construction, interprocedural scheduling, and the
//! type-resolution store are external collaborators this crate only
//! consumes through traits (`ir::TypeStore`, [`model_store::ModelStore`]).

pub mod access_path;
pub mod label;
pub mod model;
pub mod model_store;
pub mod state;
pub mod taint;
mod transfer;
mod tree;

pub use access_path::{access_path, AccessPath};
pub use label::{Label, Path};
pub use model::{extract_backward_model, extract_forward_model, BackwardSummary, ForwardSummary, Summary};
pub use model_store::{InMemoryModelStore, ModelStore};
pub use state::{Root, State};
pub use taint::{BackwardTaint, ForwardTaint, Lattice, SinkKind, SourceKind, TaintSet};
pub use transfer::{BackwardTransfer, Direction, ForwardTransfer, Transfer};
pub use tree::TaintTree;

mod fixpoint;
pub use fixpoint::{run_backward, run_forward};
