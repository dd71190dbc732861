//! Model extraction: projects a fixed-point result into the function's
//! summary, the forward source model, or the backward sink/TITO model.

use crate::label::Label;
use crate::state::{Root, State};
use crate::taint::{BackwardTaint, ForwardTaint, SinkKind};
use crate::tree::TaintTree;
use ir::Parameter;
use serde::{Deserialize, Serialize};

/// Which sources reach the function's return value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardSummary {
    pub source_taint: TaintTree<ForwardTaint>,
}

/// For each formal parameter: which sinks it reaches, and which parts of it
/// flow through to the function's return (TITO).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackwardSummary {
    pub sink_taint: State<BackwardTaint>,
    pub taint_in_taint_out: State<BackwardTaint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub forward: ForwardSummary,
    pub backward: BackwardSummary,
}

/// Reads the exit state's `LocalResult` tree. Every other root is
/// discarded; the forward model only cares what reaches the return value.
pub fn extract_forward_model(exit_state: &State<ForwardTaint>) -> ForwardSummary {
    ForwardSummary {
        source_taint: exit_state.get(&Root::LocalResult),
    }
}

/// For each formal parameter, partitions the entry state's tree at
/// `Variable(name)` into the `LocalReturn`-only part (TITO) and the
/// everything-else part (real sinks). Per parameter, each output starts
/// from the empty tree and is populated only if non-empty.
pub fn extract_backward_model(
    entry_state: &State<BackwardTaint>,
    parameters: &[Parameter],
) -> BackwardSummary {
    let mut sink_taint = State::empty();
    let mut taint_in_taint_out = State::empty();
    for param in parameters {
        let tree = entry_state.get(&Root::Variable {
            name: param.name.clone(),
        });
        let tito_tree = tree.filter_map(|e| e.filter(|k| *k == SinkKind::LocalReturn));
        if !tito_tree.is_empty_tree() {
            taint_in_taint_out.assign(
                Root::Parameter {
                    position: param.position,
                },
                &[] as &[Label],
                tito_tree,
            );
        }
        let sink_tree = tree.filter_map(|e| e.filter(|k| *k != SinkKind::LocalReturn));
        if !sink_tree.is_empty_tree() {
            sink_taint.assign(
                Root::Parameter {
                    position: param.position,
                },
                &[] as &[Label],
                sink_tree,
            );
        }
    }
    BackwardSummary {
        sink_taint,
        taint_in_taint_out,
    }
}
