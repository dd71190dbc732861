//! Backward (sink/TITO) transfer: the state at a program point holds the
//! sinks reachable from each location, propagated from successor state to
//! predecessor state. Unlike forward, `analyze_expression` threads and
//! returns the updated state rather than reading it.

use super::{resolve_bare_identifier, Direction, Transfer};
use crate::label::Label;
use crate::model_store::ModelStore;
use crate::state::{Root, State};
use crate::taint::{BackwardTaint, SinkKind};
use crate::tree::TaintTree;
use anyhow::bail;
use ir::{Callable, Expression, ExpressionKind, Statement, StatementKind};
use tracing::{debug, warn};

pub struct BackwardTransfer<'a> {
    pub model_store: &'a dyn ModelStore,
    pub callable: Callable,
}

impl<'a> BackwardTransfer<'a> {
    /// The intrinsic sinks, recognized only in backward mode.
    fn intrinsic_sink(name: &str) -> Option<SinkKind> {
        match name {
            "__testSink" => Some(SinkKind::TestSink),
            "__testRCESink" => Some(SinkKind::RemoteCodeExecution),
            _ => None,
        }
    }

    fn analyze_call(
        &self,
        incoming: TaintTree<BackwardTaint>,
        callee: &Expression,
        args: &[Expression],
        mut state: State<BackwardTaint>,
    ) -> State<BackwardTaint> {
        if let ExpressionKind::Identifier(name) = &callee.kind {
            if let Some(kind) = Self::intrinsic_sink(name) {
                let leaf = TaintTree::make_leaf(BackwardTaint::singleton(kind));
                for arg in args {
                    state = self.analyze_expression(leaf.clone(), arg, state);
                }
                return state;
            }
        }

        // General callee resolution: in backward mode only the
        // bare-identifier case applies; `receiver.member` never resolves a
        // target here (type resolution is forward-mode only).
        let model = resolve_bare_identifier(callee).and_then(|target| self.model_store.get_model(&target));
        match model {
            Some(summary) => {
                for (index, arg) in args.iter().enumerate() {
                    let position = index as u32;
                    let sink = summary
                        .backward
                        .sink_taint
                        .get(&Root::Parameter { position });
                    let collapsed_incoming = incoming.collapse();
                    let tito = summary
                        .backward
                        .taint_in_taint_out
                        .get(&Root::Parameter { position })
                        .filter_map(|_: &BackwardTaint| collapsed_incoming.clone());
                    state = self.analyze_expression(sink.join(&tito), arg, state);
                }
            }
            None => {
                debug!("no backward model for call target, defaulting to incoming-taint propagation");
                for arg in args {
                    state = self.analyze_expression(incoming.clone(), arg, state);
                }
            }
        }

        // The receiver is always analyzed too, with the incoming taint
        // (taint does not descend under the method name).
        if let ExpressionKind::Access { receiver, .. } = &callee.kind {
            state = self.analyze_expression(incoming, receiver, state);
        }
        state
    }

    pub fn analyze_expression(
        &self,
        incoming: TaintTree<BackwardTaint>,
        expr: &Expression,
        state: State<BackwardTaint>,
    ) -> State<BackwardTaint> {
        match &expr.kind {
            ExpressionKind::Identifier(name) => {
                let mut state = state;
                state.assign_weak(Root::Variable { name: name.clone() }, &[], incoming);
                state
            }
            ExpressionKind::Access { receiver, member } => {
                let wrapped = TaintTree::assign_tree_path(
                    &[Label::Field(member.clone())],
                    TaintTree::empty(),
                    incoming,
                );
                self.analyze_expression(wrapped, receiver, state)
            }
            ExpressionKind::Call { callee, args } => self.analyze_call(incoming, callee, args, state),
            _ => state,
        }
    }
}

impl<'a> Transfer for BackwardTransfer<'a> {
    type Elem = BackwardTaint;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn statement(
        &self,
        stmt: &Statement,
        _program_point_key: &str,
        state: &State<BackwardTaint>,
    ) -> anyhow::Result<State<BackwardTaint>> {
        let state = state.clone();
        let result = match &stmt.kind {
            StatementKind::Assign { target, value } => {
                let incoming = match crate::access_path::access_path(target) {
                    Some(ap) => state.read_access_path(&ap.root, &ap.path),
                    None => {
                        warn!("assignment target is not a syntactic access path, treating as unread");
                        TaintTree::empty()
                    }
                };
                self.analyze_expression(incoming, value, state)
            }
            StatementKind::Return(Some(expr)) => {
                let incoming = state.get(&Root::LocalResult);
                self.analyze_expression(incoming, expr, state)
            }
            StatementKind::Expression(expr) => self.analyze_expression(TaintTree::empty(), expr, state),
            StatementKind::Define(_) => bail!("nested function definitions are not supported"),
            _ => state,
        };
        Ok(result)
    }
}
