//! Forward (source) transfer: the state at a program point holds the
//! sources that may reach each location. `analyze_expression` is a pure
//! function of the current state; it never mutates it.

use super::{resolve_bare_identifier, Direction, Transfer};
use crate::label::Label;
use crate::model_store::ModelStore;
use crate::state::{Root, State};
use crate::taint::ForwardTaint;
use crate::tree::TaintTree;
use anyhow::bail;
use ir::{Callable, Expression, ExpressionKind, Statement, StatementKind, TypeAnnotation, TypeStore};
use tracing::{debug, warn};

pub struct ForwardTransfer<'a> {
    pub model_store: &'a dyn ModelStore,
    pub type_store: &'a dyn TypeStore,
    pub callable: Callable,
}

impl<'a> ForwardTransfer<'a> {
    /// General callee resolution, forward flavor: a bare identifier
    /// resolves directly; `receiver.member` additionally consults the type
    /// store for the receiver's static type.
    fn resolve_target(&self, callee: &Expression, program_point_key: &str) -> Option<Callable> {
        if let Some(target) = resolve_bare_identifier(callee) {
            return Some(target);
        }
        if let ExpressionKind::Access { receiver, member } = &callee.kind {
            if let ExpressionKind::Identifier(r) = &receiver.kind {
                let annotation =
                    self.type_store
                        .resolve_receiver_type(self.callable.path(), program_point_key, r)?;
                if let TypeAnnotation::Primitive(p) = annotation {
                    return Some(Callable::new(format!("{p}.{member}")));
                }
            }
        }
        None
    }

    fn analyze_call(
        &self,
        callee: &Expression,
        args: &[Expression],
        program_point_key: &str,
        state: &State<ForwardTaint>,
    ) -> TaintTree<ForwardTaint> {
        let model = self
            .resolve_target(callee, program_point_key)
            .and_then(|target| self.model_store.get_model(&target));
        let mut result = match model {
            // Arguments are not re-analyzed once a model is known; the
            // callee's recorded source taint is trusted as-is.
            Some(summary) => summary.forward.source_taint,
            None => {
                debug!("no forward model for call target, defaulting to argument join");
                args.iter().fold(TaintTree::empty(), |acc, arg| {
                    acc.join(&self.analyze_expression(arg, program_point_key, state))
                })
            }
        };
        // The receiver is always analyzed too: taint does not descend under
        // the method name.
        if let ExpressionKind::Access { receiver, .. } = &callee.kind {
            result = result.join(&self.analyze_expression(receiver, program_point_key, state));
        }
        result
    }

    pub fn analyze_expression(
        &self,
        expr: &Expression,
        program_point_key: &str,
        state: &State<ForwardTaint>,
    ) -> TaintTree<ForwardTaint> {
        match &expr.kind {
            ExpressionKind::Identifier(name) => state.get(&Root::Variable { name: name.clone() }),
            ExpressionKind::Access { receiver, member } => {
                let receiver_taint = self.analyze_expression(receiver, program_point_key, state);
                TaintTree::assign_tree_path(
                    &[Label::Field(member.clone())],
                    TaintTree::empty(),
                    receiver_taint,
                )
            }
            ExpressionKind::Call { callee, args } => {
                self.analyze_call(callee, args, program_point_key, state)
            }
            _ => TaintTree::empty(),
        }
    }
}

impl<'a> Transfer for ForwardTransfer<'a> {
    type Elem = ForwardTaint;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn statement(
        &self,
        stmt: &Statement,
        program_point_key: &str,
        state: &State<ForwardTaint>,
    ) -> anyhow::Result<State<ForwardTaint>> {
        let mut state = state.clone();
        match &stmt.kind {
            StatementKind::Assign { target, value } => {
                let taint = self.analyze_expression(value, program_point_key, &state);
                match crate::access_path::access_path(target) {
                    Some(ap) => state.assign(ap.root, &ap.path, taint),
                    None => warn!("dropping assignment to non-assignable target"),
                }
            }
            StatementKind::Return(Some(expr)) => {
                let taint = self.analyze_expression(expr, program_point_key, &state);
                state.assign(Root::LocalResult, &[], taint);
            }
            StatementKind::Define(_) => bail!("nested function definitions are not supported"),
            _ => {}
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Summary;
    use crate::model_store::InMemoryModelStore;
    use crate::taint::{Lattice, SourceKind};
    use ir::{Meta, NoTypeStore};

    fn meta() -> Meta {
        Meta::new("t.py", 1, 1)
    }

    fn ident(name: &str) -> Expression {
        Expression::new(ExpressionKind::Identifier(name.into()), meta())
    }

    #[test]
    fn identifier_reads_its_variable_slot() {
        let store = InMemoryModelStore::new();
        let types = NoTypeStore;
        let transfer = ForwardTransfer {
            model_store: &store,
            type_store: &types,
            callable: Callable::new("m.f"),
        };
        let mut state = State::<ForwardTaint>::empty();
        state.assign(
            Root::Variable { name: "x".into() },
            &[],
            TaintTree::make_leaf(ForwardTaint::singleton(SourceKind::UserControlled)),
        );
        let taint = transfer.analyze_expression(&ident("x"), "0:0", &state);
        assert!(taint.element().contains(&SourceKind::UserControlled));
    }

    #[test]
    fn unknown_callee_joins_argument_taints() {
        let store = InMemoryModelStore::new();
        let types = NoTypeStore;
        let transfer = ForwardTransfer {
            model_store: &store,
            type_store: &types,
            callable: Callable::new("m.f"),
        };
        let mut state = State::<ForwardTaint>::empty();
        state.assign(
            Root::Variable { name: "x".into() },
            &[],
            TaintTree::make_leaf(ForwardTaint::singleton(SourceKind::TestSource)),
        );
        let call = Expression::new(
            ExpressionKind::Call {
                callee: Box::new(ident("unknown")),
                args: vec![ident("x")],
            },
            meta(),
        );
        let taint = transfer.analyze_expression(&call, "0:0", &state);
        assert!(taint.element().contains(&SourceKind::TestSource));
    }

    #[test]
    fn known_callee_model_supplies_result_taint() {
        let store = InMemoryModelStore::new();
        store.insert(
            Callable::new("source"),
            Summary {
                forward: crate::model::ForwardSummary {
                    source_taint: TaintTree::make_leaf(ForwardTaint::singleton(
                        SourceKind::UserControlled,
                    )),
                },
                backward: Default::default(),
            },
        );
        let types = NoTypeStore;
        let transfer = ForwardTransfer {
            model_store: &store,
            type_store: &types,
            callable: Callable::new("g"),
        };
        let state = State::<ForwardTaint>::empty();
        let call = Expression::new(
            ExpressionKind::Call {
                callee: Box::new(ident("source")),
                args: vec![],
            },
            meta(),
        );
        let taint = transfer.analyze_expression(&call, "0:0", &state);
        assert!(taint.element().contains(&SourceKind::UserControlled));
    }

    #[test]
    fn nested_define_is_fatal() {
        let store = InMemoryModelStore::new();
        let types = NoTypeStore;
        let transfer = ForwardTransfer {
            model_store: &store,
            type_store: &types,
            callable: Callable::new("m.f"),
        };
        let state = State::<ForwardTaint>::empty();
        let nested = Statement::new(
            StatementKind::Define(Box::new(ir::Define::new("inner", "m.f.inner"))),
            meta(),
        );
        assert!(transfer.statement(&nested, "0:0", &state).is_err());
    }
}
