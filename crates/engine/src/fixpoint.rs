//! Fixpoint driver binding: wires a `State` and a `Transfer` instance into
//! a worklist-based CFG fixpoint, running forward from the entry block or
//! backward from the exit block.

use crate::model::{extract_backward_model, extract_forward_model, BackwardSummary, ForwardSummary};
use crate::state::{Root, State};
use crate::taint::{BackwardTaint, ForwardTaint, Lattice, SinkKind};
use crate::transfer::{Direction, Transfer};
use crate::tree::TaintTree;
use anyhow::{bail, Result};
use ir::{BlockId, Cfg, Define, Statement};
use std::collections::{HashMap, VecDeque};

/// Safety net against a runaway fixpoint: with widening bounding the
/// lattice height this should never be approached, but the driver may
/// bound iterations globally and accept the current over-approximation
/// rather than loop forever.
const MAX_TOTAL_STEPS: usize = 10_000;

fn run_fixpoint<T: Transfer>(
    cfg: &Cfg,
    transfer: &T,
    direction: Direction,
    seed: State<T::Elem>,
) -> Result<State<T::Elem>> {
    let seed_block = match direction {
        Direction::Forward => cfg.entry,
        Direction::Backward => cfg.exit,
    };

    let mut out_states: HashMap<BlockId, State<T::Elem>> = cfg
        .block_ids()
        .map(|id| (id, State::empty()))
        .collect();
    let mut visit_counts: HashMap<BlockId, usize> = HashMap::new();
    let mut worklist: VecDeque<BlockId> = cfg.block_ids().collect();
    let mut steps = 0usize;

    while let Some(id) = worklist.pop_front() {
        steps += 1;
        if steps > MAX_TOTAL_STEPS {
            break;
        }

        let preds: &[BlockId] = match direction {
            Direction::Forward => cfg.predecessors(id),
            Direction::Backward => cfg.successors(id),
        };
        let mut input = if id == seed_block {
            seed.clone()
        } else {
            State::empty()
        };
        for pred in preds {
            input = input.join(out_states.get(pred).expect("every block has an out-state"));
        }

        let block = cfg.block(id).expect("worklist only holds ids present in the cfg");
        let ordered: Vec<&Statement> = match direction {
            Direction::Forward => block.statements.iter().collect(),
            Direction::Backward => block.statements.iter().rev().collect(),
        };
        let mut state = input;
        for (index, stmt) in ordered.into_iter().enumerate() {
            let program_point_key = format!("{id}:{index}");
            state = transfer.statement(stmt, &program_point_key, &state)?;
        }

        let iteration = *visit_counts.entry(id).or_insert(0);
        visit_counts.insert(id, iteration + 1);
        let previous = out_states.get(&id).expect("every block has an out-state");
        let merged = previous.widen(&state, iteration);
        if merged != *previous {
            let successors: &[BlockId] = match direction {
                Direction::Forward => cfg.successors(id),
                Direction::Backward => cfg.predecessors(id),
            };
            out_states.insert(id, merged);
            for succ in successors {
                if !worklist.contains(succ) {
                    worklist.push_back(*succ);
                }
            }
        }
    }

    let result_block = match direction {
        Direction::Forward => cfg.exit,
        Direction::Backward => cfg.entry,
    };
    Ok(out_states.remove(&result_block).unwrap_or_else(State::empty))
}

/// Runs the forward pass from an empty initial state and extracts the
/// function's source model from the exit state.
pub fn run_forward<T>(define: &Define, cfg: &Cfg, transfer: &T) -> Result<ForwardSummary>
where
    T: Transfer<Elem = ForwardTaint>,
{
    let _ = define;
    if transfer.direction() != Direction::Forward {
        bail!("run_forward called with a backward transfer");
    }
    let exit_state = run_fixpoint(cfg, transfer, Direction::Forward, State::empty())?;
    Ok(extract_forward_model(&exit_state))
}

/// Runs the backward pass seeded with `LocalResult ↦ {LocalReturn}` and
/// extracts the per-parameter sink/TITO model from the entry state.
pub fn run_backward<T>(define: &Define, cfg: &Cfg, transfer: &T) -> Result<BackwardSummary>
where
    T: Transfer<Elem = BackwardTaint>,
{
    if transfer.direction() != Direction::Backward {
        bail!("run_backward called with a forward transfer");
    }
    let mut seed = State::empty();
    seed.assign(
        Root::LocalResult,
        &[],
        TaintTree::make_leaf(BackwardTaint::singleton(SinkKind::LocalReturn)),
    );
    let entry_state = run_fixpoint(cfg, transfer, Direction::Backward, seed)?;
    Ok(extract_backward_model(&entry_state, &define.parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_store::InMemoryModelStore;
    use crate::taint::SourceKind;
    use crate::transfer::{BackwardTransfer, ForwardTransfer};
    use ir::{Callable, Expression, ExpressionKind, Literal, Meta, NoTypeStore, Parameter, StatementKind};

    fn meta() -> Meta {
        Meta::new("t.py", 1, 1)
    }

    fn ident(name: &str) -> Expression {
        Expression::new(ExpressionKind::Identifier(name.into()), meta())
    }

    fn call(callee: &str, args: Vec<Expression>) -> Expression {
        Expression::new(
            ExpressionKind::Call {
                callee: Box::new(ident(callee)),
                args,
            },
            meta(),
        )
    }

    // def f(x, y): __testSink(x)
    #[test]
    fn scenario_test_sink_on_a_parameter() {
        let body = vec![Statement::new(
            StatementKind::Expression(call("__testSink", vec![ident("x")])),
            meta(),
        )];
        let define = Define::new("f", "m.f").with_parameters(vec![
            Parameter {
                position: 0,
                name: "x".into(),
            },
            Parameter {
                position: 1,
                name: "y".into(),
            },
        ]).with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let transfer = BackwardTransfer {
            model_store: &store,
            callable: Callable::new("m.f"),
        };
        let model = run_backward(&define, &cfg, &transfer).unwrap();
        let p0 = model.sink_taint.get(&Root::Parameter { position: 0 });
        let p1 = model.sink_taint.get(&Root::Parameter { position: 1 });
        assert!(p0.element().contains(&SinkKind::TestSink));
        assert!(p1.is_empty_tree());
        assert!(model
            .taint_in_taint_out
            .get(&Root::Parameter { position: 0 })
            .is_empty_tree());
    }

    // def f(p): __testRCESink(p.q)
    #[test]
    fn scenario_rce_through_field_access() {
        let access = Expression::new(
            ExpressionKind::Access {
                receiver: Box::new(ident("p")),
                member: "q".into(),
            },
            meta(),
        );
        let body = vec![Statement::new(
            StatementKind::Expression(call("__testRCESink", vec![access])),
            meta(),
        )];
        let define = Define::new("f", "m.f")
            .with_parameters(vec![Parameter {
                position: 0,
                name: "p".into(),
            }])
            .with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let transfer = BackwardTransfer {
            model_store: &store,
            callable: Callable::new("m.f"),
        };
        let model = run_backward(&define, &cfg, &transfer).unwrap();
        let tree = model.sink_taint.get(&Root::Parameter { position: 0 });
        assert!(tree.element().is_bottom());
        let field = tree.read(&[crate::label::Label::Field("q".into())]);
        assert!(field.element().contains(&SinkKind::RemoteCodeExecution));
    }

    // def f(a, b): return a
    #[test]
    fn scenario_direct_tito() {
        let body = vec![Statement::new(
            StatementKind::Return(Some(ident("a"))),
            meta(),
        )];
        let define = Define::new("f", "m.f").with_parameters(vec![
            Parameter {
                position: 0,
                name: "a".into(),
            },
            Parameter {
                position: 1,
                name: "b".into(),
            },
        ]).with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let transfer = BackwardTransfer {
            model_store: &store,
            callable: Callable::new("m.f"),
        };
        let model = run_backward(&define, &cfg, &transfer).unwrap();
        let tito = model.taint_in_taint_out.get(&Root::Parameter { position: 0 });
        assert!(tito.element().contains(&SinkKind::LocalReturn));
        assert!(model
            .taint_in_taint_out
            .get(&Root::Parameter { position: 1 })
            .is_empty_tree());
        assert!(model.sink_taint.get(&Root::Parameter { position: 0 }).is_empty_tree());
    }

    // def f(a): return a.x
    #[test]
    fn scenario_tito_through_a_field() {
        let access = Expression::new(
            ExpressionKind::Access {
                receiver: Box::new(ident("a")),
                member: "x".into(),
            },
            meta(),
        );
        let body = vec![Statement::new(StatementKind::Return(Some(access)), meta())];
        let define = Define::new("f", "m.f")
            .with_parameters(vec![Parameter {
                position: 0,
                name: "a".into(),
            }])
            .with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let transfer = BackwardTransfer {
            model_store: &store,
            callable: Callable::new("m.f"),
        };
        let model = run_backward(&define, &cfg, &transfer).unwrap();
        let tito = model.taint_in_taint_out.get(&Root::Parameter { position: 0 });
        let field = tito.read(&[crate::label::Label::Field("x".into())]);
        assert!(field.element().contains(&SinkKind::LocalReturn));
    }

    // def g(): return source()
    #[test]
    fn scenario_forward_source_via_known_callee() {
        let body = vec![Statement::new(
            StatementKind::Return(Some(call("source", vec![]))),
            meta(),
        )];
        let define = Define::new("g", "m.g").with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        store.insert(
            Callable::new("source"),
            crate::model::Summary {
                forward: ForwardSummary {
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
            callable: Callable::new("m.g"),
        };
        let model = run_forward(&define, &cfg, &transfer).unwrap();
        assert!(model.source_taint.element().contains(&SourceKind::UserControlled));
    }

    // def h(x): __testSink(unknown(x))
    #[test]
    fn scenario_default_propagation_on_unknown_callee() {
        let inner = call("unknown", vec![ident("x")]);
        let body = vec![Statement::new(
            StatementKind::Expression(call("__testSink", vec![inner])),
            meta(),
        )];
        let define = Define::new("h", "m.h")
            .with_parameters(vec![Parameter {
                position: 0,
                name: "x".into(),
            }])
            .with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let transfer = BackwardTransfer {
            model_store: &store,
            callable: Callable::new("m.h"),
        };
        let model = run_backward(&define, &cfg, &transfer).unwrap();
        let tree = model.sink_taint.get(&Root::Parameter { position: 0 });
        assert!(tree.element().contains(&SinkKind::TestSink));
    }

    /// A transfer that lies about its direction, to exercise the runtime
    /// check independent of the type system: direction mismatch is fatal.
    struct MislabeledTransfer;

    impl Transfer for MislabeledTransfer {
        type Elem = ForwardTaint;

        fn direction(&self) -> Direction {
            Direction::Backward
        }

        fn statement(
            &self,
            _stmt: &Statement,
            _program_point_key: &str,
            state: &State<ForwardTaint>,
        ) -> Result<State<ForwardTaint>> {
            Ok(state.clone())
        }
    }

    #[test]
    fn direction_mismatch_is_fatal() {
        let body: Vec<Statement> = vec![];
        let define = Define::new("f", "m.f").with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        assert!(run_forward(&define, &cfg, &MislabeledTransfer).is_err());
    }

    #[test]
    fn literal_return_carries_no_source_taint() {
        let body = vec![Statement::new(
            StatementKind::Return(Some(Expression::new(
                ExpressionKind::Literal(Literal::Int(1)),
                meta(),
            ))),
            meta(),
        )];
        let define = Define::new("f", "m.f").with_body(body.clone());
        let cfg = Cfg::straight_line(&body);
        let store = InMemoryModelStore::new();
        let types = NoTypeStore;
        let transfer = ForwardTransfer {
            model_store: &store,
            type_store: &types,
            callable: Callable::new("m.f"),
        };
        let model = run_forward(&define, &cfg, &transfer).unwrap();
        assert!(model.source_taint.is_empty_tree());
    }
}
