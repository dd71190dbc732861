//! Control-flow graph: basic blocks of statements plus a
//! predecessor/successor relation. CFG construction itself is an external
//! collaborator; this module owns only the shape the core's fixpoint
//! driver walks, plus a minimal straight-line builder used by tests and by
//! callers with no smarter CFG construction available.

use crate::ast::Statement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type BlockId = usize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub statements: Vec<Statement>,
}

/// A function's control-flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cfg {
    pub entry: BlockId,
    pub exit: BlockId,
    pub blocks: Vec<BasicBlock>,
    pub successors: HashMap<BlockId, Vec<BlockId>>,
    pub predecessors: HashMap<BlockId, Vec<BlockId>>,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn successors(&self, id: BlockId) -> &[BlockId] {
        self.successors.get(&id).map_or(&[], |v| v.as_slice())
    }

    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        self.predecessors.get(&id).map_or(&[], |v| v.as_slice())
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|b| b.id)
    }

    /// Builds a single straight-line block holding every top-level statement
    /// of `body` in order, with no branching. This is the simplest possible
    /// CFG shape and is what the intraprocedural fixpoint degenerates to
    /// when a smarter, branch-aware CFG builder is not supplied, comparable
    /// to the call-chain-only CFG the teacher's `engine::cfg::build_cfg`
    /// produces for a single function.
    pub fn straight_line(body: &[Statement]) -> Self {
        let block = BasicBlock {
            id: 0,
            statements: body.to_vec(),
        };
        let mut successors = HashMap::new();
        let mut predecessors = HashMap::new();
        successors.insert(0, Vec::new());
        predecessors.insert(0, Vec::new());
        Self {
            entry: 0,
            exit: 0,
            blocks: vec![block],
            successors,
            predecessors,
        }
    }

    /// Exports the graph to DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph CFG {\n");
        for block in &self.blocks {
            out.push_str(&format!(
                "    {} [label=\"block {} ({} stmts)\"];\n",
                block.id,
                block.id,
                block.statements.len()
            ));
        }
        for (from, tos) in &self.successors {
            for to in tos {
                out.push_str(&format!("    {from} -> {to};\n"));
            }
        }
        out.push('}');
        out
    }

    /// Exports the graph to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
