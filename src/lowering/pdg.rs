//! The PDG pass (`REF` and `ARGUMENT` edges) and the containment sweep.

use std::collections::BTreeSet;

use crate::{
    cpg::{EdgeLabel, NodeId},
    jimple::StmtKind,
};

use super::{AssocKey, Lowering};

impl Lowering<'_> {
    pub(super) fn pdg_pass(&mut self) {
        self.emit_ref_edges();
        self.emit_argument_edges();
    }

    /// Connects every recorded `IDENTIFIER` of a local, parameter, or
    /// identity reference to its declaration node: the first `LOCAL` (or
    /// `METHOD_PARAMETER_IN`, for parameters) in the same association.
    fn emit_ref_edges(&mut self) {
        let body = self.body;
        let mut keys: Vec<AssocKey> = Vec::new();
        for &head in body.heads() {
            for use_value in body.uses(head) {
                keys.push(use_value.into());
            }
        }
        for (local_id, _) in body.locals() {
            keys.push(local_id.into());
        }
        for key in keys {
            let nodes: Vec<NodeId> = self.assoc.get(key).to_vec();
            let Some(declaration) = nodes
                .iter()
                .copied()
                .find(|&node| self.arena[node].is_declaration())
            else {
                continue;
            };
            for node in nodes {
                if self.arena[node].is_identifier() {
                    self.add_edge(node, declaration, EdgeLabel::Ref);
                }
            }
        }
    }

    /// Re-asserts `ARGUMENT` edges for every `if` condition and every
    /// invocation statement: from the call recorded under the value's key
    /// to every other node recorded there. Physical duplicates of the
    /// edges emitted at call construction are expected; consumers dedupe.
    fn emit_argument_edges(&mut self) {
        let body = self.body;
        for (_, stmt) in body.stmts() {
            let value = match stmt.kind {
                StmtKind::If { condition } => condition,
                StmtKind::Invoke { expr } => expr,
                _ => continue,
            };
            let nodes: Vec<NodeId> = self.assoc.get(value).to_vec();
            let Some(call) = nodes
                .iter()
                .copied()
                .find(|&node| self.arena[node].is_call())
            else {
                continue;
            };
            for node in nodes {
                if node != call {
                    self.add_edge(call, node, EdgeLabel::Argument);
                }
            }
        }
    }

    /// Emits `METHOD -CONTAINS→ n` for every node the passes recorded,
    /// except stub-owned nodes and the preamble's `LOCAL`s, then discards
    /// the association map. Exclusion and deduplication both work on node
    /// handles, never on node values.
    pub(super) fn containment_sweep(&mut self) {
        let full_name = self.method.full_name();
        let excluded: BTreeSet<NodeId> = self
            .methods
            .method_store(&full_name)
            .into_iter()
            .chain(self.local_nodes.iter().copied())
            .collect();
        let recorded: Vec<NodeId> = self
            .assoc
            .iter()
            .flat_map(|(_, nodes)| nodes.iter().copied())
            .collect();
        let mut contained = BTreeSet::new();
        for node in recorded {
            if !excluded.contains(&node) && contained.insert(node) {
                self.add_edge(self.method_node, node, EdgeLabel::Contains);
            }
        }
        self.assoc.clear();
    }
}
