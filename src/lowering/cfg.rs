//! The CFG pass: successor threading between statement roots.
//!
//! Runs strictly after the AST pass; it adds edges only, resolving nodes
//! through the association map. A key that was never populated (a skipped
//! statement, a missing stub) silently contributes no edge.

use crate::{
    cpg::{operators, EdgeLabel, Node, NodeId, NodeKind},
    jimple::{StmtId, StmtKind, Value},
};

use super::Lowering;

impl Lowering<'_> {
    pub(super) fn cfg_pass(&mut self) {
        let body = self.body;
        for &head in body.heads() {
            if let Some(entry) = self.stmt_entry(head) {
                self.add_edge(self.method_node, entry, EdgeLabel::Cfg);
            }
        }
        for (id, stmt) in body.stmts() {
            match &stmt.kind {
                StmtKind::If { .. } => self.thread_if(id),
                StmtKind::LookupSwitch {
                    lookup_values,
                    targets,
                    default_target,
                    ..
                } => {
                    let cases: Vec<(i32, StmtId)> = lookup_values
                        .iter()
                        .copied()
                        .zip(targets.iter().copied())
                        .collect();
                    self.thread_switch(id, &cases, *default_target);
                }
                StmtKind::TableSwitch {
                    targets,
                    default_target,
                    ..
                } => {
                    let cases: Vec<(i32, StmtId)> = targets
                        .iter()
                        .enumerate()
                        .map(|(i, &target)| (i32::try_from(i).expect("case count"), target))
                        .collect();
                    self.thread_switch(id, &cases, *default_target);
                }
                StmtKind::Return { .. } | StmtKind::ReturnVoid => self.thread_return(id),
                StmtKind::Identity { .. } | StmtKind::Assign { .. } => self.thread_assignment(id),
                // Control terminates here; exceptional flow is not modeled.
                StmtKind::Throw { .. } => {}
                _ => self.thread_default(id),
            }
        }
    }

    /// The node control enters a statement at: the first node recorded
    /// under its key.
    fn stmt_entry(&self, stmt: StmtId) -> Option<NodeId> {
        self.assoc.get(stmt).first().copied()
    }

    /// The source of an `if` statement's branches is the condition's call.
    fn thread_if(&mut self, id: StmtId) {
        let Some(source) = self
            .assoc
            .get(id)
            .iter()
            .copied()
            .find(|&node| self.arena[node].is_call())
        else {
            return;
        };
        let targets: Vec<NodeId> = self
            .body
            .succs(id)
            .iter()
            .filter_map(|&succ| self.stmt_entry(succ))
            .collect();
        for target in targets {
            self.add_edge(source, target, EdgeLabel::Cfg);
        }
    }

    /// Switch flow runs condition → jump target → case entry; the
    /// matching jump target is found by its encoded case value, the
    /// default by name.
    fn thread_switch(&mut self, id: StmtId, cases: &[(i32, StmtId)], default_target: StmtId) {
        let Some(condition) = self.stmt_entry(id) else {
            return;
        };
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
        if let Some(jump_target) = self.find_jump_target(id, |node| node.name() == Some("default"))
        {
            edges.push((condition, jump_target));
            if let Some(entry) = self.stmt_entry(default_target) {
                edges.push((jump_target, entry));
            }
        }
        for &(case_value, target) in cases {
            let Some(jump_target) = self.find_jump_target(id, |node| {
                node.argument_index == case_value && node.name() != Some("default")
            }) else {
                continue;
            };
            edges.push((condition, jump_target));
            if let Some(entry) = self.stmt_entry(target) {
                edges.push((jump_target, entry));
            }
        }
        for (src, dst) in edges {
            self.add_edge(src, dst, EdgeLabel::Cfg);
        }
    }

    fn find_jump_target(&self, stmt: StmtId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.assoc.get(stmt).iter().copied().find(|&node| {
            matches!(self.arena[node].kind, NodeKind::JumpTarget { .. }) && pred(&self.arena[node])
        })
    }

    /// Both return kinds flow into the method's `METHOD_RETURN` stub.
    fn thread_return(&mut self, id: StmtId) {
        let Some(method_return) = self.method_return else {
            return;
        };
        let Some(return_node) = self
            .assoc
            .get(id)
            .iter()
            .copied()
            .find(|&node| matches!(self.arena[node].kind, NodeKind::Return))
        else {
            return;
        };
        self.add_edge(return_node, method_return, EdgeLabel::Cfg);
    }

    /// Assignments flow from the assignment call to each successor's
    /// entry. A successor that stores into an array element is entered
    /// through its left operand's index-access call instead of its
    /// statement entry.
    fn thread_assignment(&mut self, id: StmtId) {
        let Some(source) = self.assoc.get(id).iter().copied().find(|&node| {
            let node = &self.arena[node];
            node.is_call() && node.name() == Some(operators::ASSIGNMENT)
        }) else {
            return;
        };
        let targets: Vec<NodeId> = self
            .body
            .succs(id)
            .iter()
            .filter_map(|&succ| self.assignment_successor_entry(succ))
            .collect();
        for target in targets {
            self.add_edge(source, target, EdgeLabel::Cfg);
        }
    }

    fn assignment_successor_entry(&self, succ: StmtId) -> Option<NodeId> {
        if let StmtKind::Assign { target, .. } = &self.body.stmt(succ).kind {
            if matches!(self.body.value(*target), Value::ArrayRef { .. }) {
                return self.assoc.get(*target).first().copied();
            }
        }
        self.stmt_entry(succ)
    }

    /// Any other statement flows from its own entry node to each
    /// successor's entry.
    fn thread_default(&mut self, id: StmtId) {
        let Some(source) = self.stmt_entry(id) else {
            return;
        };
        let targets: Vec<NodeId> = self
            .body
            .succs(id)
            .iter()
            .filter_map(|&succ| self.stmt_entry(succ))
            .collect();
        for target in targets {
            self.add_edge(source, target, EdgeLabel::Cfg);
        }
    }
}
