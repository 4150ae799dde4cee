//! The AST pass: parameter and local preamble, then statement dispatch.
//!
//! Every statement that has a lowering shape hangs its root below the
//! method-body block and records its nodes in the association map; the
//! CFG and PDG passes never create nodes, they only read what is recorded
//! here.

use tracing::warn;

use crate::{
    cpg::{operators, ControlStructureType, EdgeLabel, EvaluationStrategy, NodeKind},
    index::evaluation_strategy,
    jimple::{StmtId, StmtKind, Value, ValueId},
};

use super::{Lowering, LoweringError};

impl Lowering<'_> {
    pub(super) fn ast_pass(&mut self) -> Result<(), LoweringError> {
        self.build_parameters();
        self.build_locals();
        let body = self.body;
        for (id, stmt) in body.stmts() {
            if stmt.position.line.is_some() {
                self.position = stmt.position;
            }
            self.lower_stmt(id)?;
        }
        Ok(())
    }

    /// Creates the `METHOD_PARAMETER_IN` (and, for by-reference types,
    /// `METHOD_PARAMETER_OUT`) nodes and persists them in the stub store.
    fn build_parameters(&mut self) {
        let body = self.body;
        let mut parameters = Vec::new();
        for (i, &local_id) in body.params().iter().enumerate() {
            let index = i32::try_from(i).expect("parameter count") + 1;
            let local = body.local(local_id);
            let strategy = evaluation_strategy(&local.ty, false);
            let code = format!("{} {}", local.ty, local.name);
            let type_name = local.ty.to_string();
            let parameter_in = self.new_node(
                NodeKind::MethodParameterIn {
                    name: local.name.clone(),
                    evaluation_strategy: strategy,
                },
                code.clone(),
                type_name.clone(),
                index,
                index,
            );
            self.add_edge(self.method_node, parameter_in, EdgeLabel::Ast);
            self.assoc.append(local_id, [parameter_in]);
            parameters.push(parameter_in);
            if strategy == EvaluationStrategy::ByReference {
                let parameter_out = self.new_node(
                    NodeKind::MethodParameterOut {
                        name: local.name.clone(),
                        evaluation_strategy: EvaluationStrategy::BySharing,
                    },
                    code,
                    type_name,
                    index,
                    index,
                );
                self.add_edge(parameter_in, parameter_out, EdgeLabel::ParameterLink);
                parameters.push(parameter_out);
            }
        }
        let full_name = self.method.full_name();
        self.methods.store_parameters(&full_name, parameters);
    }

    /// Creates a `LOCAL` below the block for every non-parameter body
    /// local, and one for every identity reference used by a head
    /// statement (named by its textual form with the type suffix
    /// stripped).
    fn build_locals(&mut self) {
        let body = self.body;
        for (local_id, local) in body.locals() {
            if body.params().contains(&local_id) {
                continue;
            }
            let order = self.next_block_child();
            let node = self.new_node(
                NodeKind::Local {
                    name: local.name.clone(),
                },
                local.name.clone(),
                local.ty.to_string(),
                order,
                order,
            );
            self.attach_to_block(node);
            self.assoc.append(local_id, [node]);
            self.local_nodes.insert(node);
        }
        for &head in body.heads() {
            for use_value in body.uses(head) {
                if let Value::IdentityRef(identity_ref) = body.value(use_value) {
                    let name = identity_ref.local_name();
                    let order = self.next_block_child();
                    let node = self.new_node(
                        NodeKind::Local { name: name.clone() },
                        name,
                        identity_ref.type_name(),
                        order,
                        order,
                    );
                    self.attach_to_block(node);
                    self.assoc.append(use_value, [node]);
                    self.local_nodes.insert(node);
                }
            }
        }
    }

    fn lower_stmt(&mut self, id: StmtId) -> Result<(), LoweringError> {
        let body = self.body;
        match &body.stmt(id).kind {
            StmtKind::Identity {
                local,
                identity_ref,
            } => self.lower_assignment(id, *local, *identity_ref),
            StmtKind::Assign { target, value } => self.lower_assignment(id, *target, *value),
            StmtKind::If { condition } => self.lower_if(id, *condition),
            StmtKind::Goto { .. } => self.lower_goto(id),
            StmtKind::LookupSwitch {
                key,
                lookup_values,
                targets,
                default_target,
            } => {
                if lookup_values.len() != targets.len() {
                    return Err(LoweringError::MalformedSwitch {
                        values: lookup_values.len(),
                        targets: targets.len(),
                    });
                }
                let cases: Vec<(i32, StmtId)> = lookup_values
                    .iter()
                    .copied()
                    .zip(targets.iter().copied())
                    .collect();
                self.lower_switch(id, *key, &cases, *default_target);
            }
            StmtKind::TableSwitch {
                key,
                targets,
                default_target,
                ..
            } => {
                // Case values are the target ordinals, not `low + i`.
                let cases: Vec<(i32, StmtId)> = targets
                    .iter()
                    .enumerate()
                    .map(|(i, &target)| (i32::try_from(i).expect("case count"), target))
                    .collect();
                self.lower_switch(id, *key, &cases, *default_target);
            }
            StmtKind::Invoke { expr } => self.lower_invoke_stmt(id, *expr),
            StmtKind::Return { operand } => self.lower_return(id, Some(*operand)),
            StmtKind::ReturnVoid => self.lower_return(id, None),
            StmtKind::Throw { operand } | StmtKind::Monitor { operand, .. } => {
                self.lower_effect(id, *operand);
            }
            StmtKind::Nop | StmtKind::Breakpoint => {
                warn!(
                    stmt = %id,
                    code = %body.stmt_code(id),
                    "no lowering shape for statement; skipping"
                );
            }
        }
        Ok(())
    }

    /// Identity and assignment statements: `CALL(assignment)` over the
    /// lowered target and value, CFG threaded `target → value → call`.
    fn lower_assignment(&mut self, id: StmtId, target: ValueId, value: ValueId) {
        let body = self.body;
        let child = self.next_block_child();
        let assign = self.operator_call(
            operators::ASSIGNMENT,
            body.stmt_code(id),
            body.type_name_of(target),
            child,
            child,
        );
        let (left, _) = self.lower_value(target, 1);
        let (right, right_entry) = self.lower_value(value, 2);
        self.add_edge(assign, left, EdgeLabel::Ast);
        self.add_edge(assign, left, EdgeLabel::Argument);
        self.add_edge(assign, right, EdgeLabel::Ast);
        self.add_edge(assign, right, EdgeLabel::Argument);
        self.add_edge(left, right_entry, EdgeLabel::Cfg);
        self.add_edge(right, assign, EdgeLabel::Cfg);
        self.attach_to_block(assign);
        self.assoc.append(id, [left, right, assign]);
    }

    fn lower_if(&mut self, id: StmtId, condition: ValueId) {
        let child = self.next_block_child();
        let if_node = self.new_node(
            NodeKind::ControlStructure(ControlStructureType::If),
            self.body.stmt_code(id),
            "void".to_owned(),
            child,
            child,
        );
        let (root, entry) = self.lower_value(condition, 1);
        self.add_edge(if_node, root, EdgeLabel::Ast);
        self.add_edge(if_node, root, EdgeLabel::Condition);
        self.attach_to_block(if_node);
        self.assoc.append(id, [entry, root, if_node]);
    }

    fn lower_goto(&mut self, id: StmtId) {
        let child = self.next_block_child();
        let goto = self.new_node(
            NodeKind::ControlStructure(ControlStructureType::Goto),
            self.body.stmt_code(id),
            "void".to_owned(),
            child,
            child,
        );
        self.attach_to_block(goto);
        self.assoc.append(id, [goto]);
    }

    /// Both switch kinds: the switch, its condition, one `JUMP_TARGET` per
    /// case target distinct from the default, and the default target with
    /// its index encoded past the case count.
    fn lower_switch(
        &mut self,
        id: StmtId,
        key: ValueId,
        cases: &[(i32, StmtId)],
        default_target: StmtId,
    ) {
        let child = self.next_block_child();
        let switch = self.new_node(
            NodeKind::ControlStructure(ControlStructureType::Switch),
            self.body.stmt_code(id),
            "void".to_owned(),
            child,
            child,
        );
        self.assoc.append(id, [switch]);
        let (key_root, _) = self.lower_value(key, 1);
        self.add_edge(switch, key_root, EdgeLabel::Ast);
        self.add_edge(switch, key_root, EdgeLabel::Condition);
        self.attach_to_block(switch);

        let mut jump_targets = Vec::new();
        let mut order = 1; // the condition holds the first sibling slot
        for &(case_value, target) in cases {
            if target == default_target {
                continue;
            }
            order += 1;
            let name = format!("case {case_value}");
            let jump_target = self.new_node(
                NodeKind::JumpTarget { name: name.clone() },
                name,
                "void".to_owned(),
                order,
                case_value,
            );
            self.add_edge(switch, jump_target, EdgeLabel::Ast);
            jump_targets.push(jump_target);
        }
        order += 1;
        let default_index = i32::try_from(cases.len()).expect("case count") + 2;
        let default_jump_target = self.new_node(
            NodeKind::JumpTarget {
                name: "default".to_owned(),
            },
            "default".to_owned(),
            "void".to_owned(),
            order,
            default_index,
        );
        self.add_edge(switch, default_jump_target, EdgeLabel::Ast);
        jump_targets.push(default_jump_target);
        self.assoc.append(id, jump_targets);
        // The CFG pass expects the condition at index 0.
        self.assoc.insert_at(id, [key_root], 0);
    }

    fn lower_invoke_stmt(&mut self, id: StmtId, expr: ValueId) {
        let child = self.next_block_child();
        let (call, _) = self.lower_value(expr, child);
        self.attach_to_block(call);
        // The CFG pass threads invocation statements through the call
        // node, so it must sit at index 0.
        self.assoc.insert_at(id, [call], 0);
    }

    fn lower_return(&mut self, id: StmtId, operand: Option<ValueId>) {
        let body = self.body;
        let child = self.next_block_child();
        let return_node = self.new_node(
            NodeKind::Return,
            body.stmt_code(id),
            self.method.descriptor.return_type.to_string(),
            child,
            child,
        );
        if let Some(operand) = operand {
            let (root, _) = self.lower_value_at(operand, child + 1, 1);
            self.add_edge(return_node, root, EdgeLabel::Ast);
            self.add_edge(return_node, root, EdgeLabel::Argument);
            self.add_edge(root, return_node, EdgeLabel::Cfg);
            self.attach_to_block(return_node);
            self.assoc.append(id, [root, return_node]);
        } else {
            self.attach_to_block(return_node);
            self.assoc.append(id, [return_node]);
        }
    }

    /// Throw and monitor statements: the operand flows into an `UNKNOWN`
    /// node typed `void`, whose `AST` edge points back at the operand.
    fn lower_effect(&mut self, id: StmtId, operand: ValueId) {
        let body = self.body;
        let child = self.next_block_child();
        let (root, _) = self.lower_value(operand, 1);
        let unknown = self.new_node(
            NodeKind::Unknown,
            body.stmt_code(id),
            "void".to_owned(),
            child,
            child,
        );
        self.add_edge(root, unknown, EdgeLabel::Cfg);
        self.add_edge(unknown, root, EdgeLabel::Ast);
        self.attach_to_block(unknown);
        self.assoc.append(id, [root, unknown]);
    }
}
