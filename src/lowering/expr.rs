//! Recursive lowering of values to node subgraphs.
//!
//! Every shape returns `(root, cfg_entry)`: the root is the node a parent
//! hangs its `AST`/`ARGUMENT` edges on, the cfg entry is where control
//! enters the subgraph. Intra-expression CFG edges are emitted here, so
//! by the time the CFG pass runs, evaluation order inside expressions is
//! already threaded.

use tracing::{debug, warn};

use crate::{
    cpg::{operators, DispatchType, EdgeLabel, NodeId, NodeKind},
    jimple::{Value, ValueId},
};

use super::Lowering;

impl Lowering<'_> {
    /// Lowers a value at the given child position, returning the subgraph
    /// root and its CFG entry.
    pub(super) fn lower_value(&mut self, value: ValueId, child_idx: i32) -> (NodeId, NodeId) {
        self.lower_value_at(value, child_idx, child_idx)
    }

    /// Like [`lower_value`](Self::lower_value), with the argument index
    /// decoupled from the sibling order (the `return` shape needs this).
    pub(super) fn lower_value_at(
        &mut self,
        value: ValueId,
        argument_index: i32,
        order: i32,
    ) -> (NodeId, NodeId) {
        let body = self.body;
        match body.value(value) {
            Value::Local(local) => {
                let name = body.local(*local).name.clone();
                let node = self.new_node(
                    NodeKind::Identifier { name: name.clone() },
                    name,
                    body.type_name_of(value),
                    order,
                    argument_index,
                );
                self.assoc.append(*local, [node]);
                (node, node)
            }
            Value::IdentityRef(identity_ref) => {
                let node = self.new_node(
                    NodeKind::Identifier {
                        name: identity_ref.local_name(),
                    },
                    identity_ref.to_string(),
                    identity_ref.type_name(),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
            Value::Constant(constant) => {
                let node = self.new_node(
                    NodeKind::Literal,
                    constant.to_string(),
                    constant.type_name().to_owned(),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
            Value::CaughtException { ty } => {
                let node = self.new_node(
                    NodeKind::Identifier {
                        name: "@caughtexception".to_owned(),
                    },
                    "@caughtexception".to_owned(),
                    ty.to_string(),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
            Value::New { class } => {
                let node = self.new_node(
                    NodeKind::TypeRef,
                    body.code_of(value),
                    class.to_string(),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
            Value::NewArray { .. } => {
                let node = self.new_node(
                    NodeKind::TypeRef,
                    body.code_of(value),
                    body.type_name_of(value),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
            Value::StaticFieldRef { field } => {
                let call = self.operator_call(
                    operators::FIELD_ACCESS,
                    body.code_of(value),
                    field.field_type.to_string(),
                    order,
                    argument_index,
                );
                let owner = field.owner.to_string();
                let base = self.new_node(
                    NodeKind::Identifier {
                        name: owner.clone(),
                    },
                    owner.clone(),
                    owner,
                    1,
                    1,
                );
                let member = self.field_identifier(field.signature(), field.field_type.to_string());
                self.attach_field_access(call, base, member);
                self.assoc.append(value, [base, member]);
                (call, call)
            }
            Value::InstanceFieldRef {
                base: base_value,
                field,
            } => {
                let call = self.operator_call(
                    operators::FIELD_ACCESS,
                    body.code_of(value),
                    field.field_type.to_string(),
                    order,
                    argument_index,
                );
                let base_code = body.code_of(*base_value);
                let base = self.new_node(
                    NodeKind::Identifier {
                        name: base_code.clone(),
                    },
                    base_code,
                    body.type_name_of(*base_value),
                    1,
                    1,
                );
                if let Value::Local(local) = body.value(*base_value) {
                    self.assoc.append(*local, [base]);
                }
                let member = self.field_identifier(field.signature(), field.field_type.to_string());
                self.attach_field_access(call, base, member);
                self.assoc.append(value, [base, member]);
                (call, call)
            }
            Value::Binop { op, left, right } => self.lower_binary(
                value,
                operators::binop_name(*op),
                *left,
                *right,
                argument_index,
                order,
            ),
            Value::Condition { op, left, right } => self.lower_binary(
                value,
                operators::condop_name(*op),
                *left,
                *right,
                argument_index,
                order,
            ),
            Value::Cast { operand, .. } => {
                self.lower_unary(value, operators::CAST, *operand, argument_index, order)
            }
            Value::InstanceOf { operand, .. } => self.lower_unary(
                value,
                operators::INSTANCE_OF,
                *operand,
                argument_index,
                order,
            ),
            Value::Length { operand } => {
                self.lower_unary(value, operators::LENGTH_OF, *operand, argument_index, order)
            }
            Value::Neg { operand } => {
                self.lower_unary(value, operators::MINUS, *operand, argument_index, order)
            }
            Value::ArrayRef { base, index } => {
                let call = self.operator_call(
                    operators::INDEX_ACCESS,
                    body.code_of(value),
                    body.type_name_of(value),
                    order,
                    argument_index,
                );
                // The CFG pass resolves array stores through this key, so
                // the call must sit at index 0.
                self.assoc.insert_at(value, [call], 0);
                let (base_root, base_entry) = self.lower_value(*base, 1);
                let (index_root, index_entry) = self.lower_value(*index, 2);
                self.add_edge(call, base_root, EdgeLabel::Ast);
                self.add_edge(call, base_root, EdgeLabel::Argument);
                self.add_edge(call, index_root, EdgeLabel::Ast);
                self.add_edge(call, index_root, EdgeLabel::Argument);
                self.add_edge(base_root, index_entry, EdgeLabel::Cfg);
                self.add_edge(index_root, call, EdgeLabel::Cfg);
                self.assoc.append(value, [base_root, index_root]);
                (call, base_entry)
            }
            Value::Invoke(_) => self.lower_invoke(value, argument_index, order),
            Value::NewMultiArray { .. } => {
                warn!(
                    value = %value,
                    code = %body.code_of(value),
                    "no lowering shape for value; emitting UNKNOWN"
                );
                let node = self.new_node(
                    NodeKind::Unknown,
                    body.code_of(value),
                    body.type_name_of(value),
                    order,
                    argument_index,
                );
                self.assoc.append(value, [node]);
                (node, node)
            }
        }
    }

    /// Lowers a binary operator: `CALL` over children at argument indices
    /// 1 and 2, CFG threaded `left → right → call`, external entry at the
    /// left operand.
    fn lower_binary(
        &mut self,
        value: ValueId,
        name: &str,
        left: ValueId,
        right: ValueId,
        argument_index: i32,
        order: i32,
    ) -> (NodeId, NodeId) {
        let body = self.body;
        let call = self.operator_call(
            name,
            body.code_of(value),
            body.type_name_of(value),
            order,
            argument_index,
        );
        self.assoc.append(value, [call]);
        let (left_root, left_entry) = self.lower_value(left, 1);
        let (right_root, right_entry) = self.lower_value(right, 2);
        self.add_edge(call, left_root, EdgeLabel::Ast);
        self.add_edge(call, left_root, EdgeLabel::Argument);
        self.add_edge(call, right_root, EdgeLabel::Ast);
        self.add_edge(call, right_root, EdgeLabel::Argument);
        self.add_edge(left_root, right_entry, EdgeLabel::Cfg);
        self.add_edge(right_root, call, EdgeLabel::Cfg);
        self.assoc.append(value, [left_root, right_root]);
        (call, left_entry)
    }

    /// Lowers a unary operator: `CALL` over one child at argument index 1,
    /// CFG threaded `child → call`.
    fn lower_unary(
        &mut self,
        value: ValueId,
        name: &str,
        operand: ValueId,
        argument_index: i32,
        order: i32,
    ) -> (NodeId, NodeId) {
        let body = self.body;
        let call = self.operator_call(
            name,
            body.code_of(value),
            body.type_name_of(value),
            order,
            argument_index,
        );
        self.assoc.append(value, [call]);
        let (child_root, child_entry) = self.lower_value(operand, 1);
        self.add_edge(call, child_root, EdgeLabel::Ast);
        self.add_edge(call, child_root, EdgeLabel::Argument);
        self.add_edge(child_root, call, EdgeLabel::Cfg);
        self.assoc.append(value, [child_root]);
        (call, child_entry)
    }

    fn lower_invoke(&mut self, value: ValueId, argument_index: i32, order: i32) -> (NodeId, NodeId) {
        let body = self.body;
        let Value::Invoke(expr) = body.value(value) else {
            unreachable!("lower_invoke is only dispatched on invocations");
        };
        let dispatch_type = if expr.is_static_dispatch() {
            DispatchType::Static
        } else {
            DispatchType::Dynamic
        };
        let call = self.new_node(
            NodeKind::Call {
                name: expr.callee.name.clone(),
                method_full_name: expr.callee.full_name(),
                signature: expr.callee.signature(),
                dispatch_type,
            },
            body.code_of(value),
            body.type_name_of(value),
            order,
            argument_index,
        );
        self.calls.register(value, expr.callee.full_name(), call);
        self.assoc.append(value, [call]);

        let arg_count = i32::try_from(expr.all_args().count()).expect("argument count");
        if let Some(base) = expr.base {
            let base_code = body.code_of(base);
            let receiver = self.new_node(
                NodeKind::Identifier {
                    name: base_code.clone(),
                },
                base_code,
                body.type_name_of(base),
                arg_count + 1,
                0,
            );
            self.add_edge(call, receiver, EdgeLabel::Receiver);
            self.add_edge(call, receiver, EdgeLabel::Argument);
            self.add_edge(call, receiver, EdgeLabel::Ast);
            if let Value::Local(local) = body.value(base) {
                self.assoc.append(*local, [receiver]);
            }
            self.assoc.append(value, [receiver]);
        }

        for (i, arg) in expr.all_args().enumerate() {
            let idx = i32::try_from(i).expect("argument count") + 1;
            let node = match body.value(arg) {
                Value::Local(local) => {
                    let name = body.local(*local).name.clone();
                    let node = self.new_node(
                        NodeKind::Identifier { name: name.clone() },
                        name,
                        body.type_name_of(arg),
                        idx,
                        idx,
                    );
                    self.assoc.append(*local, [node]);
                    node
                }
                Value::Constant(constant) => self.new_node(
                    NodeKind::Literal,
                    constant.to_string(),
                    constant.type_name().to_owned(),
                    idx,
                    idx,
                ),
                _ => {
                    debug!(
                        value = %arg,
                        code = %body.code_of(arg),
                        "argument shape not lowered at the call site"
                    );
                    continue;
                }
            };
            self.add_edge(call, node, EdgeLabel::Ast);
            self.add_edge(call, node, EdgeLabel::Argument);
            self.assoc.append(value, [node]);
        }
        (call, call)
    }

    /// Creates the `CALL` node of an operator application.
    pub(super) fn operator_call(
        &mut self,
        name: &str,
        code: String,
        type_full_name: String,
        order: i32,
        argument_index: i32,
    ) -> NodeId {
        self.new_node(
            NodeKind::Call {
                name: name.to_owned(),
                method_full_name: name.to_owned(),
                signature: String::new(),
                dispatch_type: DispatchType::Static,
            },
            code,
            type_full_name,
            order,
            argument_index,
        )
    }

    fn field_identifier(&mut self, canonical_name: String, type_full_name: String) -> NodeId {
        self.new_node(
            NodeKind::FieldIdentifier {
                canonical_name: canonical_name.clone(),
            },
            canonical_name,
            type_full_name,
            2,
            2,
        )
    }

    fn attach_field_access(&mut self, call: NodeId, base: NodeId, member: NodeId) {
        self.add_edge(call, base, EdgeLabel::Ast);
        self.add_edge(call, base, EdgeLabel::Argument);
        self.add_edge(call, member, EdgeLabel::Ast);
        self.add_edge(call, member, EdgeLabel::Argument);
    }
}
