//! The shared indices the lowering core reads and writes.
//!
//! The surrounding driver owns these and passes them to every per-method
//! lowering run; nothing here is ambient process state. Only the type
//! registry must be shared across methods, and it is only ever read.

use std::collections::HashMap;

use crate::{
    cpg::{EvaluationStrategy, Node, NodeArena, NodeId, NodeKind},
    jimple::{FieldType, Method, ValueId},
};

/// Decides how a parameter or return value of the given type is passed.
///
/// Objects and arrays are by-reference in parameter position and by-sharing
/// in return position; primitives are by-value everywhere.
#[must_use]
pub fn evaluation_strategy(ty: &FieldType, is_return: bool) -> EvaluationStrategy {
    match ty {
        FieldType::Base(_) => EvaluationStrategy::ByValue,
        FieldType::Object(_) | FieldType::Array(_) if is_return => EvaluationStrategy::BySharing,
        FieldType::Object(_) | FieldType::Array(_) => EvaluationStrategy::ByReference,
    }
}

/// The registry of type-declaration nodes built by the external type pass.
///
/// The core only reads it: a missing entry means the `EVAL_TYPE` edge is
/// omitted and a later pass may backfill it.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    inner: HashMap<String, NodeId>,
}

impl TypeIndex {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the node of a type.
    pub fn register<S: Into<String>>(&mut self, full_name: S, node: NodeId) {
        self.inner.insert(full_name.into(), node);
    }

    /// Looks up the node of a type.
    #[must_use]
    pub fn type_node(&self, full_name: &str) -> Option<NodeId> {
        self.inner.get(full_name).copied()
    }
}

/// A call site recorded for later call-graph linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// The value handle of the invocation expression.
    pub invoke: ValueId,
    /// The full name of the callee.
    pub callee: String,
    /// The produced `CALL` node.
    pub node: NodeId,
}

/// The process-wide index of call sites.
#[derive(Debug, Clone, Default)]
pub struct CallIndex {
    inner: Vec<CallSite>,
}

impl CallIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lowered invocation.
    pub fn register(&mut self, invoke: ValueId, callee: String, node: NodeId) {
        self.inner.push(CallSite {
            invoke,
            callee,
            node,
        });
    }

    /// The recorded call sites, in lowering order.
    #[must_use]
    pub fn call_sites(&self) -> &[CallSite] {
        &self.inner
    }
}

/// The pre-created stub nodes of one method.
#[derive(Debug, Clone, Default)]
pub struct MethodStubs {
    /// The `METHOD` node.
    pub method: Option<NodeId>,
    /// The method-body `BLOCK` node.
    pub block: Option<NodeId>,
    /// The `METHOD_RETURN` node.
    pub method_return: Option<NodeId>,
    /// The parameter nodes persisted by the lowering core.
    pub parameters: Vec<NodeId>,
}

impl MethodStubs {
    /// All stub-owned nodes, for exclusion from the containment sweep.
    #[must_use]
    pub fn all(&self) -> Vec<NodeId> {
        self.method
            .iter()
            .chain(self.block.iter())
            .chain(self.method_return.iter())
            .chain(self.parameters.iter())
            .copied()
            .collect()
    }
}

/// The store of method stub nodes built by the external method-stub pass,
/// keyed by method full name.
#[derive(Debug, Clone, Default)]
pub struct MethodIndex {
    inner: HashMap<String, MethodStubs>,
}

impl MethodIndex {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the stubs of a method.
    pub fn store<S: Into<String>>(&mut self, full_name: S, stubs: MethodStubs) {
        self.inner.insert(full_name.into(), stubs);
    }

    /// Looks up the `METHOD` node of a method.
    #[must_use]
    pub fn method_node(&self, full_name: &str) -> Option<NodeId> {
        self.inner.get(full_name).and_then(|stubs| stubs.method)
    }

    /// Looks up the stubs of a method.
    #[must_use]
    pub fn stubs(&self, full_name: &str) -> Option<&MethodStubs> {
        self.inner.get(full_name)
    }

    /// Persists the parameter nodes the lowering core created for a method.
    pub fn store_parameters(&mut self, full_name: &str, parameters: Vec<NodeId>) {
        self.inner
            .entry(full_name.to_owned())
            .or_default()
            .parameters
            .extend(parameters);
    }

    /// All stub-owned nodes of a method; empty when the method is unknown.
    #[must_use]
    pub fn method_store(&self, full_name: &str) -> Vec<NodeId> {
        self.inner
            .get(full_name)
            .map(MethodStubs::all)
            .unwrap_or_default()
    }

    /// Creates the `METHOD`, `BLOCK`, and `METHOD_RETURN` stubs of a
    /// method, standing in for the external method-stub pass.
    ///
    /// Orders place the block and return site after the declared
    /// parameters, which the lowering core numbers `1..=n`.
    pub fn seed_method_stubs(&mut self, arena: &mut NodeArena, method: &Method) {
        let full_name = method.full_name();
        let n_params = i32::try_from(method.descriptor.parameters_types.len())
            .expect("parameter count");
        let return_type = method.descriptor.return_type.to_string();

        let method_node = arena.alloc(Node {
            kind: NodeKind::Method {
                name: method.name.clone(),
                full_name: full_name.clone(),
                signature: method.signature(),
            },
            code: format!("{} {}", return_type, method.name),
            type_full_name: return_type.clone(),
            order: 1,
            argument_index: 1,
            line: method.position.line,
            column: method.position.column,
        });
        let block = arena.alloc(Node {
            kind: NodeKind::Block,
            code: String::new(),
            type_full_name: "void".to_owned(),
            order: n_params + 1,
            argument_index: n_params + 1,
            line: method.position.line,
            column: method.position.column,
        });
        let method_return = arena.alloc(Node {
            kind: NodeKind::MethodReturn,
            code: return_type.clone(),
            type_full_name: return_type,
            order: n_params + 2,
            argument_index: n_params + 2,
            line: method.position.line,
            column: method.position.column,
        });

        let stubs = self.inner.entry(full_name).or_default();
        stubs.method = Some(method_node);
        stubs.block = Some(block);
        stubs.method_return = Some(method_return);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::jimple::{ClassRef, MethodAccessFlags, Position, PrimitiveType};

    use super::*;

    #[test]
    fn strategy_rules() {
        let int = FieldType::Base(PrimitiveType::Int);
        let object = FieldType::Object(ClassRef::new("java.lang.Object"));
        assert_eq!(
            evaluation_strategy(&int, false),
            EvaluationStrategy::ByValue
        );
        assert_eq!(
            evaluation_strategy(&object, false),
            EvaluationStrategy::ByReference
        );
        assert_eq!(
            evaluation_strategy(&object, true),
            EvaluationStrategy::BySharing
        );
        assert_eq!(
            evaluation_strategy(&object.make_array_type(), false),
            EvaluationStrategy::ByReference
        );
    }

    proptest! {
        #[test]
        fn primitives_are_always_by_value(ty in any::<PrimitiveType>(), is_return: bool) {
            prop_assert_eq!(
                evaluation_strategy(&FieldType::Base(ty), is_return),
                EvaluationStrategy::ByValue
            );
        }
    }

    #[test]
    fn seeded_stubs_are_retrievable() {
        let method = Method {
            access_flags: MethodAccessFlags::STATIC,
            name: "max".into(),
            owner: ClassRef::new("java.lang.Math"),
            descriptor: "(II)I".parse().unwrap(),
            position: Position::NONE,
            body: None,
        };
        let mut arena = NodeArena::new();
        let mut index = MethodIndex::new();
        index.seed_method_stubs(&mut arena, &method);

        let full_name = method.full_name();
        let stubs = index.stubs(&full_name).unwrap();
        let method_node = stubs.method.unwrap();
        assert_eq!(arena[stubs.block.unwrap()].order, 3);
        assert_eq!(arena[stubs.method_return.unwrap()].order, 4);
        assert_eq!(index.method_store(&full_name).len(), 3);

        index.store_parameters(&full_name, vec![method_node]);
        assert_eq!(index.method_store(&full_name).len(), 4);
    }
}
