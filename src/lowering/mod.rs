//! The method-body lowering core.
//!
//! For one method, three passes run in order over a shared per-method
//! state: the AST pass creates every node and records it in the
//! [`AssociationMap`], the CFG pass threads successor edges between the
//! recorded nodes, and the PDG pass adds `REF` and `ARGUMENT` edges. A
//! final containment sweep connects the method to every body node it
//! produced. The result is an ordered [`DeltaGraph`] of additions.
//!
//! Any error inside a pass is caught once at the outer boundary: a warning
//! is logged and the partial delta built so far is returned. There is no
//! rollback within a method.

mod association;
mod ast;
mod cfg;
mod expr;
mod pdg;

pub use association::{AssocKey, AssociationMap};

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::{
    cpg::{DeltaGraph, DeltaGraphBuilder, EdgeLabel, Node, NodeArena, NodeId, NodeKind},
    index::{CallIndex, MethodIndex, TypeIndex},
    jimple::{Body, Method, Position},
};

/// An error that aborts a lowering pass.
///
/// Most degraded inputs are handled by skipping the affected node or edge;
/// only genuinely malformed IR aborts, and even then the partial delta is
/// returned by [`lower_method`].
#[derive(Debug, thiserror::Error)]
pub enum LoweringError {
    /// The method has no body to lower.
    #[error("the method does not have a body")]
    NoMethodBody,
    /// No `METHOD` stub was registered for the method.
    #[error("no method stub registered for `{0}`")]
    MissingMethodStub(String),
    /// A lookup switch whose value and target lists disagree.
    #[error("switch statement has {values} lookup values but {targets} targets")]
    MalformedSwitch {
        /// The number of lookup values.
        values: usize,
        /// The number of case targets.
        targets: usize,
    },
}

/// Lowers one method body into its code property graph fragment.
///
/// The caller provides the arena nodes are allocated in, the stub store
/// holding the method's pre-created `METHOD`/`BLOCK`/`METHOD_RETURN`
/// nodes, the type-node registry, and the call index lowered invocations
/// are recorded in. Each invocation operates on fresh per-method state;
/// methods may be lowered in parallel at a higher level as long as the
/// type registry is only read.
pub fn lower_method(
    method: &Method,
    arena: &mut NodeArena,
    methods: &mut MethodIndex,
    types: &TypeIndex,
    calls: &mut CallIndex,
) -> DeltaGraph {
    let full_name = method.full_name();
    let Some(body) = method.body.as_ref() else {
        warn!(method = %full_name, error = %LoweringError::NoMethodBody, "skipping method");
        return DeltaGraph::default();
    };
    let stubs = methods.stubs(&full_name);
    let Some(method_node) = stubs.and_then(|stubs| stubs.method) else {
        let error = LoweringError::MissingMethodStub(full_name.clone());
        warn!(method = %full_name, %error, "skipping method");
        return DeltaGraph::default();
    };
    let (block, method_return) = stubs
        .map(|stubs| (stubs.block, stubs.method_return))
        .unwrap_or_default();

    let mut lowering = Lowering {
        method,
        body,
        arena,
        methods,
        types,
        calls,
        builder: DeltaGraphBuilder::new(),
        assoc: AssociationMap::new(),
        local_nodes: BTreeSet::new(),
        method_node,
        block,
        method_return,
        block_order: 0,
        position: method.position,
    };
    if let Err(error) = lowering.run() {
        warn!(method = %full_name, %error, "lowering aborted; returning the partial delta graph");
    }
    debug!(method = %full_name, ops = lowering.builder_len(), "lowered method body");
    lowering.builder.build()
}

/// Lowers a [`Method`] into its code property graph fragment.
pub trait LowerToCpg {
    /// Runs the AST, CFG, and PDG passes over the method body and returns
    /// the resulting delta. See [`lower_method`].
    fn lower_to_cpg(
        &self,
        arena: &mut NodeArena,
        methods: &mut MethodIndex,
        types: &TypeIndex,
        calls: &mut CallIndex,
    ) -> DeltaGraph;
}

impl LowerToCpg for Method {
    fn lower_to_cpg(
        &self,
        arena: &mut NodeArena,
        methods: &mut MethodIndex,
        types: &TypeIndex,
        calls: &mut CallIndex,
    ) -> DeltaGraph {
        lower_method(self, arena, methods, types, calls)
    }
}

/// The per-method state shared by the three passes.
struct Lowering<'a> {
    method: &'a Method,
    body: &'a Body,
    arena: &'a mut NodeArena,
    methods: &'a mut MethodIndex,
    types: &'a TypeIndex,
    calls: &'a mut CallIndex,
    builder: DeltaGraphBuilder,
    assoc: AssociationMap,
    /// The `LOCAL` nodes of the preamble, excluded from containment.
    local_nodes: BTreeSet<NodeId>,
    method_node: NodeId,
    block: Option<NodeId>,
    method_return: Option<NodeId>,
    /// The sibling order of the most recent block child.
    block_order: i32,
    /// The position of the statement currently being lowered; nodes
    /// without a position of their own inherit it.
    position: Position,
}

impl std::fmt::Debug for Lowering<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lowering")
            .field("method", &self.method.full_name())
            .field("block_order", &self.block_order)
            .finish_non_exhaustive()
    }
}

impl Lowering<'_> {
    fn run(&mut self) -> Result<(), LoweringError> {
        self.ast_pass()?;
        self.cfg_pass();
        self.pdg_pass();
        self.containment_sweep();
        Ok(())
    }

    fn builder_len(&self) -> usize {
        self.builder.len()
    }

    /// Allocates a node, logs its addition, and attaches its `EVAL_TYPE`
    /// edge when the type registry knows the type.
    fn new_node(
        &mut self,
        kind: NodeKind,
        code: String,
        type_full_name: String,
        order: i32,
        argument_index: i32,
    ) -> NodeId {
        let type_node = self.types.type_node(&type_full_name);
        let id = self.arena.alloc(Node {
            kind,
            code,
            type_full_name,
            order,
            argument_index,
            line: self.position.line,
            column: self.position.column,
        });
        self.builder.add_node(id);
        if let Some(type_node) = type_node {
            self.builder.add_edge(id, type_node, EdgeLabel::EvalType);
        }
        id
    }

    fn add_edge(&mut self, src: NodeId, dst: NodeId, label: EdgeLabel) {
        self.builder.add_edge(src, dst, label);
    }

    /// Claims the next sibling slot below the method-body block.
    fn next_block_child(&mut self) -> i32 {
        self.block_order += 1;
        self.block_order
    }

    /// Connects a statement root below the method-body block, unless the
    /// stub provider did not hand one out.
    fn attach_to_block(&mut self, node: NodeId) {
        if let Some(block) = self.block {
            self.add_edge(block, node, EdgeLabel::Ast);
        }
    }
}
