//! The append-only delta log a lowering run produces.

use std::collections::BTreeMap;

use petgraph::graph::DiGraph;

use super::{
    edge::{Edge, EdgeLabel},
    node::NodeId,
};

/// One recorded graph mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOp {
    /// A node was produced.
    AddNode(NodeId),
    /// An edge was produced.
    AddEdge(Edge),
}

/// Records node and edge additions in emission order.
///
/// The builder never deduplicates: the core may legitimately re-emit an
/// edge (the PDG pass re-asserts `ARGUMENT` edges), and consumers that
/// require set semantics dedupe on application.
#[derive(Debug, Default)]
pub struct DeltaGraphBuilder {
    ops: Vec<DeltaOp>,
}

impl DeltaGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a node addition.
    pub fn add_node(&mut self, node: NodeId) {
        self.ops.push(DeltaOp::AddNode(node));
    }

    /// Records an edge addition.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, label: EdgeLabel) {
        self.ops.push(DeltaOp::AddEdge(Edge::new(src, dst, label)));
    }

    /// The number of operations recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Finishes the log.
    #[must_use]
    pub fn build(self) -> DeltaGraph {
        DeltaGraph { ops: self.ops }
    }
}

/// The immutable result of a lowering run: an ordered log of node and edge
/// additions for bulk application to a graph backend.
#[derive(Debug, Clone, Default)]
pub struct DeltaGraph {
    ops: Vec<DeltaOp>,
}

impl DeltaGraph {
    /// The recorded operations, in emission order.
    #[must_use]
    pub fn ops(&self) -> &[DeltaOp] {
        &self.ops
    }

    /// The number of recorded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterates the added nodes, in emission order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DeltaOp::AddNode(id) => Some(*id),
            DeltaOp::AddEdge(_) => None,
        })
    }

    /// Iterates the added edges, in emission order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DeltaOp::AddEdge(edge) => Some(*edge),
            DeltaOp::AddNode(_) => None,
        })
    }

    /// Iterates the added edges carrying the given label.
    pub fn edges_labeled(&self, label: EdgeLabel) -> impl Iterator<Item = Edge> + '_ {
        self.edges().filter(move |edge| edge.label == label)
    }

    /// Builds a [`DiGraph`] view of the delta for downstream analyses,
    /// weighted by node handles.
    ///
    /// Nodes referenced only as edge endpoints (the pre-existing method
    /// stubs) are included, so the view is closed under its edges.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<NodeId, EdgeLabel> {
        let mut graph = DiGraph::new();
        let mut indices = BTreeMap::new();
        for id in self.nodes() {
            indices.entry(id).or_insert_with(|| graph.add_node(id));
        }
        for Edge { src, dst, label } in self.edges() {
            let src = *indices.entry(src).or_insert_with(|| graph.add_node(src));
            let dst = *indices.entry(dst).or_insert_with(|| graph.add_node(dst));
            graph.add_edge(src, dst, label);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::{Node, NodeArena, NodeKind};
    use super::*;

    fn blank(kind: NodeKind) -> Node {
        Node {
            kind,
            code: String::new(),
            type_full_name: String::new(),
            order: 1,
            argument_index: 1,
            line: None,
            column: None,
        }
    }

    #[test]
    fn emission_order_is_preserved() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(blank(NodeKind::Literal));
        let b = arena.alloc(blank(NodeKind::Literal));

        let mut builder = DeltaGraphBuilder::new();
        builder.add_node(a);
        builder.add_edge(a, b, EdgeLabel::Ast);
        builder.add_node(b);
        builder.add_edge(a, b, EdgeLabel::Ast);
        let delta = builder.build();

        assert_eq!(
            delta.ops(),
            &[
                DeltaOp::AddNode(a),
                DeltaOp::AddEdge(Edge::new(a, b, EdgeLabel::Ast)),
                DeltaOp::AddNode(b),
                DeltaOp::AddEdge(Edge::new(a, b, EdgeLabel::Ast)),
            ]
        );
        // Duplicates survive; dedup is the consumer's concern.
        assert_eq!(delta.edges_labeled(EdgeLabel::Ast).count(), 2);
    }

    #[test]
    fn petgraph_view_includes_stub_endpoints() {
        let mut arena = NodeArena::new();
        let stub = arena.alloc(blank(NodeKind::Block));
        let body = arena.alloc(blank(NodeKind::Literal));

        let mut builder = DeltaGraphBuilder::new();
        builder.add_node(body);
        builder.add_edge(stub, body, EdgeLabel::Ast);
        let graph = builder.build().to_petgraph();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
