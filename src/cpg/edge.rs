//! Code property graph edges.

use super::node::NodeId;

/// The label of an edge, naming the overlay it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EdgeLabel {
    /// Syntax-tree hierarchy.
    #[display("AST")]
    Ast,
    /// Control-flow successor.
    #[display("CFG")]
    Cfg,
    /// Call to argument.
    #[display("ARGUMENT")]
    Argument,
    /// Call to receiver.
    #[display("RECEIVER")]
    Receiver,
    /// Identifier to the local or parameter it references.
    #[display("REF")]
    Ref,
    /// Control structure to its condition expression.
    #[display("CONDITION")]
    Condition,
    /// Node to the type it evaluates to.
    #[display("EVAL_TYPE")]
    EvalType,
    /// Method to a node of its body.
    #[display("CONTAINS")]
    Contains,
    /// Input parameter to its output counterpart.
    #[display("PARAMETER_LINK")]
    ParameterLink,
}

/// A directed, labeled edge between two nodes.
///
/// Edges are plain records over node handles; they never own the nodes
/// they connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// The source node.
    pub src: NodeId,
    /// The destination node.
    pub dst: NodeId,
    /// The overlay label.
    pub label: EdgeLabel,
}

impl Edge {
    /// Creates a new edge.
    #[must_use]
    pub const fn new(src: NodeId, dst: NodeId, label: EdgeLabel) -> Self {
        Self { src, dst, label }
    }
}
