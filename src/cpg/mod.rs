//! The code property graph output model: typed nodes in a handle arena,
//! labeled edges, and the ordered delta log a lowering run returns.

mod delta;
mod edge;
mod node;
pub mod operators;

pub use delta::{DeltaGraph, DeltaGraphBuilder, DeltaOp};
pub use edge::{Edge, EdgeLabel};
pub use node::{
    ControlStructureType, DispatchType, EvaluationStrategy, Node, NodeArena, NodeId, NodeKind,
};
