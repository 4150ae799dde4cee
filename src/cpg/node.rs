//! Code property graph nodes and the arena that owns them.

/// A stable handle to a [`Node`] in a [`NodeArena`].
///
/// Handles are assigned on insertion and never reused; edges reference
/// nodes exclusively through handles, so nodes may participate in any
/// number of overlays without ownership cycles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
)]
#[repr(transparent)]
#[display("n{_0}")]
pub struct NodeId(u32);

/// How a parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EvaluationStrategy {
    /// The callee receives a copy of the value.
    #[display("BY_VALUE")]
    ByValue,
    /// The callee can reassign the caller's variable.
    #[display("BY_REFERENCE")]
    ByReference,
    /// The callee shares the referenced object.
    #[display("BY_SHARING")]
    BySharing,
}

/// How a call site binds its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DispatchType {
    /// The callee is resolved at compile time.
    #[display("STATIC_DISPATCH")]
    Static,
    /// The callee is resolved at run time.
    #[display("DYNAMIC_DISPATCH")]
    Dynamic,
}

/// The flavor of a `CONTROL_STRUCTURE` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ControlStructureType {
    /// A conditional branch.
    #[display("IF")]
    If,
    /// A `switch`.
    #[display("SWITCH")]
    Switch,
    /// An unconditional branch.
    #[display("GOTO")]
    Goto,
}

/// The kind of a node, together with its kind-specific properties.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A method declaration, created by the external method-stub pass.
    Method {
        /// The simple name of the method.
        name: String,
        /// The full name identifying the method across the graph.
        full_name: String,
        /// The method signature.
        signature: String,
    },
    /// The body block of a method, created by the external method-stub pass.
    Block,
    /// The return site of a method, created by the external method-stub
    /// pass.
    MethodReturn,
    /// A formal input parameter.
    MethodParameterIn {
        /// The parameter name.
        name: String,
        /// How the parameter is passed.
        evaluation_strategy: EvaluationStrategy,
    },
    /// The post-call view of a by-reference parameter.
    MethodParameterOut {
        /// The parameter name.
        name: String,
        /// How the parameter is passed back.
        evaluation_strategy: EvaluationStrategy,
    },
    /// A declared variable.
    Local {
        /// The variable name.
        name: String,
    },
    /// A use or definition site of a local or parameter.
    Identifier {
        /// The referenced name.
        name: String,
    },
    /// A constant value.
    Literal,
    /// An invocation or operator application.
    Call {
        /// The callee or operator name.
        name: String,
        /// The full name of the callee.
        method_full_name: String,
        /// The callee signature; empty for operators.
        signature: String,
        /// How the callee is bound.
        dispatch_type: DispatchType,
    },
    /// An `if`, `switch`, or `goto`.
    ControlStructure(ControlStructureType),
    /// A labeled case (or default) destination in a `switch`.
    JumpTarget {
        /// `case <n>` or `default`.
        name: String,
    },
    /// A canonical field signature below a field-access call.
    FieldIdentifier {
        /// The canonical field signature.
        canonical_name: String,
    },
    /// A `return` statement.
    Return,
    /// A reference to a type, e.g. an allocation site.
    TypeRef,
    /// An IR shape without a dedicated lowering.
    Unknown,
}

impl NodeKind {
    /// The schema label of the kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Method { .. } => "METHOD",
            Self::Block => "BLOCK",
            Self::MethodReturn => "METHOD_RETURN",
            Self::MethodParameterIn { .. } => "METHOD_PARAMETER_IN",
            Self::MethodParameterOut { .. } => "METHOD_PARAMETER_OUT",
            Self::Local { .. } => "LOCAL",
            Self::Identifier { .. } => "IDENTIFIER",
            Self::Literal => "LITERAL",
            Self::Call { .. } => "CALL",
            Self::ControlStructure(_) => "CONTROL_STRUCTURE",
            Self::JumpTarget { .. } => "JUMP_TARGET",
            Self::FieldIdentifier { .. } => "FIELD_IDENTIFIER",
            Self::Return => "RETURN",
            Self::TypeRef => "TYPE_REF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A code property graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The kind of the node and its kind-specific properties.
    pub kind: NodeKind,
    /// The source-like text of the entity.
    pub code: String,
    /// The full name of the type the node evaluates to.
    pub type_full_name: String,
    /// The one-based position among AST siblings of the same parent.
    pub order: i32,
    /// The argument position below a call, or the encoded case value of a
    /// jump target.
    pub argument_index: i32,
    /// The one-based source line, if known.
    pub line: Option<u32>,
    /// The one-based source column, if known.
    pub column: Option<u32>,
}

impl Node {
    /// The schema label of the node.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// The name property, for kinds that carry one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Method { name, .. }
            | NodeKind::MethodParameterIn { name, .. }
            | NodeKind::MethodParameterOut { name, .. }
            | NodeKind::Local { name }
            | NodeKind::Identifier { name }
            | NodeKind::Call { name, .. }
            | NodeKind::JumpTarget { name } => Some(name),
            _ => None,
        }
    }

    /// Whether the node is a `CALL`.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self.kind, NodeKind::Call { .. })
    }

    /// Whether the node is an `IDENTIFIER`.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self.kind, NodeKind::Identifier { .. })
    }

    /// Whether the node declares a name identifiers can reference: a
    /// `LOCAL` or a `METHOD_PARAMETER_IN`.
    #[must_use]
    pub const fn is_declaration(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Local { .. } | NodeKind::MethodParameterIn { .. }
        )
    }
}

/// The arena owning every node of a lowering run.
///
/// The arena plays the role of the graph backend for handle assignment:
/// node ids are stable from allocation on, so the delta log and all three
/// overlay passes can cross-reference nodes freely.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, assigning its stable id.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node count"));
        self.nodes.push(node);
        id
    }

    /// The number of nodes allocated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all allocated nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(u32::try_from(i).expect("node count")), node))
    }
}

impl std::ops::Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[u32::from(id) as usize]
    }
}

impl std::ops::IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[u32::from(id) as usize]
    }
}
