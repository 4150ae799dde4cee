//! The closed set of value kinds appearing in Jimple statements.

use std::fmt::Display;

use super::{
    body::{LocalId, ValueId},
    constant::ConstantValue,
    references::{ClassRef, FieldRef, MethodRef},
    types::FieldType,
};

/// A value appearing in a statement.
///
/// Jimple is three-address code: operands of compound values are always
/// immediates (locals or constants), referenced through [`ValueId`] handles
/// into the owning [`Body`](super::Body).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A use of a local variable.
    Local(LocalId),
    /// A `this` or parameter placeholder on the right side of an identity
    /// statement.
    IdentityRef(IdentityRef),
    /// A compile-time constant.
    Constant(ConstantValue),
    /// A method invocation.
    Invoke(InvokeExpr),
    /// A binary arithmetic or bitwise operation.
    Binop {
        /// The operator.
        op: BinOp,
        /// The left operand.
        left: ValueId,
        /// The right operand.
        right: ValueId,
    },
    /// A relational comparison, as used by `if` statements.
    Condition {
        /// The comparison operator.
        op: CondOp,
        /// The left operand.
        left: ValueId,
        /// The right operand.
        right: ValueId,
    },
    /// A checked cast.
    Cast {
        /// The type being cast to.
        target: FieldType,
        /// The value being cast.
        operand: ValueId,
    },
    /// An array element access.
    ArrayRef {
        /// The array.
        base: ValueId,
        /// The element index.
        index: ValueId,
    },
    /// An `instanceof` check.
    InstanceOf {
        /// The type being checked against.
        check: FieldType,
        /// The value being checked.
        operand: ValueId,
    },
    /// The length of an array.
    Length {
        /// The array.
        operand: ValueId,
    },
    /// Arithmetic negation.
    Neg {
        /// The negated value.
        operand: ValueId,
    },
    /// An object allocation.
    New {
        /// The class being instantiated.
        class: ClassRef,
    },
    /// A one-dimensional array allocation.
    NewArray {
        /// The element type.
        element: FieldType,
        /// The number of elements.
        length: ValueId,
    },
    /// A multi-dimensional array allocation.
    ///
    /// No lowering shape exists for this kind; it surfaces as `UNKNOWN`.
    NewMultiArray {
        /// The element type.
        element: FieldType,
        /// The sizes of the leading dimensions.
        dimensions: Vec<ValueId>,
    },
    /// The exception caught by a handler block.
    CaughtException {
        /// The type of the caught exception.
        ty: ClassRef,
    },
    /// A read of a static field.
    StaticFieldRef {
        /// The field.
        field: FieldRef,
    },
    /// A read of an instance field.
    InstanceFieldRef {
        /// The object holding the field.
        base: ValueId,
        /// The field.
        field: FieldRef,
    },
}

/// A `this` or parameter placeholder bound by an identity statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRef {
    /// The `this` reference of an instance method.
    This {
        /// The declaring class.
        class: ClassRef,
    },
    /// A parameter of the method.
    Parameter {
        /// The zero-based parameter index.
        index: u16,
        /// The type of the parameter.
        ty: FieldType,
    },
}

impl IdentityRef {
    /// The name of the synthetic local this placeholder declares, i.e. its
    /// textual form with the type suffix stripped.
    #[must_use]
    pub fn local_name(&self) -> String {
        match self {
            Self::This { .. } => "@this".to_owned(),
            Self::Parameter { index, .. } => format!("@parameter{index}"),
        }
    }

    /// The full name of the type the placeholder evaluates to.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::This { class } => class.to_string(),
            Self::Parameter { ty, .. } => ty.to_string(),
        }
    }
}

impl Display for IdentityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::This { class } => write!(f, "@this: {class}"),
            Self::Parameter { index, ty } => write!(f, "@parameter{index}: {ty}"),
        }
    }
}

/// A method invocation expression.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    /// How the callee is resolved.
    pub kind: InvokeKind,
    /// The method being invoked.
    pub callee: MethodRef,
    /// The receiver, for instance invocations.
    pub base: Option<ValueId>,
    /// The arguments, in declaration order.
    pub args: Vec<ValueId>,
    /// The bootstrap-method arguments of a dynamic invocation.
    pub bootstrap_args: Vec<ValueId>,
}

impl InvokeExpr {
    /// Whether the callee is statically bound.
    #[must_use]
    pub fn is_static_dispatch(&self) -> bool {
        matches!(self.kind, InvokeKind::Static)
    }

    /// The arguments followed by any bootstrap arguments.
    pub fn all_args(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.args.iter().chain(&self.bootstrap_args).copied()
    }
}

/// The dispatch flavor of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// `invokestatic`.
    Static,
    /// `invokevirtual`.
    Virtual,
    /// `invokespecial`.
    Special,
    /// `invokeinterface`.
    Interface,
    /// `invokedynamic`.
    Dynamic,
}

/// A binary arithmetic or bitwise operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Rem,
    /// Shift left.
    Shl,
    /// Arithmetic shift right.
    Shr,
    /// Logical shift right.
    Ushr,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Bitwise xor.
    Xor,
    /// Long comparison (`lcmp`).
    Cmp,
    /// Floating-point comparison where NaN compares smallest.
    Cmpl,
    /// Floating-point comparison where NaN compares largest.
    Cmpg,
}

impl BinOp {
    /// The operator symbol used in source-like code text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Ushr => ">>>",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Cmp | Self::Cmpl | Self::Cmpg => "cmp",
        }
    }
}

/// A relational comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum CondOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CondOp {
    /// The operator symbol used in source-like code text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}
