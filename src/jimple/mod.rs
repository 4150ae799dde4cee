//! The Jimple-like input IR: a three-address, typed representation of JVM
//! method bodies in which operand stacks have been eliminated and every
//! non-trivial expression is a named temporary.
//!
//! The lowering core reads this model and never mutates it. Statements,
//! values, and locals are arena-allocated in a [`Body`] and referenced by
//! id handles; handle identity stands in for the reference identity the
//! cross-pass association map is keyed on.

mod body;
mod constant;
mod method;
mod references;
mod stmt;
mod types;
mod value;

pub use body::{Body, BodyBuilder, Local, LocalId, StmtId, ValueId};
pub use constant::ConstantValue;
pub use method::{Method, MethodAccessFlags};
pub use references::{ClassRef, FieldRef, MethodRef};
pub use stmt::{MonitorKind, Position, Stmt, StmtKind};
pub use types::{FieldType, InvalidDescriptor, MethodDescriptor, PrimitiveType, ReturnType};
pub use value::{BinOp, CondOp, IdentityRef, InvokeExpr, InvokeKind, Value};
