#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Welcome to `percolator`, a library that lowers Jimple-style JVM method
//! bodies into code property graph fragments.
//!
//! Given a method whose body has already been decompiled into a
//! three-address, typed intermediate representation ([`jimple`]) together
//! with a successor graph over its statements, the lowering core
//! ([`lowering`]) runs three passes — AST, CFG, and PDG — over a shared set
//! of graph nodes and returns an ordered [`cpg::DeltaGraph`] of node and
//! edge additions ready for bulk application to a graph backend.
//!
//! ```
//! use percolator::cpg::NodeArena;
//! use percolator::index::{CallIndex, MethodIndex, TypeIndex};
//! use percolator::jimple::{
//!     BodyBuilder, ClassRef, ConstantValue, FieldType, Method, MethodAccessFlags,
//!     MethodDescriptor, Position, PrimitiveType, StmtKind, Value,
//! };
//! use percolator::lowering::lower_method;
//!
//! let int_ty = FieldType::Base(PrimitiveType::Int);
//! let mut body = BodyBuilder::new();
//! let a = body.local("a", int_ty.clone());
//! let target = body.value(Value::Local(a));
//! let five = body.value(Value::Constant(ConstantValue::Integer(5)));
//! let assign = body.stmt(StmtKind::Assign { target, value: five }, Position::NONE);
//! body.head(assign);
//!
//! let method = Method {
//!     access_flags: MethodAccessFlags::STATIC,
//!     name: "answer".into(),
//!     owner: ClassRef::new("com.example.Answers"),
//!     descriptor: MethodDescriptor {
//!         parameters_types: vec![],
//!         return_type: int_ty.into(),
//!     },
//!     position: Position::NONE,
//!     body: Some(body.build()),
//! };
//!
//! let mut arena = NodeArena::new();
//! let mut methods = MethodIndex::new();
//! methods.seed_method_stubs(&mut arena, &method);
//! let types = TypeIndex::new();
//! let mut calls = CallIndex::new();
//!
//! let delta = lower_method(&method, &mut arena, &mut methods, &types, &mut calls);
//! assert!(!delta.is_empty());
//! ```

pub mod cpg;
pub mod index;
pub mod jimple;
pub mod lowering;
