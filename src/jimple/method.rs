//! Methods whose bodies are handed to the lowering core.

use bitflags::bitflags;
use itertools::Itertools;

use super::{body::Body, references::ClassRef, stmt::Position, types::MethodDescriptor};

bitflags! {
    /// The access flags of a method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class.
        const PRIVATE = 0x0002;
        /// Declared `protected`; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`; must not be overridden.
        const FINAL = 0x0010;
        /// Declared `synchronized`; invocation is wrapped by a monitor use.
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler.
        const BRIDGE = 0x0040;
        /// Declared with variable number of arguments.
        const VARARGS = 0x0080;
        /// Declared `native`; implemented in a language other than Java.
        const NATIVE = 0x0100;
        /// Declared `abstract`; no implementation is provided.
        const ABSTRACT = 0x0400;
        /// In a class file whose major version is at least 46 and at most 60,
        /// declared `strictfp`.
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
    }
}

/// A method presented to the lowering core.
#[derive(Debug, Clone)]
pub struct Method {
    /// The access flags of the method.
    pub access_flags: MethodAccessFlags,
    /// The name of the method.
    pub name: String,
    /// The class declaring the method.
    pub owner: ClassRef,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
    /// The declaration position of the method.
    pub position: Position,
    /// The decompiled body, absent for `abstract` and `native` methods.
    pub body: Option<Body>,
}

impl Method {
    /// Whether the method is `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// Renders the signature used on the method's CPG nodes, e.g.
    /// `int(int,int)`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.descriptor.return_type,
            self.descriptor.parameters_types.iter().join(",")
        )
    }

    /// Renders the full name identifying the method across the CPG, e.g.
    /// `java.lang.Math.max:int(int,int)`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}:{}", self.owner, self.name, self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_and_signature() {
        let method = Method {
            access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            name: "max".into(),
            owner: ClassRef::new("java.lang.Math"),
            descriptor: "(II)I".parse().unwrap(),
            position: Position::NONE,
            body: None,
        };
        assert!(method.is_static());
        assert_eq!(method.full_name(), "java.lang.Math.max:int(int,int)");

        let void_method = Method {
            access_flags: MethodAccessFlags::PUBLIC,
            name: "run".into(),
            owner: ClassRef::new("com.example.Job"),
            descriptor: "()V".parse().unwrap(),
            position: Position::NONE,
            body: None,
        };
        assert!(!void_method.is_static());
        assert_eq!(void_method.full_name(), "com.example.Job.run:void()");
    }
}
