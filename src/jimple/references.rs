//! References to the JVM elements a method body mentions.

use std::fmt::Display;

use itertools::Itertools;

use super::types::{FieldType, MethodDescriptor};

/// A reference to a class.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct ClassRef {
    /// The fully qualified dotted name of the class.
    pub name: String,
}

impl ClassRef {
    /// Creates a new [`ClassRef`] from a fully qualified name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        ClassRef { name: name.into() }
    }
}

impl Display for ClassRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A reference to a field.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct FieldRef {
    /// A reference to the class that declares the field.
    pub owner: ClassRef,
    /// The name of the field.
    pub name: String,
    /// The type of the field.
    pub field_type: FieldType,
}

impl FieldRef {
    /// Renders the canonical field signature, e.g.
    /// `<com.example.Foo: int f>`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("<{}: {} {}>", self.owner, self.field_type, self.name)
    }
}

impl Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// A reference to a method.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MethodRef {
    /// The reference to the class declaring the method.
    pub owner: ClassRef,
    /// The name of the method.
    pub name: String,
    /// The descriptor of the method.
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    /// Renders the signature used on `CALL` nodes, e.g. `int(int,int)`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.descriptor.return_type,
            self.descriptor.parameters_types.iter().join(",")
        )
    }

    /// Renders the full name used on `CALL` nodes, e.g.
    /// `java.lang.Math.max:int(int,int)`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}:{}", self.owner, self.name, self.signature())
    }
}

impl Display for MethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}
