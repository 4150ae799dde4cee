//! JVM non-generic type system as it appears in Jimple bodies.

use std::{fmt::Display, iter::Peekable, str::Chars, str::FromStr};

use itertools::Itertools;

use super::references::ClassRef;

/// An error raised when a type or method descriptor cannot be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid descriptor: {0}")]
pub struct InvalidDescriptor(pub String);

/// A primitive type in Java.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum PrimitiveType {
    /// The `boolean` type.
    Boolean,
    /// The `char` type.
    Char,
    /// The `float` type.
    Float,
    /// The `double` type.
    Double,
    /// The `byte` type.
    Byte,
    /// The `short` type.
    Short,
    /// The `int` type.
    Int,
    /// The `long` type.
    Long,
}

impl PrimitiveType {
    const fn descriptor_str(self) -> &'static str {
        match self {
            Self::Boolean => "Z",
            Self::Char => "C",
            Self::Float => "F",
            Self::Double => "D",
            Self::Byte => "B",
            Self::Short => "S",
            Self::Int => "I",
            Self::Long => "J",
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Char => write!(f, "char"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
        }
    }
}

impl TryFrom<char> for PrimitiveType {
    type Error = InvalidDescriptor;

    fn try_from(descriptor: char) -> Result<Self, Self::Error> {
        match descriptor {
            'Z' => Ok(Self::Boolean),
            'C' => Ok(Self::Char),
            'F' => Ok(Self::Float),
            'D' => Ok(Self::Double),
            'B' => Ok(Self::Byte),
            'S' => Ok(Self::Short),
            'I' => Ok(Self::Int),
            'J' => Ok(Self::Long),
            unexpected => Err(InvalidDescriptor(unexpected.to_string())),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(InvalidDescriptor(descriptor.to_owned())),
        }
    }
}

/// A field type (non-generic) in Java.
///
/// Class names are kept in the dotted form Jimple renders
/// (`java.lang.String`); descriptors with `/` separators are normalized
/// when parsed.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum FieldType {
    /// A primitive type.
    Base(PrimitiveType),
    /// A reference type (except arrays).
    Object(ClassRef),
    /// An array type.
    Array(Box<FieldType>),
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base(it) => it.fmt(f),
            Self::Object(it) => it.fmt(f),
            Self::Array(it) => write!(f, "{it}[]"),
        }
    }
}

impl FieldType {
    /// Creates an array type with the given type as its elements.
    #[must_use]
    pub fn make_array_type(&self) -> Self {
        Self::Array(Box::new(self.clone()))
    }

    /// Returns the element type if this is an array type.
    #[must_use]
    pub fn element_type(&self) -> Option<&FieldType> {
        match self {
            Self::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub(crate) fn descriptor_string(&self) -> String {
        match self {
            Self::Base(it) => it.descriptor_str().to_owned(),
            Self::Object(ClassRef { name }) => format!("L{};", name.replace('.', "/")),
            Self::Array(inner) => format!("[{}", inner.descriptor_string()),
        }
    }

    fn parse(chars: &mut Peekable<Chars<'_>>) -> Option<Self> {
        match chars.next()? {
            '[' => Self::parse(chars).map(|it| it.make_array_type()),
            'L' => {
                let name = chars.take_while_ref(|it| it != &';').collect::<String>();
                match chars.next() {
                    Some(';') if !name.is_empty() => {
                        Some(Self::Object(ClassRef::new(name.replace('/', "."))))
                    }
                    _ => None,
                }
            }
            c => PrimitiveType::try_from(c).ok().map(Self::Base),
        }
    }
}

impl FromStr for FieldType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars().peekable();
        match (Self::parse(&mut chars), chars.next()) {
            (Some(it), None) => Ok(it),
            _ => Err(InvalidDescriptor(descriptor.to_owned())),
        }
    }
}

/// Denotes the return type of a method.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display, derive_more::From)]
pub enum ReturnType {
    /// The method returns a specific type.
    Some(FieldType),
    /// The return type of the method is `void`.
    #[display("void")]
    Void,
}

impl ReturnType {
    /// Returns the concrete field type, or [`None`] for `void`.
    #[must_use]
    pub fn field_type(&self) -> Option<&FieldType> {
        match self {
            Self::Some(it) => Some(it),
            Self::Void => None,
        }
    }
}

/// The descriptor of a method, i.e., its parameter types and return type.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MethodDescriptor {
    /// The type of the parameters.
    pub parameters_types: Vec<FieldType>,
    /// The return type.
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// Renders the descriptor in JVM form (e.g., `(II)I`).
    #[must_use]
    pub fn descriptor_string(&self) -> String {
        let params = self
            .parameters_types
            .iter()
            .map(FieldType::descriptor_string)
            .join("");
        let ret = match &self.return_type {
            ReturnType::Some(it) => it.descriptor_string(),
            ReturnType::Void => "V".to_owned(),
        };
        format!("({params}){ret}")
    }
}

impl FromStr for MethodDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let err = || InvalidDescriptor(descriptor.to_owned());
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(err());
        }
        let mut parameters_types = Vec::new();
        while chars.peek().is_some_and(|it| it != &')') {
            parameters_types.push(FieldType::parse(&mut chars).ok_or_else(err)?);
        }
        if chars.next() != Some(')') {
            return Err(err());
        }
        let return_type = if chars.peek() == Some(&'V') {
            chars.next();
            ReturnType::Void
        } else {
            ReturnType::Some(FieldType::parse(&mut chars).ok_or_else(err)?)
        };
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Self {
            parameters_types,
            return_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn field_type_from_descriptor() {
        assert_eq!(
            "I".parse::<FieldType>(),
            Ok(FieldType::Base(PrimitiveType::Int))
        );
        assert_eq!(
            "Ljava/lang/String;".parse::<FieldType>(),
            Ok(FieldType::Object(ClassRef::new("java.lang.String")))
        );
        assert_eq!(
            "[[J".parse::<FieldType>(),
            Ok(FieldType::Base(PrimitiveType::Long)
                .make_array_type()
                .make_array_type())
        );
        assert!("Ljava/lang/String".parse::<FieldType>().is_err());
        assert!("II".parse::<FieldType>().is_err());
        assert!("".parse::<FieldType>().is_err());
    }

    #[test]
    fn field_type_display() {
        let ty: FieldType = "[Ljava/lang/Object;".parse().unwrap();
        assert_eq!(ty.to_string(), "java.lang.Object[]");
    }

    #[test]
    fn method_descriptor_from_str() {
        let descriptor: MethodDescriptor = "(II)I".parse().unwrap();
        assert_eq!(descriptor.parameters_types.len(), 2);
        assert_eq!(descriptor.return_type.to_string(), "int");

        let descriptor: MethodDescriptor = "(Ljava/lang/String;[I)V".parse().unwrap();
        assert_eq!(descriptor.parameters_types.len(), 2);
        assert_eq!(descriptor.return_type, ReturnType::Void);

        assert!("II)I".parse::<MethodDescriptor>().is_err());
        assert!("(II".parse::<MethodDescriptor>().is_err());
        assert!("(II)IJ".parse::<MethodDescriptor>().is_err());
    }

    proptest! {
        #[test]
        fn primitive_descriptor_round_trip(ty in any::<PrimitiveType>()) {
            let descriptor = ty.descriptor_str();
            prop_assert_eq!(descriptor.parse::<PrimitiveType>().map(FieldType::Base).ok(),
                descriptor.parse::<FieldType>().ok());
        }

        #[test]
        fn array_depth_round_trip(ty in any::<PrimitiveType>(), depth in 0usize..5) {
            let mut field_type = FieldType::Base(ty);
            for _ in 0..depth {
                field_type = field_type.make_array_type();
            }
            let descriptor = field_type.descriptor_string();
            prop_assert_eq!(descriptor.parse::<FieldType>(), Ok(field_type));
        }
    }
}
