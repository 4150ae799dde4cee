//! Compile-time constants appearing as Jimple immediates.

use super::references::ClassRef;

/// Denotes a compile-time constant value.
///
/// The [`Display`](std::fmt::Display) rendering is the source-like text used
/// for the `code` property of `LITERAL` nodes.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ConstantValue {
    /// The `null` value.
    #[display("null")]
    Null,
    /// A primitive integer value (i.e., `int`).
    #[display("{_0}")]
    Integer(i32),
    /// A primitive long value (i.e., `long`).
    #[display("{_0}L")]
    Long(i64),
    /// A primitive floating point value (i.e., `float`).
    #[display("{_0}F")]
    Float(f32),
    /// A primitive double value (i.e., `double`).
    #[display("{_0}")]
    Double(f64),
    /// A string literal.
    #[display("\"{_0}\"")]
    String(String),
    /// A class literal.
    #[display("{_0}.class")]
    Class(ClassRef),
}

impl ConstantValue {
    /// The full name of the type the constant evaluates to.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "java.lang.String",
            Self::Class(_) => "java.lang.Class",
        }
    }
}

impl PartialEq<Self> for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(lhs), Self::Integer(rhs)) => lhs == rhs,
            (Self::Long(lhs), Self::Long(rhs)) => lhs == rhs,
            (Self::Float(lhs), Self::Float(rhs)) if lhs.is_nan() && rhs.is_nan() => true,
            (Self::Float(lhs), Self::Float(rhs)) => lhs == rhs,
            (Self::Double(lhs), Self::Double(rhs)) if lhs.is_nan() && rhs.is_nan() => true,
            (Self::Double(lhs), Self::Double(rhs)) => lhs == rhs,
            (Self::String(lhs), Self::String(rhs)) => lhs == rhs,
            (Self::Class(lhs), Self::Class(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Eq for ConstantValue {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_code_text() {
        assert_eq!(ConstantValue::Integer(5).to_string(), "5");
        assert_eq!(ConstantValue::Long(-3).to_string(), "-3L");
        assert_eq!(ConstantValue::Null.to_string(), "null");
        assert_eq!(ConstantValue::String("hi".into()).to_string(), "\"hi\"");
        assert_eq!(
            ConstantValue::Class(ClassRef::new("java.lang.Object")).to_string(),
            "java.lang.Object.class"
        );
    }

    #[test]
    fn nan_constants_compare_equal() {
        assert_eq!(
            ConstantValue::Float(f32::NAN),
            ConstantValue::Float(f32::NAN)
        );
        assert_ne!(ConstantValue::Float(f32::NAN), ConstantValue::Float(0.0));
    }
}
