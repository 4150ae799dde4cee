//! The literal operator names written on synthetic `CALL` nodes.
//!
//! These strings are part of the graph schema contract and must match
//! exactly; downstream passes select operator calls by name.

use crate::jimple::{BinOp, CondOp};

/// `=`
pub const ASSIGNMENT: &str = "<operator>.assignment";
/// `a[i]`
pub const INDEX_ACCESS: &str = "<operator>.indexAccess";
/// `a.f`
pub const FIELD_ACCESS: &str = "<operator>.fieldAccess";
/// `(T) a`
pub const CAST: &str = "<operator>.cast";
/// `a instanceof T`
pub const INSTANCE_OF: &str = "<operator>.instanceOf";
/// `lengthof a`
pub const LENGTH_OF: &str = "<operator>.lengthOf";
/// `-a`
pub const MINUS: &str = "<operator>.minus";

/// `a + b`
pub const ADDITION: &str = "<operator>.addition";
/// `a - b`
pub const SUBTRACTION: &str = "<operator>.subtraction";
/// `a * b`
pub const MULTIPLICATION: &str = "<operator>.multiplication";
/// `a / b`
pub const DIVISION: &str = "<operator>.division";
/// `a % b`
pub const MODULO: &str = "<operator>.modulo";
/// `a << b`
pub const SHIFT_LEFT: &str = "<operator>.shiftLeft";
/// `a >> b`
pub const ARITHMETIC_SHIFT_RIGHT: &str = "<operator>.arithmeticShiftRight";
/// `a >>> b`
pub const LOGICAL_SHIFT_RIGHT: &str = "<operator>.logicalShiftRight";
/// `a & b`
pub const AND: &str = "<operator>.and";
/// `a | b`
pub const OR: &str = "<operator>.or";
/// `a ^ b`
pub const XOR: &str = "<operator>.xor";
/// `cmp(a, b)`
pub const COMPARE: &str = "<operator>.compare";

/// `a == b`
pub const EQUALS: &str = "<operator>.equals";
/// `a != b`
pub const NOT_EQUALS: &str = "<operator>.notEquals";
/// `a < b`
pub const LESS_THAN: &str = "<operator>.lessThan";
/// `a <= b`
pub const LESS_EQUALS_THAN: &str = "<operator>.lessEqualsThan";
/// `a > b`
pub const GREATER_THAN: &str = "<operator>.greaterThan";
/// `a >= b`
pub const GREATER_EQUALS_THAN: &str = "<operator>.greaterEqualsThan";

/// The operator name for an arithmetic or bitwise operator.
#[must_use]
pub const fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => ADDITION,
        BinOp::Sub => SUBTRACTION,
        BinOp::Mul => MULTIPLICATION,
        BinOp::Div => DIVISION,
        BinOp::Rem => MODULO,
        BinOp::Shl => SHIFT_LEFT,
        BinOp::Shr => ARITHMETIC_SHIFT_RIGHT,
        BinOp::Ushr => LOGICAL_SHIFT_RIGHT,
        BinOp::And => AND,
        BinOp::Or => OR,
        BinOp::Xor => XOR,
        BinOp::Cmp | BinOp::Cmpl | BinOp::Cmpg => COMPARE,
    }
}

/// The operator name for a relational comparison operator.
#[must_use]
pub const fn condop_name(op: CondOp) -> &'static str {
    match op {
        CondOp::Eq => EQUALS,
        CondOp::Ne => NOT_EQUALS,
        CondOp::Lt => LESS_THAN,
        CondOp::Le => LESS_EQUALS_THAN,
        CondOp::Gt => GREATER_THAN,
        CondOp::Ge => GREATER_EQUALS_THAN,
    }
}
