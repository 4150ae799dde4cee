//! The closed set of statement kinds in a Jimple body.

use super::body::{StmtId, ValueId};

/// A source position attached to a statement or method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// The one-based source line, if known.
    pub line: Option<u32>,
    /// The one-based source column, if known.
    pub column: Option<u32>,
}

impl Position {
    /// An absent position.
    pub const NONE: Self = Self {
        line: None,
        column: None,
    };

    /// Creates a position from possibly-negative raw coordinates, treating
    /// negative values as absent.
    #[must_use]
    pub fn new(line: i64, column: i64) -> Self {
        Self {
            line: u32::try_from(line).ok(),
            column: u32::try_from(column).ok(),
        }
    }
}

/// A statement together with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// What the statement does.
    pub kind: StmtKind,
    /// Where the statement came from.
    pub position: Position,
}

/// A statement in a Jimple body.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Binds a `this` or parameter placeholder to a local, e.g.
    /// `r0 := @this: com.example.Foo`.
    Identity {
        /// The bound local, as a [`Value::Local`](super::Value::Local).
        local: ValueId,
        /// The placeholder, as a
        /// [`Value::IdentityRef`](super::Value::IdentityRef).
        identity_ref: ValueId,
    },
    /// An assignment, e.g. `a = b + 1`.
    Assign {
        /// The assigned local, field, or array element.
        target: ValueId,
        /// The assigned value.
        value: ValueId,
    },
    /// A conditional branch on a [`Value::Condition`](super::Value::Condition).
    If {
        /// The branch condition.
        condition: ValueId,
    },
    /// An unconditional branch.
    Goto {
        /// The branch target.
        target: StmtId,
    },
    /// A sparse `switch` keyed on literal lookup values.
    LookupSwitch {
        /// The value being switched on.
        key: ValueId,
        /// The literal value of each case, parallel to `targets`.
        lookup_values: Vec<i32>,
        /// The branch target of each case.
        targets: Vec<StmtId>,
        /// The target taken when no case matches.
        default_target: StmtId,
    },
    /// A dense `switch` over a contiguous value range.
    TableSwitch {
        /// The value being switched on.
        key: ValueId,
        /// The value the first case matches.
        low: i32,
        /// The branch target of each consecutive case.
        targets: Vec<StmtId>,
        /// The target taken when no case matches.
        default_target: StmtId,
    },
    /// An invocation evaluated for its effects.
    Invoke {
        /// The invocation, as a [`Value::Invoke`](super::Value::Invoke).
        expr: ValueId,
    },
    /// Returns a value from the method.
    Return {
        /// The returned value.
        operand: ValueId,
    },
    /// Returns from a `void` method.
    ReturnVoid,
    /// Throws an exception.
    Throw {
        /// The thrown value.
        operand: ValueId,
    },
    /// Acquires or releases an object monitor.
    Monitor {
        /// Whether the monitor is entered or exited.
        kind: MonitorKind,
        /// The object whose monitor is operated on.
        operand: ValueId,
    },
    /// A no-op; no lowering shape exists for this kind.
    Nop,
    /// A debugger breakpoint; no lowering shape exists for this kind.
    Breakpoint,
}

/// Whether a monitor statement enters or exits the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorKind {
    /// `entermonitor`.
    Enter,
    /// `exitmonitor`.
    Exit,
}
