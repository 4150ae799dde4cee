//! Method bodies: arena-allocated statements, values, and locals, plus the
//! successor graph over statements.
//!
//! All IR entities are referenced through copyable id handles into the
//! owning [`Body`]. Handle equality is allocation identity, never structural
//! equality: two uses of the same local are two distinct [`ValueId`]s.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::{
    constant::ConstantValue,
    references::ClassRef,
    stmt::{MonitorKind, Position, Stmt, StmtKind},
    types::{FieldType, PrimitiveType},
    value::{BinOp, IdentityRef, InvokeExpr, Value},
};

/// A handle to a [`Stmt`] in a [`Body`].
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
#[display("s{_0}")]
pub struct StmtId(u32);

/// A handle to a [`Value`] in a [`Body`].
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
#[display("v{_0}")]
pub struct ValueId(u32);

/// A handle to a [`Local`] in a [`Body`].
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
#[display("l{_0}")]
pub struct LocalId(u32);

/// A named, typed variable of a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    /// The name of the variable.
    pub name: String,
    /// The declared type of the variable.
    pub ty: FieldType,
}

/// The body of a method: statements in textual order, the values they use,
/// the declared locals, and the successor graph.
#[derive(Debug, Clone, Default)]
pub struct Body {
    locals: Vec<Local>,
    params: Vec<LocalId>,
    values: Vec<Value>,
    stmts: Vec<Stmt>,
    heads: Vec<StmtId>,
    succs: BTreeMap<StmtId, Vec<StmtId>>,
}

impl Body {
    /// Returns the local behind a handle.
    #[must_use]
    pub fn local(&self, id: LocalId) -> &Local {
        &self.locals[id.0 as usize]
    }

    /// Returns the value behind a handle.
    #[must_use]
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    /// Returns the statement behind a handle.
    #[must_use]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    /// Iterates the statements in textual order.
    pub fn stmts(&self) -> impl Iterator<Item = (StmtId, &Stmt)> {
        self.stmts
            .iter()
            .enumerate()
            .map(|(i, stmt)| (StmtId(u32::try_from(i).expect("body statement count")), stmt))
    }

    /// Iterates the declared locals.
    pub fn locals(&self) -> impl Iterator<Item = (LocalId, &Local)> {
        self.locals
            .iter()
            .enumerate()
            .map(|(i, local)| (LocalId(u32::try_from(i).expect("body local count")), local))
    }

    /// The parameter locals, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[LocalId] {
        &self.params
    }

    /// The head statements: entry points with no predecessor in the
    /// successor graph.
    #[must_use]
    pub fn heads(&self) -> &[StmtId] {
        &self.heads
    }

    /// The control-flow successors of a statement.
    #[must_use]
    pub fn succs(&self, stmt: StmtId) -> &[StmtId] {
        self.succs.get(&stmt).map_or(&[], Vec::as_slice)
    }

    /// The value handles a statement directly uses.
    #[must_use]
    pub fn uses(&self, stmt: StmtId) -> Vec<ValueId> {
        match self.stmt(stmt).kind {
            StmtKind::Identity { identity_ref, .. } => vec![identity_ref],
            StmtKind::Assign { value, .. } => vec![value],
            StmtKind::If { condition } => vec![condition],
            StmtKind::LookupSwitch { key, .. } | StmtKind::TableSwitch { key, .. } => vec![key],
            StmtKind::Invoke { expr } => vec![expr],
            StmtKind::Return { operand }
            | StmtKind::Throw { operand }
            | StmtKind::Monitor { operand, .. } => vec![operand],
            StmtKind::Goto { .. }
            | StmtKind::ReturnVoid
            | StmtKind::Nop
            | StmtKind::Breakpoint => Vec::new(),
        }
    }

    /// The type a value evaluates to, or [`None`] where no field type
    /// exists (`null`, `void` invocations, malformed element accesses).
    #[must_use]
    pub fn field_type_of(&self, id: ValueId) -> Option<FieldType> {
        match self.value(id) {
            Value::Local(l) => Some(self.local(*l).ty.clone()),
            Value::IdentityRef(IdentityRef::This { class }) => {
                Some(FieldType::Object(class.clone()))
            }
            Value::IdentityRef(IdentityRef::Parameter { ty, .. }) => Some(ty.clone()),
            Value::Constant(c) => match c {
                ConstantValue::Null => None,
                ConstantValue::Integer(_) => Some(FieldType::Base(PrimitiveType::Int)),
                ConstantValue::Long(_) => Some(FieldType::Base(PrimitiveType::Long)),
                ConstantValue::Float(_) => Some(FieldType::Base(PrimitiveType::Float)),
                ConstantValue::Double(_) => Some(FieldType::Base(PrimitiveType::Double)),
                ConstantValue::String(_) => {
                    Some(FieldType::Object(ClassRef::new("java.lang.String")))
                }
                ConstantValue::Class(_) => {
                    Some(FieldType::Object(ClassRef::new("java.lang.Class")))
                }
            },
            Value::Invoke(expr) => expr.callee.descriptor.return_type.field_type().cloned(),
            Value::Binop { op, left, .. } => match op {
                BinOp::Cmp | BinOp::Cmpl | BinOp::Cmpg => {
                    Some(FieldType::Base(PrimitiveType::Int))
                }
                _ => self.field_type_of(*left),
            },
            Value::Condition { .. } | Value::InstanceOf { .. } => {
                Some(FieldType::Base(PrimitiveType::Boolean))
            }
            Value::Cast { target, .. } => Some(target.clone()),
            Value::ArrayRef { base, .. } => self
                .field_type_of(*base)
                .and_then(|ty| ty.element_type().cloned()),
            Value::Length { .. } => Some(FieldType::Base(PrimitiveType::Int)),
            Value::Neg { operand } => self.field_type_of(*operand),
            Value::New { class } => Some(FieldType::Object(class.clone())),
            Value::NewArray { element, .. } => Some(element.make_array_type()),
            Value::NewMultiArray {
                element,
                dimensions,
            } => Some(
                (0..dimensions.len()).fold(element.clone(), |ty, _| ty.make_array_type()),
            ),
            Value::CaughtException { ty } => Some(FieldType::Object(ty.clone())),
            Value::StaticFieldRef { field } | Value::InstanceFieldRef { field, .. } => {
                Some(field.field_type.clone())
            }
        }
    }

    /// The full name of the type a value evaluates to, as written on CPG
    /// nodes.
    #[must_use]
    pub fn type_name_of(&self, id: ValueId) -> String {
        match (self.field_type_of(id), self.value(id)) {
            (Some(ty), _) => ty.to_string(),
            (None, Value::Constant(ConstantValue::Null)) => "null".to_owned(),
            (None, _) => "void".to_owned(),
        }
    }

    /// Renders the source-like text of a value, used for `code` properties.
    #[must_use]
    pub fn code_of(&self, id: ValueId) -> String {
        match self.value(id) {
            Value::Local(l) => self.local(*l).name.clone(),
            Value::IdentityRef(ir) => ir.to_string(),
            Value::Constant(c) => c.to_string(),
            Value::Invoke(expr) => self.invoke_code(expr),
            Value::Binop { op, left, right } => format!(
                "{} {} {}",
                self.code_of(*left),
                op.symbol(),
                self.code_of(*right)
            ),
            Value::Condition { op, left, right } => format!(
                "{} {} {}",
                self.code_of(*left),
                op.symbol(),
                self.code_of(*right)
            ),
            Value::Cast { target, operand } => {
                format!("({target}) {}", self.code_of(*operand))
            }
            Value::ArrayRef { base, index } => {
                format!("{}[{}]", self.code_of(*base), self.code_of(*index))
            }
            Value::InstanceOf { check, operand } => {
                format!("{} instanceof {check}", self.code_of(*operand))
            }
            Value::Length { operand } => format!("lengthof {}", self.code_of(*operand)),
            Value::Neg { operand } => format!("-{}", self.code_of(*operand)),
            Value::New { class } => format!("new {class}"),
            Value::NewArray { element, length } => {
                format!("new {element}[{}]", self.code_of(*length))
            }
            Value::NewMultiArray {
                element,
                dimensions,
            } => format!(
                "new {element}{}",
                dimensions
                    .iter()
                    .map(|d| format!("[{}]", self.code_of(*d)))
                    .join("")
            ),
            Value::CaughtException { .. } => "@caughtexception".to_owned(),
            Value::StaticFieldRef { field } => format!("{}.{}", field.owner, field.name),
            Value::InstanceFieldRef { base, field } => {
                format!("{}.{}", self.code_of(*base), field.name)
            }
        }
    }

    fn invoke_code(&self, expr: &InvokeExpr) -> String {
        let args = expr.all_args().map(|arg| self.code_of(arg)).join(", ");
        match expr.base {
            Some(base) => format!("{}.{}({args})", self.code_of(base), expr.callee.name),
            None if expr.is_static_dispatch() => {
                format!("{}.{}({args})", expr.callee.owner, expr.callee.name)
            }
            None => format!("{}({args})", expr.callee.name),
        }
    }

    /// Renders the source-like text of a statement.
    #[must_use]
    pub fn stmt_code(&self, id: StmtId) -> String {
        match &self.stmt(id).kind {
            StmtKind::Identity {
                local,
                identity_ref,
            } => format!("{} := {}", self.code_of(*local), self.code_of(*identity_ref)),
            StmtKind::Assign { target, value } => {
                format!("{} = {}", self.code_of(*target), self.code_of(*value))
            }
            StmtKind::If { condition } => format!("if ({})", self.code_of(*condition)),
            StmtKind::Goto { .. } => "goto".to_owned(),
            StmtKind::LookupSwitch { key, .. } | StmtKind::TableSwitch { key, .. } => {
                format!("switch ({})", self.code_of(*key))
            }
            StmtKind::Invoke { expr } => self.code_of(*expr),
            StmtKind::Return { operand } => format!("return {}", self.code_of(*operand)),
            StmtKind::ReturnVoid => "return".to_owned(),
            StmtKind::Throw { operand } => format!("throw {}", self.code_of(*operand)),
            StmtKind::Monitor {
                kind: MonitorKind::Enter,
                operand,
            } => format!("entermonitor {}", self.code_of(*operand)),
            StmtKind::Monitor {
                kind: MonitorKind::Exit,
                operand,
            } => format!("exitmonitor {}", self.code_of(*operand)),
            StmtKind::Nop => "nop".to_owned(),
            StmtKind::Breakpoint => "breakpoint".to_owned(),
        }
    }
}

/// Constructs a [`Body`] one entity at a time.
///
/// The builder is how an external bytecode loader (or a test) hands a
/// decompiled body to the lowering core; ids it returns are valid only for
/// the body it builds.
#[derive(Debug, Default)]
pub struct BodyBuilder {
    body: Body,
}

impl BodyBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a local variable.
    pub fn local<S: Into<String>>(&mut self, name: S, ty: FieldType) -> LocalId {
        let id = LocalId(u32::try_from(self.body.locals.len()).expect("local count"));
        self.body.locals.push(Local {
            name: name.into(),
            ty,
        });
        id
    }

    /// Declares a parameter local.
    pub fn param<S: Into<String>>(&mut self, name: S, ty: FieldType) -> LocalId {
        let id = self.local(name, ty);
        self.body.params.push(id);
        id
    }

    /// Allocates a value.
    pub fn value(&mut self, value: Value) -> ValueId {
        let id = ValueId(u32::try_from(self.body.values.len()).expect("value count"));
        self.body.values.push(value);
        id
    }

    /// Appends a statement in textual order.
    pub fn stmt(&mut self, kind: StmtKind, position: Position) -> StmtId {
        let id = StmtId(u32::try_from(self.body.stmts.len()).expect("statement count"));
        self.body.stmts.push(Stmt { kind, position });
        id
    }

    /// Marks a statement as a head (entry point).
    pub fn head(&mut self, stmt: StmtId) {
        self.body.heads.push(stmt);
    }

    /// Records a control-flow successor edge.
    pub fn succ(&mut self, from: StmtId, to: StmtId) {
        self.body.succs.entry(from).or_default().push(to);
    }

    /// Finishes the body.
    #[must_use]
    pub fn build(self) -> Body {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::super::references::ClassRef;
    use super::super::value::{BinOp, CondOp};
    use super::*;

    fn int() -> FieldType {
        FieldType::Base(PrimitiveType::Int)
    }

    #[test]
    fn code_rendering() {
        let mut builder = BodyBuilder::new();
        let a = builder.local("a", int());
        let b = builder.local("b", int().make_array_type());
        let a_use = builder.value(Value::Local(a));
        let two = builder.value(Value::Constant(ConstantValue::Integer(2)));
        let sum = builder.value(Value::Binop {
            op: BinOp::Add,
            left: a_use,
            right: two,
        });
        let b_use = builder.value(Value::Local(b));
        let idx = builder.value(Value::Constant(ConstantValue::Integer(0)));
        let elem = builder.value(Value::ArrayRef {
            base: b_use,
            index: idx,
        });
        let body = builder.build();

        assert_eq!(body.code_of(sum), "a + 2");
        assert_eq!(body.code_of(elem), "b[0]");
        assert_eq!(body.field_type_of(elem), Some(int()));
        assert_eq!(body.type_name_of(sum), "int");
    }

    #[test]
    fn condition_is_boolean() {
        let mut builder = BodyBuilder::new();
        let x = builder.local("x", int());
        let x_use = builder.value(Value::Local(x));
        let zero = builder.value(Value::Constant(ConstantValue::Integer(0)));
        let cond = builder.value(Value::Condition {
            op: CondOp::Eq,
            left: x_use,
            right: zero,
        });
        let body = builder.build();

        assert_eq!(body.code_of(cond), "x == 0");
        assert_eq!(body.type_name_of(cond), "boolean");
    }

    #[test]
    fn null_constant_type_name() {
        let mut builder = BodyBuilder::new();
        let null = builder.value(Value::Constant(ConstantValue::Null));
        let body = builder.build();
        assert_eq!(body.type_name_of(null), "null");
    }

    #[test]
    fn identity_ref_local_name() {
        let this = IdentityRef::This {
            class: ClassRef::new("com.example.Foo"),
        };
        assert_eq!(this.to_string(), "@this: com.example.Foo");
        assert_eq!(this.local_name(), "@this");

        let param = IdentityRef::Parameter {
            index: 1,
            ty: int(),
        };
        assert_eq!(param.to_string(), "@parameter1: int");
        assert_eq!(param.local_name(), "@parameter1");
    }

    #[test]
    fn successor_graph_defaults_empty() {
        let mut builder = BodyBuilder::new();
        let s0 = builder.stmt(StmtKind::Nop, Position::NONE);
        let s1 = builder.stmt(StmtKind::ReturnVoid, Position::NONE);
        builder.succ(s0, s1);
        builder.head(s0);
        let body = builder.build();

        assert_eq!(body.succs(s0), &[s1]);
        assert!(body.succs(s1).is_empty());
        assert_eq!(body.heads(), &[s0]);
    }
}
