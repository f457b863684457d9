//! Typed three-address intermediate representation.
//!
//! Every operand and instruction carries a type suffix when printed (`.i32`, `.bool`, `.V`,
//! `.array.i32`, `.Name`). Lowering from the tree lives in [`lower`]; the register table
//! consumed by the assembly backend lives in [`vars`].

pub mod lower;
pub mod vars;

use crate::parser::ast::{BinOp, UnaryOp};
use crate::typeck::types::{Type, BOOLEAN, IMPORTED, INT, VOID};
use serde::Serialize;
use std::fmt;

pub use lower::{lower_program, ExprResult, TempCounter};
pub use vars::{VarDescriptor, VarTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IrType {
    Int32,
    Bool,
    Void,
    Array(Box<IrType>),
    /// A class reference. `String` is kept as a class name and mapped by the backend.
    Object(String),
}

impl IrType {
    pub fn int_array() -> Self {
        IrType::Array(Box::new(IrType::Int32))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Values held in reference slots: arrays and objects.
    pub fn is_reference(&self) -> bool {
        matches!(self, IrType::Array(_) | IrType::Object(_))
    }
}

impl From<&Type> for IrType {
    fn from(ty: &Type) -> Self {
        if ty.is_int_seq() {
            return IrType::int_array();
        }
        let element = match ty.name.as_str() {
            INT => IrType::Int32,
            BOOLEAN => IrType::Bool,
            VOID | IMPORTED => IrType::Void,
            name => IrType::Object(name.to_string()),
        };
        if ty.is_array { IrType::Array(Box::new(element)) } else { element }
    }
}

/// Prints the type suffix, leading dot included.
impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int32 => write!(f, ".i32"),
            IrType::Bool => write!(f, ".bool"),
            IrType::Void => write!(f, ".V"),
            IrType::Array(inner) => write!(f, ".array{inner}"),
            IrType::Object(name) => write!(f, ".{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    Temporary { index: usize, ty: IrType },
    Named { name: String, ty: IrType },
    ArrayElement { base: Box<Operand>, index: Box<Operand>, ty: IrType },
    Literal { value: i32, ty: IrType },
    This { ty: IrType },
    /// A class named as the target of a static call.
    Class { name: String },
}

impl Operand {
    pub fn temp(index: usize, ty: IrType) -> Self {
        Operand::Temporary { index, ty }
    }

    pub fn named(name: impl Into<String>, ty: IrType) -> Self {
        Operand::Named { name: name.into(), ty }
    }

    pub fn int(value: i32) -> Self {
        Operand::Literal { value, ty: IrType::Int32 }
    }

    pub fn boolean(value: bool) -> Self {
        Operand::Literal { value: i32::from(value), ty: IrType::Bool }
    }

    pub fn ty(&self) -> IrType {
        match self {
            Operand::Temporary { ty, .. }
            | Operand::Named { ty, .. }
            | Operand::ArrayElement { ty, .. }
            | Operand::Literal { ty, .. }
            | Operand::This { ty } => ty.clone(),
            Operand::Class { name } => IrType::Object(name.clone()),
        }
    }

    /// The local variable this operand lives in, if any.
    pub fn var_name(&self) -> Option<String> {
        match self {
            Operand::Temporary { index, .. } => Some(format!("tmp{index}")),
            Operand::Named { name, .. } => Some(name.clone()),
            Operand::ArrayElement { base, .. } => base.var_name(),
            Operand::This { .. } => Some("this".to_string()),
            Operand::Literal { .. } | Operand::Class { .. } => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temporary { index, ty } => write!(f, "tmp{index}{ty}"),
            Operand::Named { name, ty } => write!(f, "{name}{ty}"),
            Operand::ArrayElement { base, index, ty } => {
                let base_name = base.var_name().unwrap_or_default();
                write!(f, "{base_name}[{index}]{ty}")
            }
            Operand::Literal { value, ty } => write!(f, "{value}{ty}"),
            Operand::This { ty } => write!(f, "this{ty}"),
            Operand::Class { name } => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CallKind {
    New,
    Static,
    Virtual,
    Special,
    ArrayLength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub kind: CallKind,
    /// Receiver, static class, or for `New` the allocated class (`array` for arrays).
    pub target: Operand,
    pub method: Option<String>,
    pub args: Vec<Operand>,
    pub ret: IrType,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CallKind::New => {
                let name = match &self.target {
                    Operand::Class { name } => name.clone(),
                    other => other.to_string(),
                };
                write!(f, "new({name}")?;
            }
            CallKind::ArrayLength => write!(f, "arraylength({}", self.target)?,
            CallKind::Static | CallKind::Virtual | CallKind::Special => {
                let keyword = match self.kind {
                    CallKind::Static => "invokestatic",
                    CallKind::Virtual => "invokevirtual",
                    _ => "invokespecial",
                };
                write!(f, "{keyword}({}, \"{}\"", self.target, self.method.as_deref().unwrap_or(""))?;
            }
        }
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        write!(f, "){}", self.ret)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    Assign { dest: Operand, ty: IrType, rhs: Box<Instruction> },
    /// A bare operand, valid only as the right-hand side of an assignment.
    Value(Operand),
    BinaryOp { op: BinOp, lhs: Operand, rhs: Operand, ty: IrType },
    UnaryOp { op: UnaryOp, operand: Operand, ty: IrType },
    Return { value: Option<Operand>, ty: IrType },
    Call(Call),
    GetField { object: Operand, field: String, ty: IrType },
    PutField { object: Operand, field: String, ty: IrType, value: Operand },
    Goto(String),
    CondGoto { cond: Operand, label: String },
    Label(String),
}

impl Instruction {
    pub fn assign(dest: Operand, rhs: Instruction) -> Self {
        let ty = dest.ty();
        Instruction::Assign { dest, ty, rhs: Box::new(rhs) }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::Return { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, ty, rhs } => write!(f, "{dest} :={ty} {rhs}"),
            Instruction::Value(operand) => write!(f, "{operand}"),
            Instruction::BinaryOp { op, lhs, rhs, ty } => write!(f, "{lhs} {}{ty} {rhs}", op.symbol()),
            Instruction::UnaryOp { op, operand, ty } => write!(f, "{}{ty} {operand}", op.symbol()),
            Instruction::Return { value: Some(value), ty } => write!(f, "ret{ty} {value}"),
            Instruction::Return { value: None, ty } => write!(f, "ret{ty}"),
            Instruction::Call(call) => write!(f, "{call}"),
            Instruction::GetField { object, field, ty } => write!(f, "getfield({object}, {field}{ty}){ty}"),
            Instruction::PutField { object, field, ty, value } => {
                write!(f, "putfield({object}, {field}{ty}, {value}).V")
            }
            Instruction::Goto(label) => write!(f, "goto {label}"),
            Instruction::CondGoto { cond, label } => write!(f, "if ({cond}) goto {label}"),
            Instruction::Label(label) => write!(f, "{label}:"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub params: Vec<(String, IrType)>,
    pub return_type: IrType,
    pub instructions: Vec<Instruction>,
    pub var_table: VarTable,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".method ")?;
        if self.is_public {
            write!(f, "public ")?;
        }
        if self.is_static {
            write!(f, "static ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, (name, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}{ty}")?;
        }
        writeln!(f, "){} {{", self.return_type)?;
        for inst in &self.instructions {
            match inst {
                Instruction::Label(_) => writeln!(f, "{inst}")?,
                _ => writeln!(f, "    {inst};")?,
            }
        }
        writeln!(f, "}}")
    }
}

/// One lowered class: the whole output of a compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassUnit {
    pub name: String,
    pub super_class: Option<String>,
    /// Full dotted import paths.
    pub imports: Vec<String>,
    pub fields: Vec<(String, IrType)>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    /// Full path of an imported binding name, or the name itself if nothing imports it.
    pub fn qualified_name(&self, name: &str) -> String {
        self.imports
            .iter()
            .find(|path| path.rsplit('.').next() == Some(name))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

impl fmt::Display for ClassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {import};")?;
        }
        if !self.imports.is_empty() {
            writeln!(f)?;
        }
        let super_name = self.super_class.as_deref().unwrap_or("Object");
        writeln!(f, "{} extends {super_name} {{", self.name)?;
        writeln!(f)?;
        for (name, ty) in &self.fields {
            writeln!(f, ".field public {name}{ty};")?;
        }
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, ".construct {}().V {{", self.name)?;
        writeln!(f, "    invokespecial(this, \"<init>\").V;")?;
        writeln!(f, "}}")?;
        for method in &self.methods {
            writeln!(f)?;
            write!(f, "{method}")?;
        }
        writeln!(f)?;
        writeln!(f, "}}")
    }
}
