use super::{Call, Instruction, IrType, Operand};
use serde::Serialize;

/// One local slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDescriptor {
    pub name: String,
    pub register: usize,
    pub ty: IrType,
}

/// Register assignment for one method.
///
/// Instance methods reserve slot 0 for `this`. Parameters follow in declaration order, then
/// every assignment destination in first-write order, then anything read but never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VarTable {
    vars: Vec<VarDescriptor>,
}

impl VarTable {
    pub fn build(is_static: bool, class_name: &str, params: &[(String, IrType)], code: &[Instruction]) -> Self {
        let mut table = Self::default();
        if !is_static {
            table.insert("this", IrType::Object(class_name.to_string()));
        }
        for (name, ty) in params {
            table.insert(name, ty.clone());
        }
        for inst in code {
            if let Instruction::Assign { dest, .. } = inst {
                table.insert_operand(dest);
            }
        }
        for inst in code {
            table.collect_reads(inst);
        }
        tracing::trace!(vars = table.vars.len(), "built register table");
        table
    }

    fn insert(&mut self, name: &str, ty: IrType) {
        if self.get(name).is_some() {
            return;
        }
        let register = self.vars.len();
        self.vars.push(VarDescriptor { name: name.to_string(), register, ty });
    }

    fn insert_operand(&mut self, operand: &Operand) {
        match operand {
            Operand::ArrayElement { base, index, .. } => {
                self.insert_operand(base);
                self.insert_operand(index);
            }
            Operand::Literal { .. } | Operand::Class { .. } => {}
            other => {
                if let Some(name) = other.var_name() {
                    self.insert(&name, other.ty());
                }
            }
        }
    }

    fn collect_call(&mut self, call: &Call) {
        self.insert_operand(&call.target);
        for arg in &call.args {
            self.insert_operand(arg);
        }
    }

    fn collect_reads(&mut self, inst: &Instruction) {
        match inst {
            Instruction::Assign { dest, rhs, .. } => {
                self.insert_operand(dest);
                self.collect_reads(rhs);
            }
            Instruction::Value(operand) => self.insert_operand(operand),
            Instruction::BinaryOp { lhs, rhs, .. } => {
                self.insert_operand(lhs);
                self.insert_operand(rhs);
            }
            Instruction::UnaryOp { operand, .. } => self.insert_operand(operand),
            Instruction::Return { value, .. } => {
                if let Some(value) = value {
                    self.insert_operand(value);
                }
            }
            Instruction::Call(call) => self.collect_call(call),
            Instruction::GetField { object, .. } => self.insert_operand(object),
            Instruction::PutField { object, value, .. } => {
                self.insert_operand(object);
                self.insert_operand(value);
            }
            Instruction::CondGoto { cond, .. } => self.insert_operand(cond),
            Instruction::Goto(_) | Instruction::Label(_) => {}
        }
    }

    pub fn get(&self, name: &str) -> Option<&VarDescriptor> {
        self.vars.iter().find(|v| v.name == name)
    }

    pub fn register(&self, name: &str) -> Option<usize> {
        self.get(name).map(|v| v.register)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarDescriptor> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Highest register in use plus one.
    pub fn locals_limit(&self) -> usize {
        self.vars.iter().map(|v| v.register + 1).max().unwrap_or(0)
    }
}
