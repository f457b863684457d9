use std::fmt::Write as _;

use super::frame::Frame;
use crate::diagnostics::CompileError;
use crate::ir::{Call, CallKind, ClassUnit, Instruction, IrType, Method, Operand};
use crate::parser::ast::{BinOp, UnaryOp};

const OBJECT: &str = "java/lang/Object";
const TAB: &str = "    ";

/// Writes the assembly text of one class unit.
pub(super) struct Emitter<'a> {
    unit: &'a ClassUnit,
    out: String,
    /// Suffix for labels synthesized by relational operators.
    next_label: usize,
}

impl<'a> Emitter<'a> {
    pub(super) fn new(unit: &'a ClassUnit) -> Self {
        Self { unit, out: String::new(), next_label: 0 }
    }

    pub(super) fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(TAB);
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(super) fn emit_class(&mut self) -> Result<(), CompileError> {
        let unit = self.unit;
        let super_path = self.super_path();
        let _ = writeln!(self.out, ".class public {}", unit.name);
        let _ = writeln!(self.out, ".super {super_path}");
        self.out.push('\n');

        for (name, ty) in &unit.fields {
            let code = self.type_code(ty);
            let _ = writeln!(self.out, ".field public {name} {code}");
        }

        for method in &unit.methods {
            self.emit_method(method)?;
        }

        let _ = write!(
            self.out,
            "\n.method public <init>()V\n{TAB}aload_0\n{TAB}invokespecial {super_path}/<init>()V\n{TAB}return\n.end method\n"
        );
        Ok(())
    }

    fn super_path(&self) -> String {
        match &self.unit.super_class {
            Some(name) => self.class_path(name),
            None => OBJECT.to_string(),
        }
    }

    /// Slash-separated class name, resolving imported bindings to their full path.
    fn class_path(&self, name: &str) -> String {
        match name {
            "Object" => OBJECT.to_string(),
            "String" => "java/lang/String".to_string(),
            _ => self.unit.qualified_name(name).replace('.', "/"),
        }
    }

    fn type_code(&self, ty: &IrType) -> String {
        match ty {
            IrType::Int32 => "I".to_string(),
            IrType::Bool => "Z".to_string(),
            IrType::Void => "V".to_string(),
            IrType::Array(inner) => format!("[{}", self.type_code(inner)),
            IrType::Object(name) => format!("L{};", self.class_path(name)),
        }
    }

    fn emit_method(&mut self, method: &Method) -> Result<(), CompileError> {
        let frame = Frame::for_method(method);

        self.out.push_str("\n.method ");
        if method.is_public {
            self.out.push_str("public ");
        }
        if method.is_static {
            self.out.push_str("static ");
        }
        let params: String = method.params.iter().map(|(_, ty)| self.type_code(ty)).collect();
        let ret = self.type_code(&method.return_type);
        let _ = writeln!(self.out, "{}({params}){ret}", method.name);
        self.line(&format!(".limit stack {}", frame.stack));
        self.line(&format!(".limit locals {}", frame.locals));

        let mut body = MethodEmitter { emitter: self, method, code: String::new() };
        for inst in &method.instructions {
            body.emit(inst)?;
        }
        let code = body.code;
        self.out.push_str(&code);
        self.out.push_str(".end method\n");
        Ok(())
    }
}

/// Instruction selection inside one method.
struct MethodEmitter<'e, 'a> {
    emitter: &'e mut Emitter<'a>,
    method: &'e Method,
    code: String,
}

impl MethodEmitter<'_, '_> {
    fn op(&mut self, text: impl AsRef<str>) {
        self.code.push_str(TAB);
        self.code.push_str(text.as_ref());
        self.code.push('\n');
    }

    fn register(&self, operand: &Operand) -> Result<usize, CompileError> {
        let name = operand
            .var_name()
            .ok_or_else(|| CompileError::codegen(format!("operand '{operand}' has no register")))?;
        self.method
            .var_table
            .register(&name)
            .ok_or_else(|| CompileError::codegen(format!("no register for '{name}' in method '{}'", self.method.name)))
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let n = self.emitter.next_label;
        self.emitter.next_label += 1;
        format!("{prefix}_{n}")
    }

    fn emit(&mut self, inst: &Instruction) -> Result<(), CompileError> {
        match inst {
            Instruction::Assign { dest, rhs, .. } => {
                if let Operand::ArrayElement { base, index, .. } = dest {
                    self.load(base)?;
                    self.load(index)?;
                    self.emit_value(rhs)?;
                    self.op("iastore");
                } else {
                    self.emit_value(rhs)?;
                    self.store(dest)?;
                }
            }
            Instruction::Return { value, ty } => {
                match value {
                    Some(value) => {
                        self.load(value)?;
                        let op = match ty {
                            IrType::Int32 | IrType::Bool => "ireturn",
                            IrType::Array(_) | IrType::Object(_) => "areturn",
                            IrType::Void => {
                                return Err(CompileError::codegen(format!(
                                    "method '{}' returns a value but is declared void",
                                    self.method.name
                                )));
                            }
                        };
                        self.op(op);
                    }
                    None => self.op("return"),
                }
            }
            Instruction::Call(call) => {
                self.emit_call(call)?;
                if !call.ret.is_void() && call.kind != CallKind::New {
                    self.op("pop");
                }
            }
            Instruction::PutField { object, field, ty, value } => {
                self.load(object)?;
                self.load(value)?;
                let owner = self.owner(object)?;
                let code = self.emitter.type_code(ty);
                self.op(format!("putfield {owner}/{field} {code}"));
            }
            Instruction::Goto(label) => self.op(format!("goto {label}")),
            Instruction::CondGoto { cond, label } => {
                self.load(cond)?;
                self.op(format!("ifne {label}"));
            }
            Instruction::Label(label) => {
                let _ = writeln!(self.code, "{label}:");
            }
            other @ (Instruction::Value(_)
            | Instruction::BinaryOp { .. }
            | Instruction::UnaryOp { .. }
            | Instruction::GetField { .. }) => {
                return Err(CompileError::codegen(format!("'{other}' cannot stand alone")));
            }
        }
        Ok(())
    }

    /// Leave the value of a right-hand side on the stack.
    fn emit_value(&mut self, inst: &Instruction) -> Result<(), CompileError> {
        match inst {
            Instruction::Value(operand) => self.load(operand),
            Instruction::BinaryOp { op, lhs, rhs, .. } => {
                self.load(lhs)?;
                self.load(rhs)?;
                self.emit_binary(*op);
                Ok(())
            }
            Instruction::UnaryOp { op, operand, .. } => {
                self.load(operand)?;
                match op {
                    UnaryOp::Not => {
                        self.op("iconst_1");
                        self.op("ixor");
                    }
                    UnaryOp::Neg => self.op("ineg"),
                }
                Ok(())
            }
            Instruction::Call(call) => {
                if call.ret.is_void() {
                    return Err(CompileError::codegen(format!("void call '{call}' used as a value")));
                }
                self.emit_call(call)
            }
            Instruction::GetField { object, field, ty } => {
                self.load(object)?;
                let owner = self.owner(object)?;
                let code = self.emitter.type_code(ty);
                self.op(format!("getfield {owner}/{field} {code}"));
                Ok(())
            }
            other => Err(CompileError::codegen(format!("'{other}' has no value"))),
        }
    }

    fn emit_binary(&mut self, op: BinOp) {
        let arith = match op {
            BinOp::Add => Some("iadd"),
            BinOp::Sub => Some("isub"),
            BinOp::Mul => Some("imul"),
            BinOp::Div => Some("idiv"),
            BinOp::And => Some("iand"),
            BinOp::Or => Some("ior"),
            BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => None,
        };
        if let Some(arith) = arith {
            self.op(arith);
            return;
        }
        let branch = match op {
            BinOp::Lt => "if_icmplt",
            BinOp::Gt => "if_icmpgt",
            BinOp::LtEq => "if_icmple",
            _ => "if_icmpge",
        };
        let on_true = self.fresh_label("cmp_true");
        let end = self.fresh_label("cmp_end");
        self.op(format!("{branch} {on_true}"));
        self.op("iconst_0");
        self.op(format!("goto {end}"));
        let _ = writeln!(self.code, "{on_true}:");
        self.op("iconst_1");
        let _ = writeln!(self.code, "{end}:");
    }

    fn emit_call(&mut self, call: &Call) -> Result<(), CompileError> {
        match call.kind {
            CallKind::New => match &call.target {
                Operand::Class { name } if name == "array" => {
                    for arg in &call.args {
                        self.load(arg)?;
                    }
                    self.op("newarray int");
                }
                Operand::Class { name } => {
                    let path = self.emitter.class_path(name);
                    self.op(format!("new {path}"));
                }
                other => return Err(CompileError::codegen(format!("cannot allocate '{other}'"))),
            },
            CallKind::ArrayLength => {
                self.load(&call.target)?;
                self.op("arraylength");
            }
            CallKind::Static => {
                let Operand::Class { name } = &call.target else {
                    return Err(CompileError::codegen(format!("static call on value '{}'", call.target)));
                };
                let owner = self.emitter.class_path(name);
                for arg in &call.args {
                    self.load(arg)?;
                }
                let desc = self.descriptor(call);
                self.op(format!("invokestatic {owner}/{}{desc}", call.method.as_deref().unwrap_or("")));
            }
            CallKind::Virtual | CallKind::Special => {
                let owner = self.owner(&call.target)?;
                self.load(&call.target)?;
                for arg in &call.args {
                    self.load(arg)?;
                }
                let keyword = if call.kind == CallKind::Virtual { "invokevirtual" } else { "invokespecial" };
                let desc = self.descriptor(call);
                self.op(format!("{keyword} {owner}/{}{desc}", call.method.as_deref().unwrap_or("")));
            }
        }
        Ok(())
    }

    fn descriptor(&self, call: &Call) -> String {
        let args: String = call.args.iter().map(|a| self.emitter.type_code(&a.ty())).collect();
        format!("({args}){}", self.emitter.type_code(&call.ret))
    }

    /// Class that declares the member accessed through `object`.
    fn owner(&self, object: &Operand) -> Result<String, CompileError> {
        match object.ty() {
            IrType::Object(name) => Ok(self.emitter.class_path(&name)),
            other => Err(CompileError::codegen(format!("'{object}' of type '{other}' has no members"))),
        }
    }

    fn load(&mut self, operand: &Operand) -> Result<(), CompileError> {
        match operand {
            Operand::Literal { value, .. } => {
                self.push_int(*value);
                Ok(())
            }
            Operand::This { .. } => {
                self.op("aload_0");
                Ok(())
            }
            Operand::ArrayElement { base, index, .. } => {
                self.load(base)?;
                self.load(index)?;
                self.op("iaload");
                Ok(())
            }
            Operand::Temporary { ty, .. } | Operand::Named { ty, .. } => {
                let prefix = match ty {
                    IrType::Int32 | IrType::Bool => "i",
                    IrType::Array(_) | IrType::Object(_) => "a",
                    IrType::Void => {
                        return Err(CompileError::codegen(format!("cannot load void operand '{operand}'")));
                    }
                };
                let reg = self.register(operand)?;
                self.op(slot_op(prefix, "load", reg));
                Ok(())
            }
            Operand::Class { name } => Err(CompileError::codegen(format!("class '{name}' is not a value"))),
        }
    }

    fn store(&mut self, dest: &Operand) -> Result<(), CompileError> {
        let prefix = match dest {
            Operand::Temporary { ty, .. } | Operand::Named { ty, .. } => match ty {
                IrType::Int32 | IrType::Bool => "i",
                IrType::Array(_) | IrType::Object(_) => "a",
                IrType::Void => {
                    return Err(CompileError::codegen(format!("no store instruction for '{dest}'")));
                }
            },
            other => return Err(CompileError::codegen(format!("no store instruction for '{other}'"))),
        };
        let reg = self.register(dest)?;
        self.op(slot_op(prefix, "store", reg));
        Ok(())
    }

    fn push_int(&mut self, value: i32) {
        let text = match value {
            -1 => "iconst_m1".to_string(),
            0..=5 => format!("iconst_{value}"),
            -128..=127 => format!("bipush {value}"),
            -32768..=32767 => format!("sipush {value}"),
            _ => format!("ldc {value}"),
        };
        self.op(text);
    }
}

fn slot_op(prefix: &str, op: &str, reg: usize) -> String {
    if reg <= 3 {
        format!("{prefix}{op}_{reg}")
    } else {
        format!("{prefix}{op} {reg}")
    }
}
