use super::{ExprResult, LowerContext};
use crate::diagnostics::CompileError;
use crate::ir::{Call, CallKind, Instruction, IrType, Operand};
use crate::parser::ast::{BinOp, Expr, UnaryOp};
use crate::span::Spanned;
use crate::typeck::types::Type;

/// Whether a call's value is consumed by the enclosing expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CallUse {
    Value,
    Discard,
}

impl LowerContext<'_> {
    /// Lower an expression in load form. `hint` is the type the consuming context expects;
    /// it only decides the result type of calls the class does not declare.
    pub(super) fn lower_expr(&mut self, expr: &Expr, hint: Option<IrType>) -> Result<ExprResult, CompileError> {
        match expr {
            Expr::IntLit(value) => Ok(ExprResult::operand(Operand::int(*value))),
            Expr::BoolLit(value) => Ok(ExprResult::operand(Operand::boolean(*value))),
            Expr::Paren(inner) => self.lower_expr(&inner.node, hint),
            Expr::This => Ok(ExprResult::operand(Operand::This { ty: self.own_type() })),
            Expr::Ident(name) => self.lower_ident(name),
            Expr::BinOp { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs),
            Expr::UnaryOp { op, operand } => self.lower_unary(*op, operand),
            Expr::Index { object, index } => {
                let mut result = self.lower_element(object, index)?;
                let dest = self.fresh_temp(IrType::Int32);
                result.computation.push(Instruction::assign(dest.clone(), Instruction::Value(result.code)));
                result.code = dest;
                Ok(result)
            }
            Expr::Length(object) => {
                let array = self.lower_expr(&object.node, Some(IrType::int_array()))?;
                let mut computation = array.computation;
                let dest = self.fresh_temp(IrType::Int32);
                computation.push(Instruction::assign(
                    dest.clone(),
                    Instruction::Call(Call {
                        kind: CallKind::ArrayLength,
                        target: array.code,
                        method: None,
                        args: Vec::new(),
                        ret: IrType::Int32,
                    }),
                ));
                Ok(ExprResult { code: dest, computation })
            }
            Expr::NewIntArray { size } => {
                let size = self.lower_expr(&size.node, Some(IrType::Int32))?;
                let mut computation = size.computation;
                let dest = self.fresh_temp(IrType::int_array());
                computation.push(Instruction::assign(dest.clone(), new_int_array(size.code)));
                Ok(ExprResult { code: dest, computation })
            }
            Expr::ArrayLit { elements } => self.lower_array_literal(elements),
            Expr::NewObject { class } => {
                let ty = IrType::Object(class.node.clone());
                let dest = self.fresh_temp(ty.clone());
                let computation = vec![
                    Instruction::assign(
                        dest.clone(),
                        Instruction::Call(Call {
                            kind: CallKind::New,
                            target: Operand::Class { name: class.node.clone() },
                            method: None,
                            args: Vec::new(),
                            ret: ty,
                        }),
                    ),
                    Instruction::Call(Call {
                        kind: CallKind::Special,
                        target: dest.clone(),
                        method: Some("<init>".to_string()),
                        args: Vec::new(),
                        ret: IrType::Void,
                    }),
                ];
                Ok(ExprResult { code: dest, computation })
            }
            Expr::MethodCall { object, method, args } => {
                let (mut computation, call) = self.lower_call(object, &method.node, args, hint, CallUse::Value)?;
                let dest = self.fresh_temp(call.ret.clone());
                computation.push(Instruction::assign(dest.clone(), Instruction::Call(call)));
                Ok(ExprResult { code: dest, computation })
            }
        }
    }

    fn lower_ident(&mut self, name: &str) -> Result<ExprResult, CompileError> {
        if let Some(ty) = self.local_type(name) {
            return Ok(ExprResult::operand(Operand::named(name, IrType::from(&ty))));
        }
        if self.resolver.is_field(name) {
            let ty = self
                .desc
                .field(name)
                .map(|f| IrType::from(&f.ty))
                .ok_or_else(|| CompileError::lowering(format!("unknown field '{name}'")))?;
            let dest = self.fresh_temp(ty.clone());
            let get = Instruction::GetField {
                object: Operand::This { ty: self.own_type() },
                field: name.to_string(),
                ty,
            };
            return Ok(ExprResult { code: dest.clone(), computation: vec![Instruction::assign(dest, get)] });
        }
        Err(CompileError::lowering(format!("'{name}' is not a variable")))
    }

    /// Type of a local or parameter binding, locals first.
    pub(super) fn local_type(&self, name: &str) -> Option<Type> {
        let method = self.resolver.method()?;
        method.local(name).or_else(|| method.param(name)).map(|s| s.ty.clone())
    }

    fn lower_binary(&mut self, op: BinOp, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>) -> Result<ExprResult, CompileError> {
        let (operand_ty, result_ty) = if op.is_logical() {
            (IrType::Bool, IrType::Bool)
        } else if op.is_arithmetic() {
            (IrType::Int32, IrType::Int32)
        } else {
            (IrType::Int32, IrType::Bool)
        };
        let left = self.lower_expr(&lhs.node, Some(operand_ty.clone()))?;
        let right = self.lower_expr(&rhs.node, Some(operand_ty))?;

        let mut computation = left.computation;
        computation.extend(right.computation);
        let dest = self.fresh_temp(result_ty.clone());
        computation.push(Instruction::assign(
            dest.clone(),
            Instruction::BinaryOp { op, lhs: left.code, rhs: right.code, ty: result_ty },
        ));
        Ok(ExprResult { code: dest, computation })
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Spanned<Expr>) -> Result<ExprResult, CompileError> {
        let ty = match op {
            UnaryOp::Not => IrType::Bool,
            UnaryOp::Neg => IrType::Int32,
        };
        let inner = self.lower_expr(&operand.node, Some(ty.clone()))?;
        let mut computation = inner.computation;
        let dest = self.fresh_temp(ty.clone());
        computation.push(Instruction::assign(
            dest.clone(),
            Instruction::UnaryOp { op, operand: inner.code, ty },
        ));
        Ok(ExprResult { code: dest, computation })
    }

    /// Lower `object[index]` to an element operand without loading it. Used directly as an
    /// assignment target, or followed by a load into a temporary.
    pub(super) fn lower_element(&mut self, object: &Spanned<Expr>, index: &Spanned<Expr>) -> Result<ExprResult, CompileError> {
        let base = self.lower_expr(&object.node, Some(IrType::int_array()))?;
        let index = self.lower_expr(&index.node, Some(IrType::Int32))?;
        if base.code.var_name().is_none() || matches!(base.code, Operand::This { .. }) {
            return Err(CompileError::lowering(format!("cannot index into '{}'", object.node)));
        }
        let mut computation = base.computation;
        computation.extend(index.computation);
        let code = Operand::ArrayElement {
            base: Box::new(base.code),
            index: Box::new(index.code),
            ty: IrType::Int32,
        };
        Ok(ExprResult { code, computation })
    }

    fn lower_array_literal(&mut self, elements: &[Spanned<Expr>]) -> Result<ExprResult, CompileError> {
        let mut computation = Vec::new();
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let lowered = self.lower_expr(&element.node, Some(IrType::Int32))?;
            computation.extend(lowered.computation);
            values.push(lowered.code);
        }
        let array = self.fresh_temp(IrType::int_array());
        computation.extend(fill_int_array(&array, values)?);
        Ok(ExprResult { code: array, computation })
    }

    /// Lower a call up to, but not including, binding its result.
    pub(super) fn lower_call(
        &mut self,
        object: &Spanned<Expr>,
        method: &str,
        args: &[Spanned<Expr>],
        hint: Option<IrType>,
        usage: CallUse,
    ) -> Result<(Vec<Instruction>, Call), CompileError> {
        let mut computation = Vec::new();

        let (kind, target) = match &object.node {
            Expr::Ident(name) if self.is_class_reference(name) => (CallKind::Static, Operand::Class { name: name.clone() }),
            other => {
                // a receiver produced by an undeclared call is an untyped object
                let lowered = self.lower_expr(other, Some(IrType::Object("Object".to_string())))?;
                computation.extend(lowered.computation);
                (CallKind::Virtual, lowered.code)
            }
        };

        let on_import = match &target {
            Operand::Class { name } => name != &self.desc.class_name,
            other => matches!(other.ty(), IrType::Object(ref n) if self.desc.is_import(n)),
        };
        let sig = if on_import { None } else { self.desc.method(method) };

        let ret = match sig {
            Some(sig) => {
                let ret = IrType::from(&sig.return_type);
                if ret.is_void() && usage == CallUse::Value {
                    return Err(CompileError::lowering(format!(
                        "method '{method}' returns void and its value cannot be used"
                    )));
                }
                ret
            }
            None => match usage {
                CallUse::Discard => IrType::Void,
                CallUse::Value => hint.filter(|t| !t.is_void()).unwrap_or(IrType::Int32),
            },
        };

        let params: Vec<IrType> = sig
            .map(|s| s.params.iter().map(|p| IrType::from(&p.ty)).collect())
            .unwrap_or_default();
        let variadic = sig.and_then(|s| s.variadic_index());

        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let arg_hint = match variadic {
                Some(at) if i >= at => Some(IrType::Int32),
                _ => params.get(i).cloned(),
            };
            let lowered = self.lower_expr(&arg.node, arg_hint)?;
            computation.extend(lowered.computation);
            values.push(lowered.code);
        }

        if let Some(at) = variadic {
            if values.len() >= at {
                let rest = values.split_off(at);
                let packed = self.fresh_temp(IrType::int_array());
                computation.extend(fill_int_array(&packed, rest)?);
                values.push(packed);
            }
        }

        let call = Call { kind, target, method: Some(method.to_string()), args: values, ret };
        Ok((computation, call))
    }

    /// A bare name that is not a variable in scope names a class: an import, the class
    /// itself, or something unknown that the backend will reference by name.
    fn is_class_reference(&self, name: &str) -> bool {
        self.local_type(name).is_none() && !self.resolver.is_field(name)
    }
}

fn new_int_array(size: Operand) -> Instruction {
    Instruction::Call(Call {
        kind: CallKind::New,
        target: Operand::Class { name: "array".to_string() },
        method: None,
        args: vec![size],
        ret: IrType::int_array(),
    })
}

/// Allocate `array` with one slot per value and store each value in order.
fn fill_int_array(array: &Operand, values: Vec<Operand>) -> Result<Vec<Instruction>, CompileError> {
    let len = i32::try_from(values.len())
        .map_err(|_| CompileError::lowering("array literal too large".to_string()))?;
    let mut code = vec![Instruction::assign(array.clone(), new_int_array(Operand::int(len)))];
    for (i, value) in (0..len).zip(values) {
        let slot = Operand::ArrayElement {
            base: Box::new(array.clone()),
            index: Box::new(Operand::int(i)),
            ty: IrType::Int32,
        };
        code.push(Instruction::assign(slot, Instruction::Value(value)));
    }
    Ok(code)
}
