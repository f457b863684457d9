use super::expr::CallUse;
use super::LowerContext;
use crate::diagnostics::CompileError;
use crate::ir::{Instruction, IrType, Operand};
use crate::parser::ast::{Expr, Stmt};
use crate::span::Spanned;

impl LowerContext<'_> {
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.lower_stmt(&s.node)?;
                }
                Ok(())
            }
            Stmt::If { cond, then_branch, else_branch } => self.lower_if(cond, then_branch, else_branch),
            Stmt::While { cond, body } => self.lower_while(cond, body),
            Stmt::Expr(expr) => self.lower_expr_stmt(&expr.node),
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::Return(value) => self.lower_return(value.as_ref()),
        }
    }

    fn lower_expr_stmt(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::MethodCall { object, method, args } => {
                let (computation, call) = self.lower_call(object, &method.node, args, None, CallUse::Discard)?;
                self.emit_all(computation);
                self.emit(Instruction::Call(call));
            }
            Expr::Paren(inner) => self.lower_expr_stmt(&inner.node)?,
            other => {
                let lowered = self.lower_expr(other, None)?;
                self.emit_all(lowered.computation);
            }
        }
        Ok(())
    }

    fn lower_assign(&mut self, target: &Spanned<Expr>, value: &Spanned<Expr>) -> Result<(), CompileError> {
        match &target.node {
            Expr::Ident(name) => {
                if let Some(ty) = self.local_type(name) {
                    let ty = IrType::from(&ty);
                    let value = self.lower_expr(&value.node, Some(ty.clone()))?;
                    self.emit_all(value.computation);
                    self.emit(Instruction::assign(Operand::named(name, ty), Instruction::Value(value.code)));
                    return Ok(());
                }
                let field_ty = self
                    .desc
                    .field(name)
                    .filter(|_| self.resolver.is_field(name))
                    .map(|f| IrType::from(&f.ty));
                let Some(ty) = field_ty else {
                    return Err(CompileError::lowering(format!("cannot assign to undeclared '{name}'")));
                };
                let value = self.lower_expr(&value.node, Some(ty.clone()))?;
                self.emit_all(value.computation);
                self.emit(Instruction::PutField {
                    object: Operand::This { ty: self.own_type() },
                    field: name.clone(),
                    ty,
                    value: value.code,
                });
                Ok(())
            }
            Expr::Index { object, index } => {
                let element = self.lower_element(object, index)?;
                self.emit_all(element.computation);
                let value = self.lower_expr(&value.node, Some(IrType::Int32))?;
                self.emit_all(value.computation);
                self.emit(Instruction::assign(element.code, Instruction::Value(value.code)));
                Ok(())
            }
            other => Err(CompileError::lowering(format!("cannot assign to '{other}'"))),
        }
    }

    fn lower_return(&mut self, value: Option<&Spanned<Expr>>) -> Result<(), CompileError> {
        match value {
            Some(expr) => {
                let ty = self.return_type.clone();
                let lowered = self.lower_expr(&expr.node, Some(ty.clone()))?;
                self.emit_all(lowered.computation);
                self.emit(Instruction::Return { value: Some(lowered.code), ty });
            }
            None => self.emit(Instruction::Return { value: None, ty: IrType::Void }),
        }
        Ok(())
    }

    /// The else branch falls through from the conditional jump; the then branch sits
    /// behind its label.
    fn lower_if(
        &mut self,
        cond: &Spanned<Expr>,
        then_branch: &Spanned<Stmt>,
        else_branch: &Spanned<Stmt>,
    ) -> Result<(), CompileError> {
        let n = self.temps.next();
        let then_label = format!("if{n}");
        let end_label = format!("endif{n}");

        let cond = self.lower_expr(&cond.node, Some(IrType::Bool))?;
        self.emit_all(cond.computation);
        self.emit(Instruction::CondGoto { cond: cond.code, label: then_label.clone() });
        self.lower_stmt(&else_branch.node)?;
        self.emit(Instruction::Goto(end_label.clone()));
        self.emit(Instruction::Label(then_label));
        self.lower_stmt(&then_branch.node)?;
        self.emit(Instruction::Label(end_label));
        Ok(())
    }

    fn lower_while(&mut self, cond: &Spanned<Expr>, body: &Spanned<Stmt>) -> Result<(), CompileError> {
        let n = self.temps.next();
        let cond_label = format!("whileCond{n}");
        let loop_label = format!("whileLoop{n}");
        let end_label = format!("whileEnd{n}");

        self.emit(Instruction::Label(cond_label.clone()));
        let cond = self.lower_expr(&cond.node, Some(IrType::Bool))?;
        self.emit_all(cond.computation);
        self.emit(Instruction::CondGoto { cond: cond.code, label: loop_label.clone() });
        self.emit(Instruction::Goto(end_label.clone()));
        self.emit(Instruction::Label(loop_label));
        self.lower_stmt(&body.node)?;
        self.emit(Instruction::Goto(cond_label));
        self.emit(Instruction::Label(end_label));
        Ok(())
    }
}
