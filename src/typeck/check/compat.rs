use super::{is_opaque, CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, MethodDecl, Program, Stmt};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::typeck::types::Type;
use crate::visit::{walk_expr, walk_method, walk_stmt, Visitor};

/// Operand, assignment and return type compatibility.
///
/// Assignments follow an open-world policy: any two imported types are compatible, the
/// class and its declared superclass are compatible in either direction, and a value of
/// unknown call type is assignable anywhere.
pub struct CompatChecker;

impl Checker for CompatChecker {
    fn name(&self) -> &'static str {
        "compat"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = CompatVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

struct CompatVisitor<'a> {
    cx: CheckContext<'a>,
}

impl CompatVisitor<'_> {
    fn assignable(&self, target: &Type, value: &Type) -> bool {
        if target == value {
            return true;
        }
        let desc = self.cx.desc();
        if desc.is_import(&target.name) && desc.is_import(&value.name) {
            return true;
        }
        if !target.is_array && !value.is_array {
            let own = &desc.class_name;
            let upcast = &value.name == own && desc.is_super(&target.name);
            let downcast = &target.name == own && desc.is_super(&value.name);
            if upcast || downcast {
                return true;
            }
        }
        false
    }

    fn check_binary(&mut self, expr: &Spanned<Expr>, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>) {
        let lhs_ty = self.cx.resolve(&lhs.node);
        let rhs_ty = self.cx.resolve(&rhs.node);
        if is_opaque(&lhs_ty) || is_opaque(&rhs_ty) {
            return;
        }
        let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) else { return };
        if lhs_ty != rhs_ty {
            self.cx.report(expr.span, format!("Type '{lhs_ty}' not assignable to '{rhs_ty}'."));
        }
    }

    fn check_assign(&mut self, stmt: &Spanned<Stmt>, target: &Spanned<Expr>, value: &Spanned<Expr>) {
        let target_ty = self.cx.resolve(&target.node);
        let value_ty = self.cx.resolve(&value.node);
        if is_opaque(&target_ty) || is_opaque(&value_ty) {
            return;
        }
        let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty) else { return };
        if !self.assignable(&target_ty, &value_ty) {
            self.cx.report(stmt.span, format!("Cannot assign '{value_ty}' to '{target_ty}'."));
        }
    }

    fn check_return(&mut self, stmt: &Spanned<Stmt>, value: Option<&Spanned<Expr>>) {
        let Some(method) = self.cx.method() else { return };
        let declared = &method.return_type;
        match value {
            None => {
                if !declared.is_void() {
                    self.cx.report(stmt.span, format!("Function needs '{declared}' but no value was returned."));
                }
            }
            Some(value) => {
                let found = self.cx.resolve(&value.node);
                if is_opaque(&found) {
                    return;
                }
                let Some(found) = found else { return };
                if &found != declared {
                    self.cx.report(stmt.span, format!("Function needs '{declared}' but '{found}' was found."));
                }
            }
        }
    }
}

impl Visitor for CompatVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::Assign { target, value } => self.check_assign(stmt, target, value),
            Stmt::Return(value) => self.check_return(stmt, value.as_ref()),
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if let Expr::BinOp { lhs, rhs, .. } = &expr.node {
            self.check_binary(expr, lhs, rhs);
        }
        walk_expr(self, expr);
    }
}
