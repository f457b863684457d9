use super::{CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, MethodDecl, Program};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::visit::{walk_expr, walk_method, Visitor};

/// Every invoked method must plausibly exist.
///
/// Calls on imported types are trusted. Calls on the class itself are trusted when the
/// class extends something, since the method may be inherited.
pub struct MethodCallChecker;

impl Checker for MethodCallChecker {
    fn name(&self) -> &'static str {
        "method-calls"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = MethodCallVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

struct MethodCallVisitor<'a> {
    cx: CheckContext<'a>,
}

impl MethodCallVisitor<'_> {
    fn check_call(&mut self, call: &Spanned<Expr>, object: &Spanned<Expr>, method: &str) {
        let desc = self.cx.desc();
        let target = self.cx.target_type(&object.node);

        if target.as_ref().is_some_and(|t| desc.is_import(&t.name) || t.is_imported()) {
            return;
        }

        let on_self = matches!(object.node, Expr::This)
            || target.as_ref().is_some_and(|t| t.name == desc.class_name && !t.is_array);
        if on_self {
            if desc.has_super() || desc.method(method).is_some() {
                return;
            }
            self.cx.report(
                call.span,
                format!("Method '{method}' is not declared in class '{}'.", desc.class_name),
            );
            return;
        }

        let described = match &target {
            Some(ty) => format!("'{}' of type '{ty}'", object.node),
            None => format!("'{}'", object.node),
        };
        self.cx.report(call.span, format!("Cannot call method '{method}' on {described}."));
    }
}

impl Visitor for MethodCallVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if let Expr::MethodCall { object, method, .. } = &expr.node {
            self.check_call(expr, object, &method.node);
        }
        walk_expr(self, expr);
    }
}
