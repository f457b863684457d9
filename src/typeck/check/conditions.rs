use super::{is_opaque, CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, MethodDecl, Program, Stmt, UnaryOp};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::visit::{walk_expr, walk_method, walk_stmt, Visitor};

/// Conditions and `!` operands must be boolean.
pub struct ConditionChecker;

impl Checker for ConditionChecker {
    fn name(&self) -> &'static str {
        "conditions"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = ConditionVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

struct ConditionVisitor<'a> {
    cx: CheckContext<'a>,
}

impl ConditionVisitor<'_> {
    fn check_condition(&mut self, cond: &Spanned<Expr>, stmt: &Spanned<Stmt>) {
        let ty = self.cx.resolve(&cond.node);
        if is_opaque(&ty) {
            return;
        }
        if !ty.is_some_and(|t| t.is_boolean()) {
            self.cx.report(stmt.span, format!("Condition '{}' must be of Type Boolean.", cond.node));
        }
    }
}

impl Visitor for ConditionVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::If { cond, .. } | Stmt::While { cond, .. } => self.check_condition(cond, stmt),
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if let Expr::UnaryOp { op: UnaryOp::Not, operand } = &expr.node {
            let ty = self.cx.resolve(&operand.node);
            if !is_opaque(&ty) && !ty.as_ref().is_some_and(|t| t.is_boolean()) {
                self.cx.report(expr.span, format!("Operation '{}' only usable with Booleans.", expr.node));
            }
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeck::check::test_util::{messages, run};

    #[test]
    fn if_condition_must_be_boolean() {
        let msgs = messages(&ConditionChecker, "class A { void f(int a) { if (a) { } else { } } }");
        assert_eq!(msgs, vec!["Condition 'a' must be of Type Boolean."]);
    }

    #[test]
    fn while_condition_must_be_boolean() {
        let msgs = messages(&ConditionChecker, "class A { void f(int[] a) { while (a) { } } }");
        assert_eq!(msgs, vec!["Condition 'a' must be of Type Boolean."]);
    }

    #[test]
    fn relational_condition_is_fine() {
        let msgs = messages(&ConditionChecker, "class A { void f(int a) { while (a < 3 && !(a > 5)) { } } }");
        assert!(msgs.is_empty());
    }

    #[test]
    fn not_requires_boolean() {
        let msgs = messages(&ConditionChecker, "class A { boolean f(int a) { return !a; } }");
        assert_eq!(msgs, vec!["Operation '!a' only usable with Booleans."]);
    }

    #[test]
    fn negation_is_not_a_boolean_context() {
        let msgs = messages(&ConditionChecker, "class A { int f(boolean a) { return -a; } }");
        assert!(msgs.is_empty());
    }

    #[test]
    fn imported_call_condition_is_suppressed() {
        let msgs = messages(&ConditionChecker, "import Io; class A { void f() { if (Io.ready()) { } else { } } }");
        assert!(msgs.is_empty());
    }

    #[test]
    fn reports_at_statement_position() {
        let diags = run(&ConditionChecker, "class A {\n void f(int a) {\n  while (a) { }\n }\n}");
        assert_eq!((diags[0].line, diags[0].column), (3, 3));
    }
}
