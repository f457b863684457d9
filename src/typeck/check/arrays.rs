use super::{is_opaque, CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, MethodDecl, Program};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::visit::{walk_expr, walk_method, Visitor};

/// Indexing, `length` and array allocation must be applied to the right kinds of values.
pub struct ArrayChecker;

impl Checker for ArrayChecker {
    fn name(&self) -> &'static str {
        "arrays"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = ArrayVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

struct ArrayVisitor<'a> {
    cx: CheckContext<'a>,
}

impl ArrayVisitor<'_> {
    fn require_int(&mut self, operand: &Spanned<Expr>, at: &Spanned<Expr>) {
        let ty = self.cx.resolve(&operand.node);
        if is_opaque(&ty) {
            return;
        }
        if !ty.is_some_and(|t| t.is_int()) {
            self.cx.report(at.span, format!("Variable '{}' must be an Integer.", operand.node));
        }
    }
}

impl Visitor for ArrayVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        match &expr.node {
            Expr::Index { object, index } => {
                let base = self.cx.resolve(&object.node);
                if !is_opaque(&base) && !base.is_some_and(|t| t.is_indexable()) {
                    self.cx.report(
                        expr.span,
                        format!("Variable '{}' is neither an array or Sequence.", object.node),
                    );
                }
                self.require_int(index, expr);
            }
            Expr::Length(object) => {
                let base = self.cx.resolve(&object.node);
                if !is_opaque(&base) && !base.is_some_and(|t| t.is_indexable()) {
                    self.cx.report(expr.span, format!("Variable '{}' is not an array.", object.node));
                }
            }
            Expr::NewIntArray { size } => self.require_int(size, expr),
            Expr::ArrayLit { elements } => {
                for element in elements {
                    self.require_int(element, expr);
                }
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeck::check::test_util::{messages, run};

    #[test]
    fn index_requires_array_base() {
        let msgs = messages(&ArrayChecker, "class A { int f(int a) { return a[0]; } }");
        assert_eq!(msgs, vec!["Variable 'a' is neither an array or Sequence."]);
    }

    #[test]
    fn index_requires_int_index() {
        let msgs = messages(&ArrayChecker, "class A { int f(int[] a, boolean b) { return a[b]; } }");
        assert_eq!(msgs, vec!["Variable 'b' must be an Integer."]);
    }

    #[test]
    fn sequence_is_indexable() {
        let msgs = messages(&ArrayChecker, "class A { int f(int... xs) { return xs[0] + xs.length; } }");
        assert!(msgs.is_empty());
    }

    #[test]
    fn length_requires_array() {
        let msgs = messages(&ArrayChecker, "class A { int f(boolean b) { return b.length; } }");
        assert_eq!(msgs, vec!["Variable 'b' is not an array."]);
    }

    #[test]
    fn allocation_size_must_be_int() {
        let msgs = messages(&ArrayChecker, "class A { int[] f() { return new int[true]; } }");
        assert_eq!(msgs, vec!["Variable 'true' must be an Integer."]);
    }

    #[test]
    fn array_literal_elements_must_be_int() {
        let msgs = messages(&ArrayChecker, "class A { int[] f() { return [1, false, 3]; } }");
        assert_eq!(msgs, vec!["Variable 'false' must be an Integer."]);
    }

    #[test]
    fn unresolvable_base_is_suppressed() {
        let msgs = messages(&ArrayChecker, "class A { int f() { return missing[0]; } }");
        assert!(msgs.is_empty());
    }

    #[test]
    fn nested_accesses_are_all_checked() {
        let diags = run(&ArrayChecker, "class A { int f(int a, int[] b) { return b[a[0]]; } }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 1);
    }
}
