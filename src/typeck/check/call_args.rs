use super::{is_opaque, CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, MethodDecl, Program};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::typeck::types::Type;
use crate::visit::{walk_expr, walk_method, Visitor};

/// Argument count and types of calls to methods the class declares.
///
/// A trailing `int...` parameter absorbs zero or more trailing `int` arguments. Calls to
/// imported types or to methods the class does not declare are not checked.
pub struct CallArgsChecker;

impl Checker for CallArgsChecker {
    fn name(&self) -> &'static str {
        "call-args"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = CallArgsVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

struct CallArgsVisitor<'a> {
    cx: CheckContext<'a>,
}

impl CallArgsVisitor<'_> {
    fn check_arg(&mut self, call: &Spanned<Expr>, arg: &Spanned<Expr>, expected: &Type) {
        let given = self.cx.resolve(&arg.node);
        if is_opaque(&given) {
            return;
        }
        let Some(given) = given else { return };
        if &given != expected {
            self.cx.report(
                call.span,
                format!("Type of parameter '{given}' not compatible with expected '{expected}'."),
            );
        }
    }

    fn check_call(&mut self, call: &Spanned<Expr>, object: &Spanned<Expr>, method: &str, args: &[Spanned<Expr>]) {
        let desc = self.cx.desc();
        let target = self.cx.target_type(&object.node);
        if target.as_ref().is_some_and(|t| desc.is_import(&t.name) || t.is_imported()) {
            return;
        }
        let Some(sig) = desc.method(method) else { return };

        match sig.variadic_index() {
            None => {
                if args.len() != sig.params.len() {
                    self.cx.report(
                        call.span,
                        format!(
                            "Number of parameters to function '{method}' incorrect. Expected '{}' got '{}'.",
                            sig.params.len(),
                            args.len()
                        ),
                    );
                }
                for (arg, param) in args.iter().zip(&sig.params) {
                    self.check_arg(call, arg, &param.ty);
                }
            }
            Some(seq_at) => {
                if args.len() < seq_at {
                    self.cx.report(
                        call.span,
                        format!(
                            "Number of parameters to function '{method}' incorrect. Expected at least '{seq_at}' got '{}'.",
                            args.len()
                        ),
                    );
                }
                for (arg, param) in args.iter().zip(&sig.params[..seq_at]) {
                    self.check_arg(call, arg, &param.ty);
                }
                let int = Type::int();
                for arg in args.iter().skip(seq_at) {
                    self.check_arg(call, arg, &int);
                }
            }
        }
    }
}

impl Visitor for CallArgsVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        if let Expr::MethodCall { object, method, args } = &expr.node {
            self.check_call(expr, object, &method.node, args);
        }
        walk_expr(self, expr);
    }
}
