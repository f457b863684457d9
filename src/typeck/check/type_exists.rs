use super::{CheckContext, Checker};
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{MethodDecl, Program, VarDecl};
use crate::span::Spanned;
use crate::typeck::env::ClassDescriptor;
use crate::typeck::types::{Symbol, Type, BOOLEAN, INT};
use crate::visit::{walk_method, Visitor};

/// Declared variable types must name something this compilation unit knows about.
pub struct TypeExistsChecker;

impl Checker for TypeExistsChecker {
    fn name(&self) -> &'static str {
        "type-exists"
    }

    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
        let mut visitor = TypeExistsVisitor { cx: CheckContext::new(desc) };
        visitor.visit_program(program);
        visitor.cx.finish()
    }
}

/// `int`, `int...`, `int[]`, `boolean`, the class itself and imports, the last two
/// optionally as arrays.
pub fn is_declared_type(ty: &Type, desc: &ClassDescriptor) -> bool {
    if ty.is_int_seq() {
        return !ty.is_array;
    }
    match ty.name.as_str() {
        INT => true,
        BOOLEAN => !ty.is_array,
        name => name == desc.class_name || desc.is_import(name),
    }
}

struct TypeExistsVisitor<'a> {
    cx: CheckContext<'a>,
}

impl Visitor for TypeExistsVisitor<'_> {
    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        self.cx.enter_method(&method.node.name.node);
        walk_method(self, method);
        self.cx.leave_method();
    }

    fn visit_var_decl(&mut self, decl: &Spanned<VarDecl>) {
        let desc = self.cx.desc();
        let name = decl.node.name.node.as_str();
        let named = |s: &&Symbol| s.name == name;

        // Locals, then parameters, then fields: the first binding with a known type wins.
        let mut bindings: Vec<&Symbol> = Vec::new();
        if let Some(method) = self.cx.method() {
            bindings.extend(method.locals.iter().filter(named));
            bindings.extend(method.params.iter().filter(named));
        }
        bindings.extend(desc.fields.iter().filter(named));

        if bindings.iter().any(|s| is_declared_type(&s.ty, desc)) {
            return;
        }
        self.cx.report(
            decl.span,
            format!("Type '{}' of variable '{name}' does not exist.", decl.node.ty.node),
        );
    }
}
