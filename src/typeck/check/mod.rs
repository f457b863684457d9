//! Semantic rule pipeline.
//!
//! Every checker walks the whole tree once and only appends diagnostics. Checkers are
//! independent of each other, so they all run even when earlier ones reported errors.

mod arrays;
mod call_args;
mod compat;
mod conditions;
mod method_calls;
mod type_exists;

pub use arrays::ArrayChecker;
pub use call_args::CallArgsChecker;
pub use compat::CompatChecker;
pub use conditions::ConditionChecker;
pub use method_calls::MethodCallChecker;
pub use type_exists::TypeExistsChecker;

use super::env::{ClassDescriptor, MethodSig};
use super::infer::TypeResolver;
use super::types::Type;
use crate::diagnostics::Diagnostic;
use crate::parser::ast::{Expr, Program};
use crate::span::Span;

pub trait Checker {
    fn name(&self) -> &'static str;
    fn check(&self, program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic>;
}

pub fn default_checkers() -> Vec<Box<dyn Checker>> {
    vec![
        Box::new(ArrayChecker),
        Box::new(ConditionChecker),
        Box::new(CompatChecker),
        Box::new(MethodCallChecker),
        Box::new(CallArgsChecker),
        Box::new(TypeExistsChecker),
    ]
}

/// Run every checker over the program and collect their findings in checker order.
pub fn run_checkers(program: &Program, desc: &ClassDescriptor, checkers: &[Box<dyn Checker>]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for checker in checkers {
        let found = checker.check(program, desc);
        tracing::debug!(checker = checker.name(), count = found.len(), "checker finished");
        diagnostics.extend(found);
    }
    diagnostics
}

/// State shared by every checker visitor: the descriptor, the enclosing method and the
/// diagnostics found so far.
pub(crate) struct CheckContext<'a> {
    desc: &'a ClassDescriptor,
    method: Option<&'a MethodSig>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn new(desc: &'a ClassDescriptor) -> Self {
        Self { desc, method: None, diagnostics: Vec::new() }
    }

    pub(crate) fn desc(&self) -> &'a ClassDescriptor {
        self.desc
    }

    pub(crate) fn method(&self) -> Option<&'a MethodSig> {
        self.method
    }

    pub(crate) fn enter_method(&mut self, name: &str) {
        self.method = self.desc.method(name);
    }

    pub(crate) fn leave_method(&mut self) {
        self.method = None;
    }

    pub(crate) fn resolver(&self) -> TypeResolver<'a> {
        TypeResolver::new(self.desc, self.method)
    }

    pub(crate) fn resolve(&self, expr: &Expr) -> Option<Type> {
        self.resolver().resolve(expr)
    }

    /// Resolved type of a call target. A bare name nothing binds is taken to be a
    /// class name, which is how static calls on imports are written.
    pub(crate) fn target_type(&self, target: &Expr) -> Option<Type> {
        match self.resolve(target) {
            Some(ty) => Some(ty),
            None => match target {
                Expr::Ident(name) => Some(Type::named(name.clone())),
                _ => None,
            },
        }
    }

    pub(crate) fn report(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    pub(crate) fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A type the checks cannot judge: unresolvable or only known through an import.
pub(crate) fn is_opaque(ty: &Option<Type>) -> bool {
    match ty {
        None => true,
        Some(t) => t.is_imported(),
    }
}
