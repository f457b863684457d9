use super::env::{ClassDescriptor, MethodSig};
use super::types::Type;
use crate::parser::ast::Expr;

/// Maps expressions to types against one class descriptor and, optionally, one enclosing method.
///
/// Resolution never fails loudly: `None` means "cannot judge", and callers suppress any
/// further check on that node.
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    desc: &'a ClassDescriptor,
    method: Option<&'a MethodSig>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(desc: &'a ClassDescriptor, method: Option<&'a MethodSig>) -> Self {
        Self { desc, method }
    }

    pub fn for_method(desc: &'a ClassDescriptor, method_name: &str) -> Self {
        Self { desc, method: desc.method(method_name) }
    }

    pub fn descriptor(&self) -> &'a ClassDescriptor {
        self.desc
    }

    pub fn method(&self) -> Option<&'a MethodSig> {
        self.method
    }

    pub fn resolve(&self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::BinOp { op, .. } => {
                if op.is_arithmetic() {
                    Some(Type::int())
                } else {
                    Some(Type::boolean())
                }
            }
            Expr::UnaryOp { operand, .. } => self.resolve(&operand.node),
            Expr::Paren(inner) => self.resolve(&inner.node),
            Expr::Index { .. } | Expr::Length(_) => Some(Type::int()),
            Expr::NewIntArray { .. } | Expr::ArrayLit { .. } => Some(Type::int_array()),
            Expr::NewObject { class } => Some(Type::named(class.node.clone())),
            Expr::IntLit(_) => Some(Type::int()),
            Expr::BoolLit(_) => Some(Type::boolean()),
            Expr::Ident(name) => self.lookup_var(name),
            Expr::This => Some(self.desc.own_type()),
            Expr::MethodCall { method, .. } => Some(self.call_return_type(&method.node)),
        }
    }

    /// Declared return type of a method of this class, or the import sentinel when the
    /// class does not declare it.
    pub fn call_return_type(&self, method_name: &str) -> Type {
        match self.desc.method(method_name) {
            Some(sig) => sig.return_type.clone(),
            None => Type::imported(),
        }
    }

    /// Locals, then parameters, then fields, then imports.
    pub fn lookup_var(&self, name: &str) -> Option<Type> {
        if let Some(method) = self.method {
            if let Some(sym) = method.local(name).or_else(|| method.param(name)) {
                return Some(sym.ty.clone());
            }
        }
        if let Some(sym) = self.desc.field(name) {
            return Some(sym.ty.clone());
        }
        if self.desc.is_import(name) {
            return Some(Type::named(name));
        }
        None
    }

    /// True when `name` binds to a field and is not shadowed by a local or parameter.
    pub fn is_field(&self, name: &str) -> bool {
        let shadowed = self
            .method
            .is_some_and(|m| m.local(name).is_some() || m.param(name).is_some());
        !shadowed && self.desc.field(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::Parser;
    use crate::parser::ast::{Program, Stmt};

    const SRC: &str = "import Io;\nclass A extends B {\n int f; boolean g; int shadow;\n public int m(boolean shadow, int[] arr) { A a; int x; x = 1; return x; }\n public Io io() { return 0; }\n}";

    fn program(src: &str) -> Program {
        let tokens = lex(src).unwrap();
        Parser::new(&tokens, src).parse_program().unwrap()
    }

    fn expr(src: &str) -> Expr {
        let wrapped = format!("class T {{ int t() {{ return {src}; }} }}");
        let prog = program(&wrapped);
        match &prog.class.node.methods[0].node.body[0].node {
            Stmt::Return(Some(e)) => e.node.clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    fn desc() -> ClassDescriptor {
        ClassDescriptor::build(&program(SRC))
    }

    #[test]
    fn test_operators() {
        let d = desc();
        let r = TypeResolver::for_method(&d, "m");
        assert_eq!(r.resolve(&expr("1 + 2")), Some(Type::int()));
        assert_eq!(r.resolve(&expr("1 < 2")), Some(Type::boolean()));
        assert_eq!(r.resolve(&expr("true && false")), Some(Type::boolean()));
        assert_eq!(r.resolve(&expr("!shadow")), Some(Type::boolean()));
        assert_eq!(r.resolve(&expr("-x")), Some(Type::int()));
    }

    #[test]
    fn test_array_forms() {
        let d = desc();
        let r = TypeResolver::for_method(&d, "m");
        assert_eq!(r.resolve(&expr("arr[0]")), Some(Type::int()));
        assert_eq!(r.resolve(&expr("arr.length")), Some(Type::int()));
        assert_eq!(r.resolve(&expr("new int[3]")), Some(Type::int_array()));
        assert_eq!(r.resolve(&expr("[1, 2]")), Some(Type::int_array()));
    }

    #[test]
    fn test_variable_lookup_order() {
        let d = desc();
        let r = TypeResolver::for_method(&d, "m");
        assert_eq!(r.lookup_var("a"), Some(Type::named("A")));
        // parameter shadows field
        assert_eq!(r.lookup_var("shadow"), Some(Type::boolean()));
        assert_eq!(r.lookup_var("g"), Some(Type::boolean()));
        assert_eq!(r.lookup_var("Io"), Some(Type::named("Io")));
        assert_eq!(r.lookup_var("nope"), None);
    }

    #[test]
    fn test_field_lookup_outside_method() {
        let d = desc();
        let r = TypeResolver::new(&d, None);
        assert_eq!(r.lookup_var("shadow"), Some(Type::int()));
        assert!(r.is_field("shadow"));
        let in_m = TypeResolver::for_method(&d, "m");
        assert!(!in_m.is_field("shadow"));
        assert!(in_m.is_field("f"));
    }

    #[test]
    fn test_this_new_and_calls() {
        let d = desc();
        let r = TypeResolver::for_method(&d, "m");
        assert_eq!(r.resolve(&expr("this")), Some(Type::named("A")));
        assert_eq!(r.resolve(&expr("new Io()")), Some(Type::named("Io")));
        assert_eq!(r.resolve(&expr("this.m(true, arr)")), Some(Type::int()));
        assert_eq!(r.resolve(&expr("this.io()")), Some(Type::named("Io")));
        assert_eq!(r.resolve(&expr("Io.print(1)")), Some(Type::imported()));
    }

    #[test]
    fn test_paren_passes_through() {
        let d = desc();
        let r = TypeResolver::for_method(&d, "m");
        assert_eq!(r.resolve(&expr("(x)")), Some(Type::int()));
        assert_eq!(r.resolve(&expr("(missing)")), None);
    }
}
