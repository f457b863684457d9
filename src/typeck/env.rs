use super::types::{Symbol, Type};
use crate::parser::ast::{MethodDecl, Program};

/// Signature of one declared method: return type, ordered params, ordered locals.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub is_static: bool,
    pub is_public: bool,
}

impl MethodSig {
    fn from_decl(decl: &MethodDecl) -> Self {
        Self {
            name: decl.name.node.clone(),
            return_type: Type::from(&decl.return_type.node),
            params: decl
                .params
                .iter()
                .map(|p| Symbol::new(p.name.node.clone(), Type::from(&p.ty.node)))
                .collect(),
            locals: decl
                .locals
                .iter()
                .map(|l| Symbol::new(l.node.name.node.clone(), Type::from(&l.node.ty.node)))
                .collect(),
            is_static: decl.is_static,
            is_public: decl.is_public,
        }
    }

    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.iter().find(|s| s.name == name)
    }

    pub fn param(&self, name: &str) -> Option<&Symbol> {
        self.params.iter().find(|s| s.name == name)
    }

    /// Position of the `int...` parameter, if the method declares one.
    pub fn variadic_index(&self) -> Option<usize> {
        self.params.iter().position(|p| p.ty.is_int_seq())
    }
}

/// Everything known about the compilation unit's single class.
///
/// Built once from the tree before any check or lowering runs and read-only afterwards.
/// Methods are kept in declaration order; lookups by name take the first match.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub class_name: String,
    pub super_class: Option<String>,
    /// Bound import names (last path segment), in declaration order.
    pub imports: Vec<String>,
    /// Full dotted import paths, parallel to `imports`.
    pub import_paths: Vec<String>,
    pub fields: Vec<Symbol>,
    pub methods: Vec<MethodSig>,
}

impl ClassDescriptor {
    pub fn build(program: &Program) -> Self {
        let class = &program.class.node;
        let desc = Self {
            class_name: class.name.node.clone(),
            super_class: class.super_class.as_ref().map(|s| s.node.clone()),
            imports: program.imports.iter().map(|i| i.node.binding_name().to_string()).collect(),
            import_paths: program.imports.iter().map(|i| i.node.full_path()).collect(),
            fields: class
                .fields
                .iter()
                .map(|f| Symbol::new(f.node.name.node.clone(), Type::from(&f.node.ty.node)))
                .collect(),
            methods: class.methods.iter().map(|m| MethodSig::from_decl(&m.node)).collect(),
        };
        tracing::debug!(
            class = %desc.class_name,
            imports = desc.imports.len(),
            fields = desc.fields.len(),
            methods = desc.methods.len(),
            "built class descriptor"
        );
        desc
    }

    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|s| s.name == name)
    }

    pub fn is_import(&self, name: &str) -> bool {
        self.imports.iter().any(|i| i == name)
    }

    pub fn has_super(&self) -> bool {
        self.super_class.is_some()
    }

    pub fn is_super(&self, name: &str) -> bool {
        self.super_class.as_deref() == Some(name)
    }

    pub fn own_type(&self) -> Type {
        Type::named(self.class_name.clone())
    }
}
