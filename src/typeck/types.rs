use crate::parser::ast::TypeExpr;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const INT: &str = "int";
pub const BOOLEAN: &str = "boolean";
pub const VOID: &str = "void";
/// The variadic parameter type, written `int...`.
pub const INT_SEQ: &str = "int...";
/// Marks a value whose type is only known through an import.
pub const IMPORTED: &str = "IMPORTED_TYPE";
pub const STRING: &str = "String";

/// A resolved type: a name plus an array flag. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    pub is_array: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self { name: name.into(), is_array }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn int() -> Self {
        Self::named(INT)
    }

    pub fn int_array() -> Self {
        Self::new(INT, true)
    }

    pub fn boolean() -> Self {
        Self::named(BOOLEAN)
    }

    pub fn void() -> Self {
        Self::named(VOID)
    }

    pub fn int_seq() -> Self {
        Self::named(INT_SEQ)
    }

    pub fn imported() -> Self {
        Self::named(IMPORTED)
    }

    pub fn is_int(&self) -> bool {
        self.name == INT && !self.is_array
    }

    pub fn is_boolean(&self) -> bool {
        self.name == BOOLEAN && !self.is_array
    }

    pub fn is_void(&self) -> bool {
        self.name == VOID && !self.is_array
    }

    pub fn is_int_seq(&self) -> bool {
        self.name == INT_SEQ
    }

    pub fn is_imported(&self) -> bool {
        self.name == IMPORTED
    }

    /// Arrays and the sequence type can both be indexed and measured.
    pub fn is_indexable(&self) -> bool {
        self.is_array || self.is_int_seq()
    }

    /// The type of one element of an indexable value.
    pub fn element(&self) -> Type {
        if self.is_int_seq() { Type::int() } else { Type::named(self.name.clone()) }
    }

    /// True when the value lives in a reference slot of the target machine.
    pub fn is_reference(&self) -> bool {
        self.is_array || self.is_int_seq() || !matches!(self.name.as_str(), INT | BOOLEAN | VOID | IMPORTED)
    }
}

impl From<&TypeExpr> for Type {
    fn from(expr: &TypeExpr) -> Self {
        Type::new(expr.name.clone(), expr.is_array)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// A named, typed binding: a field, parameter or local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}
