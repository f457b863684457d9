use crate::span::Spanned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub imports: Vec<Spanned<ImportDecl>>,
    pub class: Spanned<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub path: Vec<Spanned<String>>,
}

impl ImportDecl {
    /// The name the import binds in the compilation unit: its last path segment.
    pub fn binding_name(&self) -> &str {
        self.path.last().map(|s| s.node.as_str()).unwrap_or("")
    }

    pub fn full_path(&self) -> String {
        self.path.iter().map(|s| s.node.as_str()).collect::<Vec<_>>().join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Spanned<String>,
    pub super_class: Option<Spanned<String>>,
    pub fields: Vec<Spanned<VarDecl>>,
    pub methods: Vec<Spanned<MethodDecl>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: Spanned<TypeExpr>,
    pub name: Spanned<String>,
}

/// A written type. The sequence type is spelled `int...` and is never an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub name: String,
    pub is_array: bool,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_array: false }
    }

    pub fn array_of(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_array: true }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Spanned<String>,
    pub is_public: bool,
    pub is_static: bool,
    pub return_type: Spanned<TypeExpr>,
    pub params: Vec<Param>,
    pub locals: Vec<Spanned<VarDecl>>,
    pub body: Vec<Spanned<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub ty: Spanned<TypeExpr>,
    pub name: Spanned<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Block(Vec<Spanned<Stmt>>),
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Box<Spanned<Stmt>>,
    },
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    Expr(Spanned<Expr>),
    /// `target` is either `Expr::Ident` or `Expr::Index`.
    Assign {
        target: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    Return(Option<Spanned<Expr>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i32),
    BoolLit(bool),
    Ident(String),
    This,
    BinOp {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Length(Box<Spanned<Expr>>),
    MethodCall {
        object: Box<Spanned<Expr>>,
        method: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },
    NewIntArray {
        size: Box<Spanned<Expr>>,
    },
    ArrayLit {
        elements: Vec<Spanned<Expr>>,
    },
    NewObject {
        class: Spanned<String>,
    },
    Paren(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

/// Source-like rendering, used in diagnostic messages.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit(n) => write!(f, "{n}"),
            Expr::BoolLit(b) => write!(f, "{b}"),
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::This => write!(f, "this"),
            Expr::BinOp { op, lhs, rhs } => write!(f, "{} {} {}", lhs.node, op, rhs.node),
            Expr::UnaryOp { op, operand } => write!(f, "{}{}", op.symbol(), operand.node),
            Expr::Index { object, index } => write!(f, "{}[{}]", object.node, index.node),
            Expr::Length(object) => write!(f, "{}.length", object.node),
            Expr::MethodCall { object, method, args } => {
                write!(f, "{}.{}(", object.node, method.node)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::NewIntArray { size } => write!(f, "new int[{}]", size.node),
            Expr::ArrayLit { elements } => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expr::NewObject { class } => write!(f, "new {}()", class.node),
            Expr::Paren(inner) => write!(f, "({})", inner.node),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Spanned<Expr>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item.node)?;
    }
    Ok(())
}
