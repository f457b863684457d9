//! AST visitor infrastructure.
//!
//! Implement [`Visitor`] for a pass, overriding only the methods you need, and call the
//! matching `walk_*` function inside an override to keep the default recursion.
//!
//! ```rust
//! use jmmc::visit::{Visitor, walk_expr};
//! use jmmc::parser::ast::Expr;
//! use jmmc::span::Spanned;
//! use std::collections::HashSet;
//!
//! struct IdentCollector {
//!     names: HashSet<String>,
//! }
//!
//! impl Visitor for IdentCollector {
//!     fn visit_expr(&mut self, expr: &Spanned<Expr>) {
//!         if let Expr::Ident(name) = &expr.node {
//!             self.names.insert(name.clone());
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```
//!
//! Every semantic checker is a `Visitor`. Lowering does not use this trait: nearly every arm
//! there has custom logic, so it matches on the tree directly.

use crate::parser::ast::*;
use crate::span::Spanned;

/// Read-only AST visitor. Default implementations recurse into all children.
///
/// Omit the `walk_*` call in an override to prune traversal at that node.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_import(&mut self, _import: &Spanned<ImportDecl>) {}

    fn visit_class(&mut self, class: &Spanned<ClassDecl>) {
        walk_class(self, class);
    }

    /// Called for class fields and method locals alike.
    fn visit_var_decl(&mut self, _decl: &Spanned<VarDecl>) {}

    fn visit_method(&mut self, method: &Spanned<MethodDecl>) {
        walk_method(self, method);
    }

    fn visit_param(&mut self, _param: &Param) {}

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) {
        walk_expr(self, expr);
    }
}

pub fn walk_program<V: Visitor>(v: &mut V, program: &Program) {
    for import in &program.imports {
        v.visit_import(import);
    }
    v.visit_class(&program.class);
}

pub fn walk_class<V: Visitor>(v: &mut V, class: &Spanned<ClassDecl>) {
    for field in &class.node.fields {
        v.visit_var_decl(field);
    }
    for method in &class.node.methods {
        v.visit_method(method);
    }
}

pub fn walk_method<V: Visitor>(v: &mut V, method: &Spanned<MethodDecl>) {
    for param in &method.node.params {
        v.visit_param(param);
    }
    for local in &method.node.locals {
        v.visit_var_decl(local);
    }
    for stmt in &method.node.body {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Spanned<Stmt>) {
    match &stmt.node {
        Stmt::Block(stmts) => {
            for s in stmts {
                v.visit_stmt(s);
            }
        }
        Stmt::If { cond, then_branch, else_branch } => {
            v.visit_expr(cond);
            v.visit_stmt(then_branch);
            v.visit_stmt(else_branch);
        }
        Stmt::While { cond, body } => {
            v.visit_expr(cond);
            v.visit_stmt(body);
        }
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Assign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Spanned<Expr>) {
    match &expr.node {
        Expr::IntLit(_) | Expr::BoolLit(_) | Expr::Ident(_) | Expr::This | Expr::NewObject { .. } => {}
        Expr::BinOp { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::UnaryOp { operand, .. } => v.visit_expr(operand),
        Expr::Index { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        Expr::Length(object) => v.visit_expr(object),
        Expr::MethodCall { object, args, .. } => {
            v.visit_expr(object);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::NewIntArray { size } => v.visit_expr(size),
        Expr::ArrayLit { elements } => {
            for e in elements {
                v.visit_expr(e);
            }
        }
        Expr::Paren(inner) => v.visit_expr(inner),
    }
}
