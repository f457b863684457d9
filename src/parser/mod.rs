pub mod ast;

use crate::diagnostics::CompileError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

/// Binding power of the prefix operators `!` and unary `-`.
const PREFIX_BP: u8 = 11;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.node)
    }

    fn peek_is(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected))
    }

    fn advance(&mut self) -> Option<&'a Spanned<Token>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(tok.span)
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.source[tok.span.start..tok.span.end].to_string();
                self.pos += 1;
                Ok(Spanned::new(name, tok.span))
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        match self.tokens.last() {
            Some(last) => Span::with_position(last.span.end, last.span.end, last.span.line, last.span.column),
            None => Span::dummy(),
        }
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| self.eof_span())
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut imports = Vec::new();
        while self.peek_is(&Token::Import) {
            imports.push(self.parse_import()?);
        }

        let class = self.parse_class()?;

        if let Some(tok) = self.peek() {
            return Err(CompileError::syntax(
                format!("unexpected {} after class declaration", tok.node),
                tok.span,
            ));
        }

        Ok(Program { imports, class })
    }

    fn parse_import(&mut self) -> Result<Spanned<ImportDecl>, CompileError> {
        let start = self.expect(&Token::Import)?;
        let mut path = vec![self.expect_ident()?];
        while self.peek_is(&Token::Dot) {
            self.advance();
            path.push(self.expect_ident()?);
        }
        let end = self.expect(&Token::Semicolon)?;
        Ok(Spanned::new(ImportDecl { path }, start.to(end)))
    }

    fn parse_class(&mut self) -> Result<Spanned<ClassDecl>, CompileError> {
        let start = self.expect(&Token::Class)?;
        let name = self.expect_ident()?;
        let super_class = if self.peek_is(&Token::Extends) {
            self.advance();
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(CompileError::syntax("expected }, found end of file", self.eof_span()));
            }
            if self.peek_is(&Token::Public) || self.peek_is(&Token::Static) {
                methods.push(self.parse_method()?);
                continue;
            }
            // `type name ;` is a field, `type name (` a method without modifiers.
            let ty = self.parse_type()?;
            let var_name = self.expect_ident()?;
            if self.peek_is(&Token::LParen) {
                let start = ty.span;
                methods.push(self.parse_method_rest(start, false, false, ty, var_name)?);
            } else {
                if !methods.is_empty() {
                    return Err(CompileError::syntax(
                        "field declarations must precede method declarations",
                        var_name.span,
                    ));
                }
                let end = self.expect(&Token::Semicolon)?;
                let span = ty.span.to(end);
                fields.push(Spanned::new(VarDecl { ty, name: var_name }, span));
            }
        }
        let end = self.expect(&Token::RBrace)?;

        Ok(Spanned::new(ClassDecl { name, super_class, fields, methods }, start.to(end)))
    }

    fn parse_method(&mut self) -> Result<Spanned<MethodDecl>, CompileError> {
        let start = self.current_span();
        let mut is_public = false;
        let mut is_static = false;
        if self.peek_is(&Token::Public) {
            self.advance();
            is_public = true;
        }
        if self.peek_is(&Token::Static) {
            self.advance();
            is_static = true;
        }
        let return_type = self.parse_type()?;
        let name = self.expect_ident()?;
        self.parse_method_rest(start, is_public, is_static, return_type, name)
    }

    fn parse_method_rest(
        &mut self,
        start: Span,
        is_public: bool,
        is_static: bool,
        return_type: Spanned<TypeExpr>,
        name: Spanned<String>,
    ) -> Result<Spanned<MethodDecl>, CompileError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.peek_is(&Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let ty = self.parse_type()?;
            let param_name = self.expect_ident()?;
            params.push(Param { ty, name: param_name });
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;

        let mut locals = Vec::new();
        let mut body = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(CompileError::syntax("expected }, found end of file", self.eof_span()));
            }
            if self.is_var_decl_ahead() {
                locals.push(self.parse_var_decl()?);
            } else {
                body.push(self.parse_stmt()?);
            }
        }
        let end = self.expect(&Token::RBrace)?;

        Ok(Spanned::new(
            MethodDecl { name, is_public, is_static, return_type, params, locals, body },
            start.to(end),
        ))
    }

    /// A local declaration starts with a primitive type keyword, `Name name`, or `Name[]`.
    fn is_var_decl_ahead(&self) -> bool {
        match self.peek_at(0) {
            Some(Token::Int) | Some(Token::Boolean) => true,
            Some(Token::Ident) => match self.peek_at(1) {
                Some(Token::Ident) => true,
                Some(Token::LBracket) => matches!(self.peek_at(2), Some(Token::RBracket)),
                _ => false,
            },
            _ => false,
        }
    }

    fn parse_var_decl(&mut self) -> Result<Spanned<VarDecl>, CompileError> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let end = self.expect(&Token::Semicolon)?;
        let span = ty.span.to(end);
        Ok(Spanned::new(VarDecl { ty, name }, span))
    }

    fn parse_type(&mut self) -> Result<Spanned<TypeExpr>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax("expected type, found end of file", self.eof_span()));
        };
        let start = tok.span;
        match tok.node {
            Token::Int => {
                self.advance();
                if self.peek_is(&Token::LBracket) {
                    self.advance();
                    let end = self.expect(&Token::RBracket)?;
                    Ok(Spanned::new(TypeExpr::array_of("int"), start.to(end)))
                } else if self.peek_is(&Token::Ellipsis) {
                    let end = self.expect(&Token::Ellipsis)?;
                    Ok(Spanned::new(TypeExpr::named("int..."), start.to(end)))
                } else {
                    Ok(Spanned::new(TypeExpr::named("int"), start))
                }
            }
            Token::Boolean => {
                self.advance();
                Ok(Spanned::new(TypeExpr::named("boolean"), start))
            }
            Token::Void => {
                self.advance();
                Ok(Spanned::new(TypeExpr::named("void"), start))
            }
            Token::Ident => {
                let name = self.expect_ident()?;
                if self.peek_is(&Token::LBracket) && matches!(self.peek_at(1), Some(Token::RBracket)) {
                    self.advance();
                    let end = self.expect(&Token::RBracket)?;
                    Ok(Spanned::new(TypeExpr::array_of(name.node), start.to(end)))
                } else {
                    Ok(Spanned::new(TypeExpr::named(name.node), start))
                }
            }
            ref other => Err(CompileError::syntax(format!("expected type, found {other}"), start)),
        }
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax("expected statement, found end of file", self.eof_span()));
        };
        match tok.node {
            Token::LBrace => self.parse_block(),
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::Return => self.parse_return_stmt(),
            _ => {
                let expr = self.parse_expr(0)?;
                if self.peek_is(&Token::Eq) {
                    self.advance();
                    if !matches!(expr.node, Expr::Ident(_) | Expr::Index { .. }) {
                        return Err(CompileError::syntax(
                            format!("cannot assign to '{}'", expr.node),
                            expr.span,
                        ));
                    }
                    let value = self.parse_expr(0)?;
                    let end = self.expect(&Token::Semicolon)?;
                    let span = expr.span.to(end);
                    Ok(Spanned::new(Stmt::Assign { target: expr, value }, span))
                } else {
                    let end = self.expect(&Token::Semicolon)?;
                    let span = expr.span.to(end);
                    Ok(Spanned::new(Stmt::Expr(expr), span))
                }
            }
        }
    }

    fn parse_block(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let start = self.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(CompileError::syntax("expected }, found end of file", self.eof_span()));
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(&Token::RBrace)?;
        Ok(Spanned::new(Stmt::Block(stmts), start.to(end)))
    }

    fn parse_if_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let start = self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr(0)?;
        self.expect(&Token::RParen)?;
        let then_branch = self.parse_stmt()?;
        self.expect(&Token::Else)?;
        let else_branch = self.parse_stmt()?;
        let span = start.to(else_branch.span);
        Ok(Spanned::new(
            Stmt::If { cond, then_branch: Box::new(then_branch), else_branch: Box::new(else_branch) },
            span,
        ))
    }

    fn parse_while_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let start = self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr(0)?;
        self.expect(&Token::RParen)?;
        let body = self.parse_stmt()?;
        let span = start.to(body.span);
        Ok(Spanned::new(Stmt::While { cond, body: Box::new(body) }, span))
    }

    fn parse_return_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let start = self.expect(&Token::Return)?;
        let value = if self.peek_is(&Token::Semicolon) { None } else { Some(self.parse_expr(0)?) };
        let end = self.expect(&Token::Semicolon)?;
        Ok(Spanned::new(Stmt::Return(value), start.to(end)))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(tok) = self.peek() else { break };

            // Postfix forms bind tighter than any operator.
            match tok.node {
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    let end = self.expect(&Token::RBracket)?;
                    let span = lhs.span.to(end);
                    lhs = Spanned::new(Expr::Index { object: Box::new(lhs), index: Box::new(index) }, span);
                    continue;
                }
                Token::Dot => {
                    self.advance();
                    if self.peek_is(&Token::Length) {
                        let end = self.expect(&Token::Length)?;
                        let span = lhs.span.to(end);
                        lhs = Spanned::new(Expr::Length(Box::new(lhs)), span);
                        continue;
                    }
                    let method = self.expect_ident()?;
                    self.expect(&Token::LParen)?;
                    let args = self.parse_args(&Token::RParen)?;
                    let end = self.expect(&Token::RParen)?;
                    let span = lhs.span.to(end);
                    lhs = Spanned::new(Expr::MethodCall { object: Box::new(lhs), method, args }, span);
                    continue;
                }
                _ => {}
            }

            let Some(op) = binop_for(&tok.node) else { break };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, span);
        }

        Ok(lhs)
    }

    fn parse_args(&mut self, close: &Token) -> Result<Vec<Spanned<Expr>>, CompileError> {
        let mut args = Vec::new();
        while !self.peek_is(close) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.parse_expr(0)?);
        }
        Ok(args)
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax("expected expression, found end of file", self.eof_span()));
        };
        let start = tok.span;
        match tok.node {
            Token::IntLit(n) => {
                self.advance();
                Ok(Spanned::new(Expr::IntLit(n), start))
            }
            Token::True => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(true), start))
            }
            Token::False => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(false), start))
            }
            Token::This => {
                self.advance();
                Ok(Spanned::new(Expr::This, start))
            }
            Token::Ident => {
                let name = self.expect_ident()?;
                Ok(Spanned::new(Expr::Ident(name.node), name.span))
            }
            Token::Bang | Token::Minus => {
                let op = if matches!(tok.node, Token::Bang) { UnaryOp::Not } else { UnaryOp::Neg };
                self.advance();
                let operand = self.parse_expr(PREFIX_BP)?;
                let span = start.to(operand.span);
                Ok(Spanned::new(Expr::UnaryOp { op, operand: Box::new(operand) }, span))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                let end = self.expect(&Token::RParen)?;
                Ok(Spanned::new(Expr::Paren(Box::new(inner)), start.to(end)))
            }
            Token::LBracket => {
                self.advance();
                let elements = self.parse_args(&Token::RBracket)?;
                let end = self.expect(&Token::RBracket)?;
                Ok(Spanned::new(Expr::ArrayLit { elements }, start.to(end)))
            }
            Token::New => {
                self.advance();
                if self.peek_is(&Token::Int) {
                    self.advance();
                    self.expect(&Token::LBracket)?;
                    let size = self.parse_expr(0)?;
                    let end = self.expect(&Token::RBracket)?;
                    Ok(Spanned::new(Expr::NewIntArray { size: Box::new(size) }, start.to(end)))
                } else {
                    let class = self.expect_ident()?;
                    self.expect(&Token::LParen)?;
                    let end = self.expect(&Token::RParen)?;
                    Ok(Spanned::new(Expr::NewObject { class }, start.to(end)))
                }
            }
            ref other => Err(CompileError::syntax(format!("expected expression, found {other}"), start)),
        }
    }
}

fn binop_for(tok: &Token) -> Option<BinOp> {
    Some(match tok {
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Lt => BinOp::Lt,
        Token::Gt => BinOp::Gt,
        Token::LtEq => BinOp::LtEq,
        Token::GtEq => BinOp::GtEq,
        Token::AmpAmp => BinOp::And,
        Token::PipePipe => BinOp::Or,
        _ => return None,
    })
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Or => (1, 2),
        BinOp::And => (3, 4),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => (5, 6),
        BinOp::Add | BinOp::Sub => (7, 8),
        BinOp::Mul | BinOp::Div => (9, 10),
    }
}
