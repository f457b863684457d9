use crate::span::Span;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions. Any of these aborts the current compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("Lowering error: {msg}")]
    Lowering { msg: String },

    #[error("Codegen error: {msg}")]
    Codegen { msg: String },

    #[error("I/O error: {msg}")]
    Io { msg: String, path: PathBuf },

    #[error("Manifest error: {msg}")]
    Manifest { msg: String, path: PathBuf },

    #[error("AST error: {msg}")]
    Ast { msg: String },
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn lowering(msg: impl Into<String>) -> Self {
        Self::Lowering { msg: msg.into() }
    }

    pub fn codegen(msg: impl Into<String>) -> Self {
        Self::Codegen { msg: msg.into() }
    }

    pub fn io(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Io { msg: msg.into(), path }
    }

    pub fn manifest(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Manifest { msg: msg.into(), path }
    }

    pub fn ast(msg: impl Into<String>) -> Self {
        Self::Ast { msg: msg.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A recoverable semantic finding. Collected, never deduplicated, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
    #[serde(skip)]
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            line: span.line,
            column: span.column,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
        };
        write!(f, "{kind}[{}:{}]: {}", self.line, self.column, self.message)
    }
}

/// Render a semantic diagnostic with ariadne for nice terminal output.
pub fn render_diagnostic(source: &str, filename: &str, diag: &Diagnostic) {
    use ariadne::{Label, Report, ReportKind, Source};

    if diag.span.end <= diag.span.start || diag.span.end > source.len() {
        eprintln!("{filename}: {diag}");
        return;
    }
    let printed = Report::build(ReportKind::Error, (), diag.span.start)
        .with_message("semantic error")
        .with_label(Label::new(diag.span.start..diag.span.end).with_message(&diag.message))
        .finish()
        .eprint(Source::from(source));
    if printed.is_err() {
        eprintln!("{filename}: {diag}");
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(source: &str, filename: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Syntax { msg, span } if span.end <= source.len() => {
            let printed = Report::build(ReportKind::Error, (), span.start)
                .with_message("syntax error")
                .with_label(Label::new(span.start..span.end.max(span.start)).with_message(msg))
                .finish()
                .eprint(Source::from(source));
            if printed.is_err() {
                eprintln!("error [{filename}]: {err}");
            }
        }
        CompileError::Io { msg, path } | CompileError::Manifest { msg, path } => {
            eprintln!("error: {msg}");
            eprintln!("  --> {}", path.display());
        }
        _ => {
            eprintln!("error [{filename}]: {err}");
        }
    }
}
