pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod visit;
pub mod typeck;
pub mod ir;
pub mod codegen;
pub mod manifest;

use diagnostics::{CompileError, Diagnostic};
use ir::ClassUnit;
use manifest::BuildConfig;
use parser::ast::Program;
use std::path::{Path, PathBuf};
use typeck::env::ClassDescriptor;

/// Everything one compilation produces. Diagnostics never stop lowering, so a unit with
/// semantic errors still carries IR and assembly.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub diagnostics: Vec<Diagnostic>,
    pub ir: ClassUnit,
    pub assembly: String,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn ir_text(&self) -> String {
        self.ir.to_string()
    }
}

/// Lex and parse source text.
pub fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(&tokens, source);
    parser.parse_program()
}

/// Read a tree serialized with [`ast_to_json`].
pub fn parse_ast_json(text: &str) -> Result<Program, CompileError> {
    serde_json::from_str(text).map_err(|e| CompileError::ast(format!("invalid AST JSON: {e}")))
}

pub fn ast_to_json(program: &Program) -> Result<String, CompileError> {
    serde_json::to_string_pretty(program).map_err(|e| CompileError::ast(format!("cannot serialize AST: {e}")))
}

/// Run the semantic pipeline only.
pub fn analyze(program: &Program) -> Vec<Diagnostic> {
    let desc = ClassDescriptor::build(program);
    typeck::analyze(program, &desc)
}

/// Descriptor build, analysis, lowering and assembly generation, in that order.
pub fn compile_program(program: &Program) -> Result<Compilation, CompileError> {
    let desc = ClassDescriptor::build(program);
    let diagnostics = typeck::analyze(program, &desc);
    let ir = ir::lower_program(program, &desc)?;
    let assembly = codegen::generate(&ir)?;
    tracing::info!(class = %ir.name, diagnostics = diagnostics.len(), "compiled class");
    Ok(Compilation { diagnostics, ir, assembly })
}

pub fn compile_source(source: &str) -> Result<Compilation, CompileError> {
    let program = parse(source)?;
    compile_program(&program)
}

/// A loaded input: the tree, plus the source text when the input was source rather
/// than serialized JSON.
pub struct LoadedInput {
    pub program: Program,
    pub source: Option<String>,
}

/// Load `path` as JSON when it ends in `.json`, as source text otherwise.
pub fn load_input(path: &Path) -> Result<LoadedInput, CompileError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CompileError::io(format!("cannot read input: {e}"), path.to_path_buf()))?;
    if path.extension().is_some_and(|ext| ext == "json") {
        let program = parse_ast_json(&text)?;
        return Ok(LoadedInput { program, source: None });
    }
    let program = parse(&text)?;
    Ok(LoadedInput { program, source: Some(text) })
}

/// Write `<Class>.ollir` and `<Class>.j` into the configured output directory, as enabled.
/// Returns the written paths.
pub fn write_outputs(compilation: &Compilation, config: &BuildConfig) -> Result<Vec<PathBuf>, CompileError> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir)
        .map_err(|e| CompileError::io(format!("cannot create output directory: {e}"), dir.clone()))?;

    let mut written = Vec::new();
    let name = &compilation.ir.name;
    if config.emit_ir {
        let path = dir.join(format!("{name}.ollir"));
        write_file(&path, &compilation.ir_text())?;
        written.push(path);
    }
    if config.emit_asm {
        let path = dir.join(format!("{name}.j"));
        write_file(&path, &compilation.assembly)?;
        written.push(path);
    }
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), CompileError> {
    std::fs::write(path, contents)
        .map_err(|e| CompileError::io(format!("cannot write output: {e}"), path.to_path_buf()))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}
