pub mod check;
pub mod env;
pub mod infer;
pub mod types;

use crate::diagnostics::Diagnostic;
use crate::parser::ast::Program;
use env::ClassDescriptor;

/// Run the full semantic pipeline. Diagnostics never stop analysis, and lowering does not
/// look at them.
pub fn analyze(program: &Program, desc: &ClassDescriptor) -> Vec<Diagnostic> {
    let checkers = check::default_checkers();
    let diagnostics = check::run_checkers(program, desc, &checkers);
    tracing::debug!(class = %desc.class_name, count = diagnostics.len(), "semantic analysis finished");
    diagnostics
}
