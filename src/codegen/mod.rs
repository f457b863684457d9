//! Stack-machine assembly backend.
//!
//! Turns one lowered [`ClassUnit`] into Jasmin-style assembly text: a class header, field
//! declarations, one block per method with its declared `.limit stack` and `.limit locals`,
//! and a single synthesized no-argument constructor that chains to the super class.

mod emit;
pub mod frame;

use crate::diagnostics::CompileError;
use crate::ir::ClassUnit;
use emit::Emitter;

pub use frame::{stack_limit, Frame};

pub fn generate(unit: &ClassUnit) -> Result<String, CompileError> {
    let _span = tracing::debug_span!("codegen", class = %unit.name).entered();
    let mut emitter = Emitter::new(unit);
    emitter.emit_class()?;
    let out = emitter.finish();
    tracing::debug!(bytes = out.len(), "generated assembly");
    Ok(out)
}
