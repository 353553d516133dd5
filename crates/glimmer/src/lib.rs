/*! Unified interface for the Glimmer back end.
 *
 * One import for the syntax tree, the IR, lowering and the text dump. The free functions
 * cover the usual pipeline: hand over a checked tree (built in Rust or received as JSON),
 * get a verified module back, print it.
 */

pub use glimmer_ast as ast;
pub use glimmer_core as core;
pub use glimmer_emit as emit;
pub use glimmer_lower as lower;

pub use glimmer_ast::{Decl, Expr, Program, SourceType, Span, Stmt};
pub use glimmer_core::{
    BasicBlock, BlockId, Function, Instruction, Module, Terminator, Type, Value,
};
pub use glimmer_emit::{Emitter, EmitterConfig, TextEmitter};
pub use glimmer_lower::{lower_program, LowerError, Lowering, LoweringConfig};

use anyhow::{Context, Result};
use tracing::debug;

/// Lowers a program with the default configuration.
pub fn compile(program: &Program) -> std::result::Result<Module, LowerError> {
    compile_with(program, &LoweringConfig::default())
}

pub fn compile_with(
    program: &Program,
    config: &LoweringConfig,
) -> std::result::Result<Module, LowerError> {
    Lowering::new(config.clone()).lower(program)
}

/// Lowers a syntax tree serialized by a front end running elsewhere.
pub fn compile_json(json: &str) -> Result<Module> {
    let program: Program =
        serde_json::from_str(json).context("Failed to parse syntax tree JSON")?;
    debug!(decls = program.decls.len(), "parsed syntax tree");
    compile(&program).context("Failed to lower program")
}

/// Uncolored text listing of a module.
pub fn dump(module: &Module) -> Result<String> {
    TextEmitter::new(EmitterConfig::plain())
        .emit_to_string(module)
        .context("Failed to emit module")
}
