/*! Core IR for the Glimmer shader compiler.
 *
 * Lowered programs are plain data: typed virtual registers, stack and global slots
 * accessed through load/store, basic blocks ending in exactly one terminator, and
 * functions owning their blocks in creation order. Builders enforce the block
 * discipline while a function is being constructed, and the verifier checks it
 * again on the finished module.
 */

pub mod analysis;
pub mod block;
pub mod builder;
pub mod function;
pub mod instructions;
pub mod module;
pub mod types;
pub mod values;

pub use analysis::{verify_function, verify_module, ControlFlowGraph, VerifyError};
pub use block::{BasicBlock, BlockId, BlockMetadata, Terminator};
pub use builder::{FunctionBuilder, FunctionInstBuilder, ModuleBuilder};
pub use cranelift_codegen::ir::condcodes::{FloatCC, IntCC};
pub use function::{Function, FunctionBody, FunctionSignature, Parameter, StackSlot};
pub use instructions::Instruction;
pub use module::{GlobalVariable, Module, TargetInfo};
pub use types::{FunctionType, Type};
pub use values::{Constant, GlobalId, ParamId, SlotId, TempId, Value};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Block {0} already terminated")]
    BlockTerminated(String),
    #[error("Block {block} of {function} is not terminated")]
    Unterminated { function: String, block: String },
    #[error("Verification failed: {}", join_errors(.0))]
    Verification(Vec<VerifyError>),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join_errors(errors: &[VerifyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
