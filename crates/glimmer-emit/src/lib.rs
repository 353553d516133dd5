/*! Print lowered IR as text.
 *
 * The dump lists globals, then every function with its blocks in creation order. Each block
 * shows its label, its instructions, and the terminator that ends it, which is usually all a
 * reader needs to follow the control flow of a lowered shader.
 */

pub mod config;
pub mod emitter;
pub mod text_emitter;

pub use config::{EmitterConfig, IndentStyle, VerbosityLevel};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Tone};
pub use text_emitter::{format_instruction, TextEmitter};
