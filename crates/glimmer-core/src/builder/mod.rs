mod function_builder;
mod module_builder;

pub use function_builder::{FunctionBuilder, FunctionInstBuilder};
pub use module_builder::ModuleBuilder;
