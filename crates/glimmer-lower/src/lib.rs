/*! Lower a type-checked Glimmer syntax tree to block-structured IR.
 *
 * Every mutable variable becomes a stack or global slot accessed through loads and stores,
 * so no SSA construction happens here. Control flow is rebuilt as explicit basic blocks with
 * one terminator each, loops get header/body/step/footer blocks, and vector arithmetic,
 * swizzles and subscripts turn into lane and address instructions.
 *
 * User errors such as redeclarations or a stray `break` are collected so one run reports all
 * of them. Anything that means the tree was not properly checked aborts immediately.
 */

pub mod config;
pub mod context;
pub mod declaration;
pub mod errors;
pub mod expression;
pub mod scope;
pub mod statement;
pub mod type_lowering;

pub use config::{ImplicitReturn, LogicalOps, LoweringConfig};
pub use context::LoweringContext;
pub use declaration::DeclarationLowerer;
pub use errors::{LowerError, Result};
pub use expression::{ExpressionLowerer, LValue};
pub use scope::{Binding, Declaration, Scope, ScopeStack};
pub use statement::StatementLowerer;
pub use type_lowering::TypeLowering;

use glimmer_ast::Program;
use glimmer_core::Module;
use tracing::debug;

/// Walks the top-level declarations of a program in order and builds one module.
pub struct Lowering {
    config: LoweringConfig,
}

impl Lowering {
    pub fn new(config: LoweringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    pub fn lower(&self, program: &Program) -> Result<Module> {
        debug!(
            module = %self.config.module_name,
            decls = program.decls.len(),
            "lowering program"
        );
        let mut ctx = LoweringContext::new(self.config.clone());
        for decl in &program.decls {
            DeclarationLowerer::new(&mut ctx).lower(decl)?;
        }
        ctx.finish()
    }
}

impl Default for Lowering {
    fn default() -> Self {
        Self::new(LoweringConfig::default())
    }
}

pub fn lower_program(program: &Program, config: &LoweringConfig) -> Result<Module> {
    Lowering::new(config.clone()).lower(program)
}
