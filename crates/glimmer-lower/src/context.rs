use crate::config::LoweringConfig;
use crate::errors::{LowerError, Result};
use crate::scope::{Binding, Declaration, ScopeStack};
use glimmer_core::{
    BlockId, FunctionBuilder, FunctionInstBuilder, Module, ModuleBuilder, Type, Value,
};
use tracing::{trace, warn};

/// Mutable state shared by every lowering step of one compilation unit.
///
/// Holds the module under construction, the function and block currently
/// receiving instructions, the scope stack, and the `break`/`continue`
/// target stacks of the enclosing loops.
pub struct LoweringContext<'ast> {
    pub config: LoweringConfig,
    module: ModuleBuilder,
    function: Option<FunctionBuilder>,
    scopes: ScopeStack<'ast>,
    break_targets: Vec<BlockId>,
    continue_targets: Vec<BlockId>,
    errors: Vec<LowerError>,
}

impl<'ast> LoweringContext<'ast> {
    pub fn new(config: LoweringConfig) -> Self {
        let module = ModuleBuilder::new(config.module_name.clone(), config.target());
        Self {
            config,
            module,
            function: None,
            scopes: ScopeStack::new(),
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn module(&self) -> &ModuleBuilder {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut ModuleBuilder {
        &mut self.module
    }

    pub fn set_function(&mut self, function: FunctionBuilder) {
        self.function = Some(function);
    }

    /// Detaches the active function, leaving the context at global scope.
    pub fn take_function(&mut self) -> Option<FunctionBuilder> {
        self.function.take()
    }

    pub fn current_function(&self) -> Option<&FunctionBuilder> {
        self.function.as_ref()
    }

    pub fn function_mut(&mut self) -> Result<&mut FunctionBuilder> {
        self.function
            .as_mut()
            .ok_or_else(|| LowerError::Internal("no function is being lowered".into()))
    }

    pub fn set_block(&mut self, block: BlockId) -> Result<()> {
        self.function_mut()?.switch_to_block(block)?;
        Ok(())
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.function.as_ref().and_then(FunctionBuilder::current_block)
    }

    /// A fresh block in the current function, not yet wired into the CFG.
    ///
    /// It inherits the loop depth of the block being lowered, so blocks split
    /// off a loop header test count as part of the loop.
    pub fn new_block(&mut self, label_hint: &str) -> Result<BlockId> {
        let enclosing = self
            .current_block()
            .and_then(|id| self.function.as_ref()?.block(id))
            .map_or(0, |b| b.metadata.loop_depth);
        let loop_depth = enclosing.max(self.break_targets.len() as u32);
        let function = self.function_mut()?;
        let block = function.create_block(label_hint);
        if let Some(b) = function.block_mut(block) {
            b.metadata.loop_depth = loop_depth;
        }
        trace!(%block, label_hint, "new block");
        Ok(block)
    }

    /// Tags the blocks of a loop about to be entered. `inner` lists the loop's
    /// blocks other than the header that were created before entry.
    pub fn mark_loop(&mut self, header: BlockId, inner: &[BlockId], exit: BlockId) -> Result<()> {
        let depth = self.break_targets.len() as u32 + 1;
        let function = self.function_mut()?;
        for &id in std::iter::once(&header).chain(inner) {
            if let Some(b) = function.block_mut(id) {
                b.metadata.loop_depth = depth;
                b.metadata.is_loop_header = id == header;
            }
        }
        if let Some(b) = function.block_mut(exit) {
            b.metadata.is_loop_exit = true;
        }
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.function
            .as_ref()
            .map(FunctionBuilder::is_terminated)
            .unwrap_or(false)
    }

    pub fn ins(&mut self) -> Result<FunctionInstBuilder<'_>> {
        Ok(self.function_mut()?.ins()?)
    }

    pub fn alloca(&mut self, name: Option<&str>, ty: Type) -> Result<Value> {
        Ok(self.function_mut()?.alloca(name, ty)?)
    }

    pub fn push_break_target(&mut self, block: BlockId) {
        self.break_targets.push(block);
    }

    pub fn pop_break_target(&mut self) -> Option<BlockId> {
        self.break_targets.pop()
    }

    pub fn current_break_target(&self) -> Option<BlockId> {
        self.break_targets.last().copied()
    }

    pub fn push_continue_target(&mut self, block: BlockId) {
        self.continue_targets.push(block);
    }

    pub fn pop_continue_target(&mut self) -> Option<BlockId> {
        self.continue_targets.pop()
    }

    pub fn current_continue_target(&self) -> Option<BlockId> {
        self.continue_targets.last().copied()
    }

    /// Runs `f` with loop targets pushed, popping them on every exit path.
    pub fn with_loop<T>(
        &mut self,
        break_target: BlockId,
        continue_target: BlockId,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.push_break_target(break_target);
        self.push_continue_target(continue_target);
        trace!(%break_target, %continue_target, "enter loop");
        let result = f(self);
        self.pop_continue_target();
        self.pop_break_target();
        result
    }

    pub fn push_scope(&mut self) {
        self.scopes.push_scope();
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop_scope();
    }

    /// Runs `f` inside a fresh scope, popping it on every exit path.
    pub fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.push_scope();
        let result = f(self);
        self.pop_scope();
        result
    }

    pub fn scopes(&self) -> &ScopeStack<'ast> {
        &self.scopes
    }

    pub fn bind(&mut self, decl: Declaration<'ast>, storage: Value, ty: Type) -> Result<()> {
        self.scopes.bind(decl, storage, ty)
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding<'ast>> {
        self.scopes.lookup(name)
    }

    /// A scope conflict `decl` would cause, if any.
    pub fn conflict_for(&self, decl: Declaration<'ast>) -> Option<LowerError> {
        self.scopes
            .lookup_innermost(decl.name())
            .map(|previous| LowerError::ScopeConflict {
                name: decl.name().to_string(),
                span: decl.span(),
                previous: previous.decl.span(),
            })
    }

    /// Type of a value, consulting the module for globals and functions.
    pub fn value_type(&self, value: &Value) -> Result<Type> {
        let ty = match value {
            Value::Global(id) => self.module.global_type(*id).cloned().map(Type::pointer_to),
            Value::Function(name) => self
                .module
                .function_signature(name)
                .map(|sig| Type::Function(Box::new(sig.function_type()))),
            other => self.function.as_ref().and_then(|f| f.value_type(other)),
        };
        ty.ok_or_else(|| LowerError::Internal(format!("value {} has no known type", value)))
    }

    /// Records a user-facing error and keeps going.
    pub fn add_error(&mut self, error: LowerError) {
        warn!(%error, "lowering error");
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[LowerError] {
        &self.errors
    }

    /// Hands out the module, or every collected error.
    pub fn finish(mut self) -> Result<Module> {
        match self.errors.len() {
            0 => Ok(self.module.build(self.config.verify)?),
            1 => Err(self.errors.remove(0)),
            _ => Err(LowerError::Multiple(self.errors)),
        }
    }
}
