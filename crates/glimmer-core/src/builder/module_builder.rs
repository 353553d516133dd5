use crate::{
    analysis::verify_module,
    function::{Function, FunctionSignature},
    module::{GlobalVariable, Module, TargetInfo},
    types::Type,
    values::{Constant, GlobalId, Value},
    IrError, Result,
};

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>, target: TargetInfo) -> Self {
        Self {
            module: Module::new(name).with_target(target),
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Adds a module-level slot and returns its address.
    pub fn add_global(
        &mut self,
        name: &str,
        ty: Type,
        initializer: Constant,
        is_constant: bool,
    ) -> Result<Value> {
        if self.module.globals.contains_key(name) {
            return Err(IrError::BuilderError(format!(
                "Global {} already defined",
                name
            )));
        }

        let id = GlobalId(self.module.globals.len() as u32);
        self.module.globals.insert(
            name.to_string(),
            GlobalVariable {
                id,
                name: name.to_string(),
                ty,
                initializer,
                is_constant,
            },
        );
        Ok(Value::Global(id))
    }

    pub fn global_type(&self, id: GlobalId) -> Option<&Type> {
        self.module.global(id).map(|g| &g.ty)
    }

    pub fn function_signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.module.functions.get(name).map(|f| &f.signature)
    }

    /// Registers a bodiless function. Redeclaring with the same signature is a no-op.
    pub fn declare_function(&mut self, signature: FunctionSignature) -> Result<Value> {
        let name = signature.name.clone();
        match self.module.functions.get(&name) {
            Some(existing) if existing.signature != signature => {
                return Err(IrError::BuilderError(format!(
                    "Function {} redeclared with a different signature",
                    name
                )));
            }
            Some(_) => {}
            None => {
                self.module
                    .functions
                    .insert(name.clone(), Function::declaration(signature));
            }
        }
        Ok(Value::Function(name))
    }

    /// Installs a finished body, replacing a matching prior declaration.
    pub fn define_function(&mut self, function: Function) -> Result<()> {
        let name = function.name().to_string();
        if let Some(existing) = self.module.functions.get(&name) {
            if !existing.is_declaration() {
                return Err(IrError::BuilderError(format!(
                    "Function {} already has a body",
                    name
                )));
            }
            if existing.signature != function.signature {
                return Err(IrError::BuilderError(format!(
                    "Definition of {} does not match its declaration",
                    name
                )));
            }
        }

        self.module.functions.insert(name, function);
        Ok(())
    }

    pub fn build(self, verify: bool) -> Result<Module> {
        if verify {
            verify_module(&self.module)?;
        }
        Ok(self.module)
    }
}
