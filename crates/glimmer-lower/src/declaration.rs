use crate::config::ImplicitReturn;
use crate::context::LoweringContext;
use crate::errors::{LowerError, Result};
use crate::expression::ExpressionLowerer;
use crate::scope::Declaration;
use crate::statement::StatementLowerer;
use crate::type_lowering::TypeLowering;
use glimmer_ast::{
    Decl, Expr, ExprKind, FnDecl, Stmt, StmtKind, TypeQualifier, UnaryOp, VarDecl,
};
use glimmer_core::{
    Constant, ControlFlowGraph, FunctionBuilder, FunctionSignature, Parameter, Type,
};
use tracing::{debug, debug_span, trace};

/// Lowers variable and function declarations.
pub struct DeclarationLowerer<'a, 'ast> {
    ctx: &'a mut LoweringContext<'ast>,
}

impl<'a, 'ast> DeclarationLowerer<'a, 'ast> {
    pub fn new(ctx: &'a mut LoweringContext<'ast>) -> Self {
        Self { ctx }
    }

    pub fn lower(&mut self, decl: &'ast Decl) -> Result<()> {
        match decl {
            Decl::Var(var) => self.lower_var(var),
            Decl::Function(function) => self.lower_function(function),
        }
    }

    /// Allocates storage for a variable and binds it in the innermost scope.
    ///
    /// Outside a function the storage is a module-level global. Inside one it
    /// is an entry-region stack slot, and the initializer runs as a plain
    /// assignment once the name is visible.
    pub fn lower_var(&mut self, decl: &'ast VarDecl) -> Result<()> {
        if let Some(conflict) = self.ctx.conflict_for(Declaration::Var(decl)) {
            self.ctx.add_error(conflict);
            return Ok(());
        }

        let ty = TypeLowering::lower(&decl.ty)?;
        if self.ctx.current_function().is_some() {
            self.local(decl, ty)
        } else {
            self.global(decl, ty)
        }
    }

    fn global(&mut self, decl: &'ast VarDecl, ty: Type) -> Result<()> {
        let initializer = match &decl.init {
            Some(init) => constant_initializer(init, &ty)
                .ok_or_else(|| LowerError::unsupported("non-constant global initializer", init.span))?,
            None => Constant::zero(&ty).ok_or_else(|| LowerError::UnmappableType(ty.to_string()))?,
        };
        let is_constant = decl.qualifier == Some(TypeQualifier::Const);

        let storage = self
            .ctx
            .module_mut()
            .add_global(&decl.name, ty.clone(), initializer, is_constant)?;
        debug!(name = %decl.name, %ty, is_constant, "lowered global");
        self.ctx.bind(Declaration::Var(decl), storage, ty)
    }

    fn local(&mut self, decl: &'ast VarDecl, ty: Type) -> Result<()> {
        let slot = self.ctx.alloca(Some(&decl.name), ty.clone())?;
        self.ctx.bind(Declaration::Var(decl), slot.clone(), ty.clone())?;
        trace!(name = %decl.name, %ty, "lowered local");

        if let Some(init) = &decl.init {
            // An initializer that mentions the variable reads a zeroed slot.
            if init.references(&decl.name) {
                let zero = TypeLowering::zero_value(&ty)?;
                self.ctx.ins()?.store(slot, zero)?;
            }
            let assign = Expr::assign(Expr::var(decl.name.as_str()).at(decl.span), init.clone())
                .at(init.span);
            ExpressionLowerer::new(&mut *self.ctx).rvalue(&assign)?;
        }
        Ok(())
    }

    /// Registers a function and, when it has a body, lowers it into the module.
    pub fn lower_function(&mut self, decl: &'ast FnDecl) -> Result<()> {
        let span = debug_span!("lower_function", name = %decl.name);
        let _enter = span.enter();

        let signature = signature_of(decl)?;
        let completes_prototype = match self.ctx.conflict_for(Declaration::Function(decl)) {
            None => false,
            Some(_) if self.is_open_prototype(&signature) => true,
            Some(conflict) => {
                self.ctx.add_error(conflict);
                return Ok(());
            }
        };

        let callee = self.ctx.module_mut().declare_function(signature.clone())?;
        if !completes_prototype {
            let ty = Type::Function(Box::new(signature.function_type()));
            self.ctx.bind(Declaration::Function(decl), callee, ty)?;
        }

        let body = match &decl.body {
            Some(body) => body,
            None => {
                debug!("declared prototype");
                return Ok(());
            }
        };

        self.ctx.set_function(FunctionBuilder::new(signature));
        let lowered = self
            .ctx
            .with_scope(|ctx| DeclarationLowerer::new(ctx).function_body(decl, body));
        let builder = self
            .ctx
            .take_function()
            .ok_or_else(|| LowerError::Internal(format!("builder for '{}' went missing", decl.name)))?;
        lowered?;

        let function = builder.finish()?;
        debug!(blocks = function.blocks().count(), "lowered function");
        self.ctx.module_mut().define_function(function)?;
        Ok(())
    }

    /// Whether the name is bound to a bodiless function with this exact signature.
    fn is_open_prototype(&self, signature: &FunctionSignature) -> bool {
        let bound_to_function = self
            .ctx
            .lookup(&signature.name)
            .map_or(false, |binding| binding.is_function());
        let prototype = self
            .ctx
            .module()
            .module()
            .get_function(&signature.name)
            .map_or(false, |f| f.is_declaration() && f.signature == *signature);
        bound_to_function && prototype
    }

    fn function_body(&mut self, decl: &'ast FnDecl, body: &'ast Stmt) -> Result<()> {
        let entry = self.ctx.function_mut()?.entry_block();
        self.ctx.set_block(entry)?;

        for (index, param) in decl.params.iter().enumerate() {
            if let Some(conflict) = self.ctx.conflict_for(Declaration::Var(param)) {
                self.ctx.add_error(conflict);
                continue;
            }
            let ty = TypeLowering::lower(&param.ty)?;
            let slot = self.ctx.alloca(Some(&param.name), ty.clone())?;
            self.ctx.bind(Declaration::Var(param), slot.clone(), ty)?;

            let incoming = self.ctx.function_mut()?.param(index).ok_or_else(|| {
                LowerError::Internal(format!("'{}' has no parameter {}", decl.name, index))
            })?;
            self.ctx.ins()?.store(slot, incoming)?;
        }

        // Parameters and the outermost locals share one scope.
        let mut statements = StatementLowerer::new(&mut *self.ctx);
        match &body.kind {
            StmtKind::Block { decls, stmts } => statements.block_contents(decls, stmts)?,
            _ => statements.lower(body)?,
        }

        self.implicit_return(decl)
    }

    fn implicit_return(&mut self, decl: &'ast FnDecl) -> Result<()> {
        if self.ctx.is_terminated() {
            return Ok(());
        }

        let returns = self.ctx.function_mut()?.signature().returns.clone();
        if returns == Type::Void {
            self.ctx.ins()?.return_void()?;
            return Ok(());
        }

        if self.ctx.config.implicit_return == ImplicitReturn::Reject && self.end_is_reachable()? {
            self.ctx.add_error(LowerError::MissingReturn {
                function: decl.name.clone(),
                span: decl.span,
            });
        }
        let zero = TypeLowering::zero_value(&returns)?;
        self.ctx.ins()?.return_value(zero)?;
        Ok(())
    }

    fn end_is_reachable(&self) -> Result<bool> {
        let function = self
            .ctx
            .current_function()
            .ok_or_else(|| LowerError::Internal("no function is being lowered".into()))?;
        let current = function
            .current_block()
            .ok_or_else(|| LowerError::Internal("no current block".into()))?;
        Ok(ControlFlowGraph::from_body(function.body()).is_reachable(current))
    }
}

fn signature_of(decl: &FnDecl) -> Result<FunctionSignature> {
    let params = decl
        .params
        .iter()
        .map(|param| {
            TypeLowering::lower(&param.ty).map(|ty| Parameter::new(param.name.as_str(), ty))
        })
        .collect::<Result<Vec<_>>>()?;
    let returns = TypeLowering::lower_return(&decl.return_type)?;
    Ok(FunctionSignature::new(decl.name.as_str(), params, returns))
}

/// Static initializer of a global: a literal, optionally signed. Integer
/// literals initialize float globals.
fn constant_initializer(init: &Expr, ty: &Type) -> Option<Constant> {
    match (&init.kind, ty) {
        (ExprKind::IntLit(value), Type::Int) => Some(Constant::Int(*value)),
        (ExprKind::IntLit(value), Type::Float) => Some(Constant::float(*value as f32)),
        (ExprKind::FloatLit(value), Type::Float) => Some(Constant::float(*value)),
        (ExprKind::BoolLit(value), Type::Bool) => Some(Constant::Bool(*value)),
        (
            ExprKind::Unary {
                op: UnaryOp::Plus,
                operand,
            },
            _,
        ) => constant_initializer(operand, ty),
        (
            ExprKind::Unary {
                op: UnaryOp::Minus,
                operand,
            },
            _,
        ) => match constant_initializer(operand, ty)? {
            Constant::Int(value) => Some(Constant::Int(value.wrapping_neg())),
            constant @ Constant::Float(_) => constant.as_f32().map(|value| Constant::float(-value)),
            _ => None,
        },
        _ => None,
    }
}
