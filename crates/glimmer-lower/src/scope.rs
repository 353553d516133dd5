use crate::errors::{LowerError, Result};
use glimmer_ast::{FnDecl, Span, VarDecl};
use glimmer_core::{Type, Value};
use std::collections::HashMap;
use tracing::trace;

/// The declaration a binding was created for. Borrowed from the tree, never owned.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'ast> {
    Var(&'ast VarDecl),
    Function(&'ast FnDecl),
}

impl<'ast> Declaration<'ast> {
    pub fn name(&self) -> &'ast str {
        match *self {
            Declaration::Var(var) => &var.name,
            Declaration::Function(func) => &func.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Var(var) => var.span,
            Declaration::Function(func) => func.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binding<'ast> {
    pub decl: Declaration<'ast>,
    /// Slot, global or function address.
    pub storage: Value,
    /// Type of what `storage` holds.
    pub ty: Type,
}

impl<'ast> Binding<'ast> {
    pub fn name(&self) -> &'ast str {
        self.decl.name()
    }

    pub fn is_function(&self) -> bool {
        matches!(self.decl, Declaration::Function(_))
    }
}

#[derive(Debug, Default)]
pub struct Scope<'ast> {
    symbols: HashMap<String, Binding<'ast>>,
}

impl<'ast> Scope<'ast> {
    pub fn get(&self, name: &str) -> Option<&Binding<'ast>> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Lexical scopes, innermost last. The bottom scope is the global scope and is never popped.
#[derive(Debug)]
pub struct ScopeStack<'ast> {
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> ScopeStack<'ast> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        trace!(depth = self.depth(), "push scope");
    }

    pub fn pop_scope(&mut self) -> Option<Scope<'ast>> {
        if self.scopes.len() > 1 {
            let scope = self.scopes.pop();
            trace!(depth = self.depth(), "pop scope");
            scope
        } else {
            None
        }
    }

    /// Number of scopes above the global one.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_global(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Binds into the innermost scope. A name already bound there is a conflict.
    pub fn bind(&mut self, decl: Declaration<'ast>, storage: Value, ty: Type) -> Result<()> {
        let name = decl.name();
        if let Some(previous) = self.lookup_innermost(name) {
            return Err(LowerError::ScopeConflict {
                name: name.to_string(),
                span: decl.span(),
                previous: previous.decl.span(),
            });
        }

        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| LowerError::Internal("scope stack is empty".into()))?;
        scope
            .symbols
            .insert(name.to_string(), Binding { decl, storage, ty });
        Ok(())
    }

    /// Innermost-to-outermost search, first match wins.
    pub fn lookup(&self, name: &str) -> Option<&Binding<'ast>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_innermost(&self, name: &str) -> Option<&Binding<'ast>> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }
}

impl<'ast> Default for ScopeStack<'ast> {
    fn default() -> Self {
        Self::new()
    }
}
