#![allow(dead_code)]

use glimmer_ast::{Decl, FnDecl, Program, SourceType, Stmt, VarDecl};
use glimmer_core::{BasicBlock, FunctionBody, Instruction, Module, Value};
use glimmer_lower::{lower_program, LowerError, LoweringConfig};

pub fn var(name: &str, ty: SourceType) -> VarDecl {
    VarDecl::new(name, ty)
}

pub fn function(
    name: &str,
    returns: SourceType,
    params: Vec<VarDecl>,
    decls: Vec<VarDecl>,
    stmts: Vec<Stmt>,
) -> Decl {
    Decl::Function(FnDecl::new(
        name,
        returns,
        params,
        Some(Stmt::block(decls, stmts)),
    ))
}

pub fn lower(decls: Vec<Decl>) -> Result<Module, LowerError> {
    lower_with(decls, LoweringConfig::default())
}

pub fn lower_with(decls: Vec<Decl>, config: LoweringConfig) -> Result<Module, LowerError> {
    lower_program(&Program::new(decls), &config)
}

pub fn body<'m>(module: &'m Module, name: &str) -> &'m FunctionBody {
    module
        .get_function(name)
        .and_then(|f| f.body.as_ref())
        .unwrap_or_else(|| panic!("function {} has no body", name))
}

pub fn block<'b>(body: &'b FunctionBody, label: &str) -> &'b BasicBlock {
    body.blocks
        .values()
        .find(|b| b.label == label)
        .unwrap_or_else(|| panic!("no block labeled {}", label))
}

pub fn labels(body: &FunctionBody) -> Vec<&str> {
    body.blocks.values().map(|b| b.label.as_str()).collect()
}

pub fn successor_labels(body: &FunctionBody, label: &str) -> Vec<String> {
    block(body, label)
        .successors()
        .into_iter()
        .map(|id| body.blocks[&id].label.clone())
        .collect()
}

pub fn entry(body: &FunctionBody) -> &BasicBlock {
    &body.blocks[&body.entry_block]
}

/// Result of the first load from `ptr` in `block`.
pub fn load_of(block: &BasicBlock, ptr: &Value) -> Value {
    block
        .instructions
        .iter()
        .find_map(|inst| match inst {
            Instruction::Load { result, ptr: p, .. } if p == ptr => Some(result.clone()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no load of {}", ptr))
}
