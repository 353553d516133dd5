use crate::{
    block::Terminator,
    function::Function,
    module::Module,
    types::Type,
    values::{TempId, Value},
    IrError, Result,
};
use std::collections::HashSet;
use thiserror::Error;

/// A structural defect in lowered IR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("{function}: block {block} has no terminator")]
    MissingTerminator { function: String, block: String },

    #[error("{function}: block {block} branches to missing block {target}")]
    InvalidBlockRef {
        function: String,
        block: String,
        target: String,
    },

    #[error("{function}: block {block} uses undefined value {value}")]
    UndefinedValue {
        function: String,
        block: String,
        value: String,
    },

    #[error("{function}: stack slot allocated outside the entry block in {block}")]
    MisplacedAlloca { function: String, block: String },

    #[error("{function}: block {block} returns {found} from a function returning {expected}")]
    ReturnMismatch {
        function: String,
        block: String,
        expected: String,
        found: String,
    },
}

pub fn verify_module(module: &Module) -> Result<()> {
    let mut errors = Vec::new();
    for function in module.definitions() {
        collect_function_errors(function, Some(module), &mut errors);
    }
    into_result(errors)
}

/// Checks a single function. Global references are not resolved without a module.
pub fn verify_function(function: &Function) -> Result<()> {
    let mut errors = Vec::new();
    collect_function_errors(function, None, &mut errors);
    into_result(errors)
}

fn into_result(errors: Vec<VerifyError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(IrError::Verification(errors))
    }
}

fn collect_function_errors(function: &Function, module: Option<&Module>, errors: &mut Vec<VerifyError>) {
    let Some(body) = &function.body else {
        return;
    };
    let name = function.name().to_string();

    let defined: HashSet<TempId> = body
        .blocks
        .values()
        .flat_map(|b| &b.instructions)
        .filter_map(|inst| inst.result().and_then(Value::as_temp))
        .collect();

    let is_defined = |value: &Value| match value {
        Value::Temp(id) => defined.contains(id),
        Value::Slot(id) => body.slot(*id).is_some(),
        Value::Param(id) => (id.0 as usize) < function.signature.params.len(),
        Value::Global(id) => module.map_or(true, |m| m.global(*id).is_some()),
        Value::Function(callee) => module.map_or(true, |m| m.get_function(callee).is_some()),
        Value::Constant(_) => true,
    };

    for block in body.blocks.values() {
        for inst in &block.instructions {
            if inst.is_alloca() && block.id != body.entry_block {
                errors.push(VerifyError::MisplacedAlloca {
                    function: name.clone(),
                    block: block.label.clone(),
                });
            }
            for operand in inst.operands() {
                if !is_defined(operand) {
                    errors.push(VerifyError::UndefinedValue {
                        function: name.clone(),
                        block: block.label.clone(),
                        value: operand.to_string(),
                    });
                }
            }
        }

        match &block.terminator {
            Terminator::Invalid => errors.push(VerifyError::MissingTerminator {
                function: name.clone(),
                block: block.label.clone(),
            }),
            Terminator::Branch { condition, .. } if !is_defined(condition) => {
                errors.push(VerifyError::UndefinedValue {
                    function: name.clone(),
                    block: block.label.clone(),
                    value: condition.to_string(),
                });
            }
            Terminator::Return(value) => {
                let returns_void = function.signature.returns == Type::Void;
                if returns_void != value.is_none() {
                    errors.push(VerifyError::ReturnMismatch {
                        function: name.clone(),
                        block: block.label.clone(),
                        expected: function.signature.returns.to_string(),
                        found: value
                            .as_ref()
                            .map_or_else(|| "void".to_string(), |v| v.to_string()),
                    });
                }
            }
            _ => {}
        }

        for target in block.successors() {
            if !body.blocks.contains_key(&target) {
                errors.push(VerifyError::InvalidBlockRef {
                    function: name.clone(),
                    block: block.label.clone(),
                    target: target.to_string(),
                });
            }
        }
    }
}
