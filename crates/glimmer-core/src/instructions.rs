use crate::types::Type;
use crate::values::Value;
use cranelift_codegen::ir::condcodes::{FloatCC, IntCC};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Add {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Sub {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Mul {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    SDiv {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    FAdd {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    FSub {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    FMul {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    FDiv {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    And {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Or {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    ICmp {
        result: Value,
        cond: IntCC,
        left: Value,
        right: Value,
        ty: Type,
    },
    /// Float comparison. Only ordered predicates are produced by lowering.
    FCmp {
        result: Value,
        cond: FloatCC,
        left: Value,
        right: Value,
        ty: Type,
    },

    Alloca {
        result: Value,
        ty: Type,
    },
    Load {
        result: Value,
        ptr: Value,
        ty: Type,
    },
    Store {
        ptr: Value,
        value: Value,
    },
    /// Address of element `index` inside the aggregate `base` points to.
    ElementPtr {
        result: Value,
        base: Value,
        index: Value,
        elem_ty: Type,
    },

    ExtractElement {
        result: Value,
        vector: Value,
        lane: u8,
        ty: Type,
    },
    InsertElement {
        result: Value,
        vector: Value,
        value: Value,
        lane: u8,
        ty: Type,
    },
    Shuffle {
        result: Value,
        vector: Value,
        mask: Vec<u8>,
        ty: Type,
    },
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Add { result, .. }
            | Instruction::Sub { result, .. }
            | Instruction::Mul { result, .. }
            | Instruction::SDiv { result, .. }
            | Instruction::FAdd { result, .. }
            | Instruction::FSub { result, .. }
            | Instruction::FMul { result, .. }
            | Instruction::FDiv { result, .. }
            | Instruction::And { result, .. }
            | Instruction::Or { result, .. }
            | Instruction::ICmp { result, .. }
            | Instruction::FCmp { result, .. }
            | Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::ElementPtr { result, .. }
            | Instruction::ExtractElement { result, .. }
            | Instruction::InsertElement { result, .. }
            | Instruction::Shuffle { result, .. } => Some(result),
            Instruction::Store { .. } => None,
        }
    }

    /// Operand type the instruction works on. Stores have none of their own.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Instruction::Add { ty, .. }
            | Instruction::Sub { ty, .. }
            | Instruction::Mul { ty, .. }
            | Instruction::SDiv { ty, .. }
            | Instruction::FAdd { ty, .. }
            | Instruction::FSub { ty, .. }
            | Instruction::FMul { ty, .. }
            | Instruction::FDiv { ty, .. }
            | Instruction::And { ty, .. }
            | Instruction::Or { ty, .. }
            | Instruction::ICmp { ty, .. }
            | Instruction::FCmp { ty, .. }
            | Instruction::Alloca { ty, .. }
            | Instruction::Load { ty, .. }
            | Instruction::ExtractElement { ty, .. }
            | Instruction::InsertElement { ty, .. }
            | Instruction::Shuffle { ty, .. } => Some(ty),
            Instruction::ElementPtr { elem_ty, .. } => Some(elem_ty),
            Instruction::Store { .. } => None,
        }
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Add { .. } => "add",
            Instruction::Sub { .. } => "sub",
            Instruction::Mul { .. } => "mul",
            Instruction::SDiv { .. } => "sdiv",
            Instruction::FAdd { .. } => "fadd",
            Instruction::FSub { .. } => "fsub",
            Instruction::FMul { .. } => "fmul",
            Instruction::FDiv { .. } => "fdiv",
            Instruction::And { .. } => "and",
            Instruction::Or { .. } => "or",
            Instruction::ICmp { .. } => "icmp",
            Instruction::FCmp { .. } => "fcmp",
            Instruction::Alloca { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::ElementPtr { .. } => "elementptr",
            Instruction::ExtractElement { .. } => "extractelement",
            Instruction::InsertElement { .. } => "insertelement",
            Instruction::Shuffle { .. } => "shuffle",
        }
    }

    /// Values read by the instruction, in operand order.
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Add { left, right, .. }
            | Instruction::Sub { left, right, .. }
            | Instruction::Mul { left, right, .. }
            | Instruction::SDiv { left, right, .. }
            | Instruction::FAdd { left, right, .. }
            | Instruction::FSub { left, right, .. }
            | Instruction::FMul { left, right, .. }
            | Instruction::FDiv { left, right, .. }
            | Instruction::And { left, right, .. }
            | Instruction::Or { left, right, .. }
            | Instruction::ICmp { left, right, .. }
            | Instruction::FCmp { left, right, .. } => vec![left, right],
            Instruction::Alloca { .. } => vec![],
            Instruction::Load { ptr, .. } => vec![ptr],
            Instruction::Store { ptr, value } => vec![ptr, value],
            Instruction::ElementPtr { base, index, .. } => vec![base, index],
            Instruction::ExtractElement { vector, .. } | Instruction::Shuffle { vector, .. } => {
                vec![vector]
            }
            Instruction::InsertElement { vector, value, .. } => vec![vector, value],
        }
    }

    /// Condition code mnemonic for comparisons.
    pub fn predicate(&self) -> Option<String> {
        match self {
            Instruction::ICmp { cond, .. } => Some(cond.to_string()),
            Instruction::FCmp { cond, .. } => Some(cond.to_string()),
            _ => None,
        }
    }

    pub fn is_alloca(&self) -> bool {
        matches!(self, Instruction::Alloca { .. })
    }

    pub fn is_memory_op(&self) -> bool {
        matches!(
            self,
            Instruction::Alloca { .. } | Instruction::Load { .. } | Instruction::Store { .. }
        )
    }

    pub fn is_float_arith(&self) -> bool {
        matches!(
            self,
            Instruction::FAdd { .. }
                | Instruction::FSub { .. }
                | Instruction::FMul { .. }
                | Instruction::FDiv { .. }
        )
    }
}
