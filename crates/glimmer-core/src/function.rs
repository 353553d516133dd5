use crate::block::{BasicBlock, BlockId};
use crate::types::{FunctionType, Type};
use crate::values::{ParamId, SlotId, TempId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
    /// `None` for a declaration without a body.
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: Some(FunctionBody::new()),
        }
    }

    pub fn declaration(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.body.iter().flat_map(|body| body.blocks.values())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Type,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, returns: Type) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    pub fn function_type(&self) -> FunctionType {
        FunctionType {
            params: self.params.iter().map(|p| p.param_type.clone()).collect(),
            returns: self.returns.clone(),
        }
    }

    pub fn param_value(&self, index: usize) -> Option<Value> {
        (index < self.params.len()).then(|| Value::Param(ParamId(index as u32)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: Type) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub entry_block: BlockId,
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub slots: Vec<StackSlot>,
    pub temps: IndexMap<TempId, Type>,
    next_block_id: u32,
    next_temp_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block, "entry"));

        Self {
            entry_block,
            blocks,
            slots: Vec::new(),
            temps: IndexMap::new(),
            next_block_id: 1,
            next_temp_id: 0,
        }
    }

    /// Appends a block. The label hint gets the block number as suffix, `then.3`.
    pub fn create_block(&mut self, label_hint: &str) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        let label = format!("{}.{}", label_hint, id.0);
        self.blocks.insert(id, BasicBlock::new(id, label));
        id
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    /// First block whose label starts with `prefix`, in creation order.
    pub fn block_by_label(&self, prefix: &str) -> Option<&BasicBlock> {
        self.blocks.values().find(|b| b.label.starts_with(prefix))
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }

    pub fn new_temp(&mut self, ty: Type) -> Value {
        let id = TempId(self.next_temp_id);
        self.next_temp_id += 1;
        self.temps.insert(id, ty);
        Value::Temp(id)
    }

    pub fn add_slot(&mut self, name: Option<String>, ty: Type) -> Value {
        let id = SlotId(self.slots.len() as u32);
        self.slots.push(StackSlot { id, name, ty });
        Value::Slot(id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&StackSlot> {
        self.slots.get(id.0 as usize)
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}

/// A function-local storage slot, allocated in the entry block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSlot {
    pub id: SlotId,
    pub name: Option<String>,
    pub ty: Type,
}
