use crate::{
    block::{BasicBlock, BlockId, Terminator},
    function::{Function, FunctionBody, FunctionSignature},
    instructions::Instruction,
    types::Type,
    values::{ParamId, Value},
    IrError, Result,
};
use cranelift_codegen::ir::condcodes::{FloatCC, IntCC};

/// Builds one function body. Owns the function until [`FunctionBuilder::finish`].
pub struct FunctionBuilder {
    signature: FunctionSignature,
    body: FunctionBody,
    current_block: Option<BlockId>,
    entry_allocas: usize,
}

impl FunctionBuilder {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            body: FunctionBody::new(),
            current_block: None,
            entry_allocas: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn entry_block(&self) -> BlockId {
        self.body.entry_block
    }

    /// Creates an empty block with no incoming edges yet.
    pub fn create_block(&mut self, label_hint: &str) -> BlockId {
        self.body.create_block(label_hint)
    }

    pub fn switch_to_block(&mut self, block_id: BlockId) -> Result<()> {
        if !self.body.blocks.contains_key(&block_id) {
            return Err(IrError::BuilderError(format!(
                "Block {} does not exist in {}",
                block_id, self.signature.name
            )));
        }

        self.current_block = Some(block_id);
        Ok(())
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    pub fn block(&self, block_id: BlockId) -> Option<&BasicBlock> {
        self.body.get_block(block_id)
    }

    pub fn block_mut(&mut self, block_id: BlockId) -> Option<&mut BasicBlock> {
        self.body.get_block_mut(block_id)
    }

    /// Whether the current block already ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.current_block
            .and_then(|id| self.body.get_block(id))
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }

    pub fn ins(&mut self) -> Result<FunctionInstBuilder<'_>> {
        let block_id = self.current_block.ok_or_else(|| {
            IrError::BuilderError("No current block - call switch_to_block first".into())
        })?;

        Ok(FunctionInstBuilder {
            block_id,
            body: &mut self.body,
        })
    }

    /// Allocates a stack slot in the entry region, ahead of every non-alloca
    /// instruction of the entry block, whatever block is current.
    pub fn alloca(&mut self, name: Option<&str>, ty: Type) -> Result<Value> {
        let slot = self.body.add_slot(name.map(str::to_string), ty.clone());
        let entry = self.body.entry_block;
        let block = self
            .body
            .get_block_mut(entry)
            .ok_or_else(|| IrError::BuilderError("Entry block missing".into()))?;
        block.instructions.insert(
            self.entry_allocas,
            Instruction::Alloca {
                result: slot.clone(),
                ty,
            },
        );
        self.entry_allocas += 1;
        Ok(slot)
    }

    pub fn param(&self, index: usize) -> Option<Value> {
        self.signature.param_value(index)
    }

    /// Type of a value local to this function. Globals and function
    /// references are typed by the module.
    pub fn value_type(&self, value: &Value) -> Option<Type> {
        match value {
            Value::Temp(id) => self.body.temps.get(id).cloned(),
            Value::Param(ParamId(index)) => self
                .signature
                .params
                .get(*index as usize)
                .map(|p| p.param_type.clone()),
            Value::Slot(id) => self
                .body
                .slot(*id)
                .map(|slot| Type::pointer_to(slot.ty.clone())),
            Value::Constant(c) => Some(c.ty()),
            Value::Global(_) | Value::Function(_) => None,
        }
    }

    pub fn finish(self) -> Result<Function> {
        if let Some(block) = self.body.blocks.values().find(|b| !b.is_terminated()) {
            return Err(IrError::Unterminated {
                function: self.signature.name.clone(),
                block: block.label.clone(),
            });
        }

        Ok(Function {
            signature: self.signature,
            body: Some(self.body),
        })
    }
}

/// Appends to one block. Every append fails once the block is terminated.
pub struct FunctionInstBuilder<'a> {
    block_id: BlockId,
    body: &'a mut FunctionBody,
}

impl<'a> FunctionInstBuilder<'a> {
    pub fn iadd(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::Add {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn isub(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::Sub {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn imul(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::Mul {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn sdiv(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::SDiv {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn fadd(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::FAdd {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn fsub(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::FSub {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn fmul(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::FMul {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn fdiv(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::FDiv {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn and(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::And {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn or(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::Or {
            result: result.clone(),
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn icmp(&mut self, cond: IntCC, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.comparison_result());
        self.insert_inst(Instruction::ICmp {
            result: result.clone(),
            cond,
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn fcmp(&mut self, cond: FloatCC, left: Value, right: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.comparison_result());
        self.insert_inst(Instruction::FCmp {
            result: result.clone(),
            cond,
            left,
            right,
            ty,
        })?;
        Ok(result)
    }

    pub fn load(&mut self, ptr: Value, ty: Type) -> Result<Value> {
        let result = self.body.new_temp(ty.clone());
        self.insert_inst(Instruction::Load {
            result: result.clone(),
            ptr,
            ty,
        })?;
        Ok(result)
    }

    pub fn store(&mut self, ptr: Value, value: Value) -> Result<()> {
        self.insert_inst(Instruction::Store { ptr, value })
    }

    pub fn element_ptr(&mut self, base: Value, index: Value, elem_ty: Type) -> Result<Value> {
        let result = self.body.new_temp(Type::pointer_to(elem_ty.clone()));
        self.insert_inst(Instruction::ElementPtr {
            result: result.clone(),
            base,
            index,
            elem_ty,
        })?;
        Ok(result)
    }

    pub fn extract_element(&mut self, vector: Value, lane: u8, vector_ty: Type) -> Result<Value> {
        let elem_ty = vector_ty.element().cloned().ok_or_else(|| {
            IrError::TypeError(format!("extractelement on non-vector {}", vector_ty))
        })?;
        let result = self.body.new_temp(elem_ty);
        self.insert_inst(Instruction::ExtractElement {
            result: result.clone(),
            vector,
            lane,
            ty: vector_ty,
        })?;
        Ok(result)
    }

    pub fn insert_element(
        &mut self,
        vector: Value,
        value: Value,
        lane: u8,
        vector_ty: Type,
    ) -> Result<Value> {
        let result = self.body.new_temp(vector_ty.clone());
        self.insert_inst(Instruction::InsertElement {
            result: result.clone(),
            vector,
            value,
            lane,
            ty: vector_ty,
        })?;
        Ok(result)
    }

    /// Selects `mask` lanes of `vector` into a new vector of `mask.len()` lanes.
    pub fn shuffle(&mut self, vector: Value, mask: Vec<u8>, vector_ty: Type) -> Result<Value> {
        let elem_ty = vector_ty.element().cloned().ok_or_else(|| {
            IrError::TypeError(format!("shuffle on non-vector {}", vector_ty))
        })?;
        let result = self
            .body
            .new_temp(Type::Vector(Box::new(elem_ty), mask.len() as u8));
        self.insert_inst(Instruction::Shuffle {
            result: result.clone(),
            vector,
            mask,
            ty: vector_ty,
        })?;
        Ok(result)
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Jump(target))
    }

    pub fn branch(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn return_value(&mut self, value: Value) -> Result<()> {
        self.set_terminator(Terminator::Return(Some(value)))
    }

    pub fn return_void(&mut self) -> Result<()> {
        self.set_terminator(Terminator::Return(None))
    }

    fn current(&mut self) -> Result<&mut BasicBlock> {
        let block_id = self.block_id;
        let block = self
            .body
            .get_block_mut(block_id)
            .ok_or_else(|| IrError::BuilderError(format!("Block {} not found", block_id)))?;
        if block.is_terminated() {
            return Err(IrError::BlockTerminated(block.label.clone()));
        }
        Ok(block)
    }

    fn insert_inst(&mut self, inst: Instruction) -> Result<()> {
        self.current()?.add_instruction(inst);
        Ok(())
    }

    fn set_terminator(&mut self, term: Terminator) -> Result<()> {
        self.current()?.set_terminator(term);
        Ok(())
    }
}
