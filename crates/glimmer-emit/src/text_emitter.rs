use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Tone};
use glimmer_core::{
    BasicBlock, BlockId, ControlFlowGraph, Function, FunctionBody, GlobalVariable, Instruction,
    Module, Terminator, Type, Value,
};
use std::io::Write;

/// Writes a module as LLVM-flavoured text.
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit_header<W: Write>(&self, module: &Module, writer: &mut W, ctx: &EmitContext) -> EmitResult {
        if !self.config.verbosity.should_print_header() {
            return Ok(());
        }
        EmitHelper::write_comment(writer, ctx, &format!("module {}", module.name))?;
        EmitHelper::write_comment(writer, ctx, &format!("target {}", module.target.triple))?;
        EmitHelper::write_comment(writer, ctx, &format!("datalayout {}", module.target.data_layout))?;
        writeln!(writer)?;
        Ok(())
    }

    fn emit_global<W: Write>(
        &self,
        global: &GlobalVariable,
        writer: &mut W,
        ctx: &EmitContext,
    ) -> EmitResult {
        let keyword = if global.is_constant { "constant" } else { "global" };
        let line = format!(
            "{} {} {}: {} = {}",
            EmitHelper::paint(ctx, keyword, Tone::Keyword),
            Value::Global(global.id),
            global.name,
            global.ty,
            global.initializer
        );
        EmitHelper::write_line(writer, ctx, &line)
    }

    /// A bodiless function prints as a one-line `declare`.
    pub fn emit_function<W: Write>(
        &self,
        function: &Function,
        writer: &mut W,
        ctx: &mut EmitContext,
    ) -> EmitResult {
        let signature = format_signature(function);
        match &function.body {
            None => {
                let keyword = EmitHelper::paint(ctx, "declare", Tone::Keyword);
                EmitHelper::write_line(writer, ctx, &format!("{} {}", keyword, signature))
            }
            Some(body) => {
                let keyword = EmitHelper::paint(ctx, "define", Tone::Keyword);
                EmitHelper::write_block(writer, ctx, &format!("{} {}", keyword, signature), |w, c| {
                    self.emit_body(body, w, c)
                })
            }
        }
    }

    fn emit_body<W: Write>(&self, body: &FunctionBody, writer: &mut W, ctx: &mut EmitContext) -> EmitResult {
        let cfg = self
            .config
            .verbosity
            .should_print_block_info()
            .then(|| ControlFlowGraph::from_body(body));

        for (index, block) in body.blocks.values().enumerate() {
            if index > 0 {
                writeln!(writer)?;
            }

            // Labels sit one level left of the instructions they head.
            let mut label_ctx = ctx.clone();
            label_ctx.dedent();
            let label = self.block_label(block, body, cfg.as_ref(), ctx);
            EmitHelper::write_line(writer, &label_ctx, &label)?;

            for inst in &block.instructions {
                let mut text = format_instruction(inst, self.config.include_types);
                if let Some(name) = self.slot_name(inst, body) {
                    text.push_str(&EmitHelper::paint(ctx, &format!("  ; {}", name), Tone::Comment));
                }
                EmitHelper::write_line(writer, ctx, &text)?;
            }

            let terminator = format_terminator(&block.terminator, body);
            EmitHelper::write_line(writer, ctx, &EmitHelper::paint(ctx, &terminator, Tone::Keyword))?;
        }
        Ok(())
    }

    fn block_label(
        &self,
        block: &BasicBlock,
        body: &FunctionBody,
        cfg: Option<&ControlFlowGraph>,
        ctx: &EmitContext,
    ) -> String {
        let mut label = EmitHelper::paint(ctx, &format!("{}:", block.label), Tone::Label);
        let Some(cfg) = cfg else {
            return label;
        };

        let mut notes = Vec::new();
        let preds = cfg.predecessors(block.id);
        if !preds.is_empty() {
            let names: Vec<&str> = preds.iter().map(|id| label_of(body, *id)).collect();
            notes.push(format!("preds: {}", names.join(", ")));
        } else if block.id != body.entry_block {
            notes.push("unreachable".to_string());
        }
        if block.metadata.is_loop_header {
            notes.push("loop header".to_string());
        }
        if block.metadata.is_loop_exit {
            notes.push("loop exit".to_string());
        }
        if block.metadata.loop_depth > 0 {
            notes.push(format!("depth {}", block.metadata.loop_depth));
        }

        if !notes.is_empty() {
            label.push_str(&EmitHelper::paint(
                ctx,
                &format!("  ; {}", notes.join(", ")),
                Tone::Comment,
            ));
        }
        label
    }

    fn slot_name<'b>(&self, inst: &Instruction, body: &'b FunctionBody) -> Option<&'b str> {
        if !self.config.verbosity.should_print_slot_names() {
            return None;
        }
        match inst {
            Instruction::Alloca {
                result: Value::Slot(id),
                ..
            } => body.slot(*id).and_then(|slot| slot.name.as_deref()),
            _ => None,
        }
    }
}

impl Default for TextEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for TextEmitter {
    type Item = Module;

    fn emit<W: Write>(&self, module: &Module, writer: &mut W, context: &mut EmitContext) -> EmitResult {
        self.emit_header(module, writer, context)?;

        for global in module.globals.values() {
            self.emit_global(global, writer, context)?;
        }

        for (index, function) in module.functions.values().enumerate() {
            if index > 0 || !module.globals.is_empty() {
                writeln!(writer)?;
            }
            self.emit_function(function, writer, context)?;
        }
        Ok(())
    }

    fn context(&self) -> EmitContext {
        EmitContext::from_config(&self.config)
    }
}

fn label_of(body: &FunctionBody, id: BlockId) -> &str {
    body.get_block(id).map_or("<missing>", |b| b.label.as_str())
}

fn format_signature(function: &Function) -> String {
    let params: Vec<String> = function
        .signature
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| format!("{} %p{}", param.param_type, i))
        .collect();
    format!(
        "{} @{}({})",
        function.signature.returns,
        function.name(),
        params.join(", ")
    )
}

fn format_terminator(terminator: &Terminator, body: &FunctionBody) -> String {
    match terminator {
        Terminator::Jump(target) => format!("jump {}", label_of(body, *target)),
        Terminator::Branch {
            condition,
            then_block,
            else_block,
        } => format!(
            "br {}, {}, {}",
            condition,
            label_of(body, *then_block),
            label_of(body, *else_block)
        ),
        Terminator::Return(Some(value)) => format!("return {}", value),
        Terminator::Return(None) => "return".to_string(),
        Terminator::Invalid => terminator.mnemonic().to_string(),
    }
}

/// One instruction in `%result = opcode [predicate] [type] operands` form.
pub fn format_instruction(inst: &Instruction, include_types: bool) -> String {
    let mut text = String::new();
    if let Some(result) = inst.result() {
        text.push_str(&format!("{} = ", result));
    }
    text.push_str(inst.opcode());
    if let Some(predicate) = inst.predicate() {
        text.push(' ');
        text.push_str(&predicate);
    }
    if include_types {
        if let Some(ty) = instruction_type(inst) {
            text.push_str(&format!(" {}", ty));
        }
    }

    let operands = match inst {
        // Value first, then the address written to.
        Instruction::Store { ptr, value } => format!("{}, {}", value, ptr),
        Instruction::ExtractElement { vector, lane, .. } => format!("{}, {}", vector, lane),
        Instruction::InsertElement {
            vector,
            value,
            lane,
            ..
        } => format!("{}, {}, {}", vector, value, lane),
        Instruction::Shuffle { vector, mask, .. } => {
            let lanes: Vec<String> = mask.iter().map(u8::to_string).collect();
            format!("{}, [{}]", vector, lanes.join(", "))
        }
        other => other
            .operands()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    };
    if !operands.is_empty() {
        text.push(' ');
        text.push_str(&operands);
    }
    text
}

/// The type printed after the opcode. Loads and element addresses print the
/// type they produce, so a following comma separates it from the address.
fn instruction_type(inst: &Instruction) -> Option<String> {
    match inst {
        Instruction::Load { ty, .. } | Instruction::ElementPtr { elem_ty: ty, .. } => {
            Some(format!("{},", ty))
        }
        Instruction::Store { .. } => None,
        other => other.ty().map(Type::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::{FloatCC, SlotId, TempId};
    use pretty_assertions::assert_eq;

    fn temp(n: u32) -> Value {
        Value::Temp(TempId(n))
    }

    #[test]
    fn test_format_memory_instructions() {
        let slot = Value::Slot(SlotId(0));
        assert_eq!(
            format_instruction(&Instruction::Alloca { result: slot.clone(), ty: Type::Int }, true),
            "%slot0 = alloca i32"
        );
        assert_eq!(
            format_instruction(
                &Instruction::Load { result: temp(0), ptr: slot.clone(), ty: Type::Int },
                true
            ),
            "%t0 = load i32, %slot0"
        );
        assert_eq!(
            format_instruction(&Instruction::Store { ptr: slot, value: temp(0) }, true),
            "store %t0, %slot0"
        );
    }

    #[test]
    fn test_format_lane_instructions() {
        let vec4 = Type::vec(4);
        assert_eq!(
            format_instruction(
                &Instruction::InsertElement {
                    result: temp(2),
                    vector: temp(1),
                    value: Value::float(1.0),
                    lane: 3,
                    ty: vec4.clone(),
                },
                true
            ),
            "%t2 = insertelement <4 x f32> %t1, 1.0, 3"
        );
        assert_eq!(
            format_instruction(
                &Instruction::Shuffle {
                    result: temp(3),
                    vector: temp(2),
                    mask: vec![2, 1],
                    ty: vec4,
                },
                false
            ),
            "%t3 = shuffle %t2, [2, 1]"
        );
    }

    #[test]
    fn test_format_comparison_has_predicate() {
        let inst = Instruction::FCmp {
            result: temp(1),
            cond: FloatCC::LessThan,
            left: temp(0),
            right: Value::float(0.5),
            ty: Type::Float,
        };
        assert_eq!(
            format_instruction(&inst, true),
            format!("%t1 = fcmp {} f32 %t0, 0.5", FloatCC::LessThan)
        );
    }
}
