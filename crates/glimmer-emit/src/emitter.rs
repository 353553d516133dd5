use crate::config::EmitterConfig;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

pub type EmitResult = Result<()>;

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_unit: String,
    pub use_colors: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_unit: "    ".to_string(),
            use_colors: false,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            indent_level: 0,
            indent_unit: config.indent_style.unit(),
            use_colors: config.use_colors,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn current_indent(&self) -> String {
        self.indent_unit.repeat(self.indent_level)
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Emitter {
    type Item;

    fn emit<W: Write>(
        &self,
        item: &Self::Item,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult;

    /// Context a fresh emission starts from.
    fn context(&self) -> EmitContext {
        EmitContext::new()
    }

    fn emit_to_string(&self, item: &Self::Item) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = self.context();
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Roles a piece of output can be highlighted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Keyword,
    Label,
    Comment,
    Plain,
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn paint(context: &EmitContext, text: &str, tone: Tone) -> String {
        if !context.use_colors {
            return text.to_string();
        }
        match tone {
            Tone::Keyword => text.magenta().bold().to_string(),
            Tone::Label => text.cyan().to_string(),
            Tone::Comment => text.green().to_string(),
            Tone::Plain => text.to_string(),
        }
    }

    pub fn write_line<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        writeln!(writer, "{}{}", context.current_indent(), text)?;
        Ok(())
    }

    pub fn write_comment<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        comment: &str,
    ) -> EmitResult {
        let text = Self::paint(context, &format!("; {}", comment), Tone::Comment);
        Self::write_line(writer, context, &text)
    }

    /// Writes `header {`, the indented body, then `}`.
    pub fn write_block<W: Write, F>(
        writer: &mut W,
        context: &mut EmitContext,
        header: &str,
        body: F,
    ) -> EmitResult
    where
        F: FnOnce(&mut W, &mut EmitContext) -> EmitResult,
    {
        Self::write_line(writer, context, &format!("{} {{", header))?;
        context.indent();
        let result = body(writer, context);
        context.dedent();
        result?;
        Self::write_line(writer, context, "}")
    }
}
