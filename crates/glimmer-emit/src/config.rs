use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub indent_style: IndentStyle,
    /// Print operand types on instructions.
    pub include_types: bool,
    pub verbosity: VerbosityLevel,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            indent_style: IndentStyle::Spaces(4),
            include_types: true,
            verbosity: VerbosityLevel::Normal,
        }
    }
}

impl EmitterConfig {
    /// Uncolored output, for files and snapshot comparisons.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
}

impl VerbosityLevel {
    /// Module name, target and data layout comments.
    pub fn should_print_header(&self) -> bool {
        !matches!(self, VerbosityLevel::Quiet)
    }

    /// Source names of stack slots.
    pub fn should_print_slot_names(&self) -> bool {
        !matches!(self, VerbosityLevel::Quiet)
    }

    /// Predecessors and loop metadata next to block labels.
    pub fn should_print_block_info(&self) -> bool {
        matches!(self, VerbosityLevel::Verbose)
    }
}
