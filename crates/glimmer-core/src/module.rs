use crate::function::Function;
use crate::types::Type;
use crate::values::{Constant, GlobalId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A compilation unit: module-level storage plus functions, both in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub target: TargetInfo,
    pub globals: IndexMap<String, GlobalVariable>,
    pub functions: IndexMap<String, Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: TargetInfo::default(),
            globals: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    pub fn with_target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.get(name)
    }

    pub fn global(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.get_index(id.0 as usize).map(|(_, global)| global)
    }

    /// Serializes the module as JSON for downstream tools.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Functions that have a body.
    pub fn definitions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| !f.is_declaration())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub triple: String,
    pub data_layout: String,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            triple: "x86_64-unknown-linux-gnu".to_string(),
            data_layout: DEFAULT_DATA_LAYOUT.to_string(),
        }
    }
}

/// 64-bit little-endian layout with 128-bit vector alignment.
pub const DEFAULT_DATA_LAYOUT: &str = "e-p:64:64:64-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:64:64-f32:32:32-f64:64:64-v64:64:64-v128:128:128-a0:0:64-s0:64:64-f80:128:128-n8:16:32:64-S128";

/// Module-level mutable storage. Its address is `Value::Global(id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: GlobalId,
    pub name: String,
    pub ty: Type,
    pub initializer: Constant,
    pub is_constant: bool,
}
