use glimmer_core::{module::DEFAULT_DATA_LAYOUT, TargetInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringConfig {
    pub module_name: String,
    pub target_triple: String,
    pub data_layout: String,
    pub logical_ops: LogicalOps,
    pub implicit_return: ImplicitReturn,
    /// Run the IR verifier on the finished module.
    pub verify: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        let target = TargetInfo::default();
        Self {
            module_name: "main".to_string(),
            target_triple: target.triple,
            data_layout: DEFAULT_DATA_LAYOUT.to_string(),
            logical_ops: LogicalOps::Eager,
            implicit_return: ImplicitReturn::ZeroValue,
            verify: true,
        }
    }
}

impl LoweringConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn target(&self) -> TargetInfo {
        TargetInfo {
            triple: self.target_triple.clone(),
            data_layout: self.data_layout.clone(),
        }
    }
}

/// How `&&` and `||` are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOps {
    /// Both operands are always evaluated, then combined with `and`/`or`.
    Eager,
    /// The right operand is only evaluated when the left does not decide the result.
    ShortCircuit,
}

/// What a non-void function does when control reaches the end of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitReturn {
    /// Return the zero value of the return type.
    ZeroValue,
    /// Report a reachable fall-through as an error.
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(LoweringConfig::from_json("{}").unwrap(), LoweringConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = LoweringConfig::from_json(
            r#"{"logical_ops": "short_circuit", "module_name": "frag"}"#,
        )
        .unwrap();
        assert_eq!(config.logical_ops, LogicalOps::ShortCircuit);
        assert_eq!(config.module_name, "frag");
        assert_eq!(config.implicit_return, ImplicitReturn::ZeroValue);
        assert!(config.verify);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(LoweringConfig::from_json(r#"{"implicit_return": "panic"}"#).is_err());
    }
}
