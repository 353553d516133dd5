use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in and user types as the front end resolved them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Void,
    Int,
    Bool,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Array(Box<SourceType>, usize),
    /// A user-defined type name. The back end has no layout for these.
    Named(String),
}

impl SourceType {
    pub fn is_vector(&self) -> bool {
        matches!(self, SourceType::Vec2 | SourceType::Vec3 | SourceType::Vec4)
    }

    pub fn vector_width(&self) -> Option<u8> {
        match self {
            SourceType::Vec2 => Some(2),
            SourceType::Vec3 => Some(3),
            SourceType::Vec4 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Void => write!(f, "void"),
            SourceType::Int => write!(f, "int"),
            SourceType::Bool => write!(f, "bool"),
            SourceType::Float => write!(f, "float"),
            SourceType::Vec2 => write!(f, "vec2"),
            SourceType::Vec3 => write!(f, "vec3"),
            SourceType::Vec4 => write!(f, "vec4"),
            SourceType::Array(elem, len) => write!(f, "{}[{}]", elem, len),
            SourceType::Named(name) => write!(f, "{}", name),
        }
    }
}
