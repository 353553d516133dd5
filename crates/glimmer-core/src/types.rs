use cranelift_codegen::ir::types as clif_types;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 32-bit IEEE float.
    Float,
    /// Fixed-width vector. Value vectors hold floats; comparisons yield bool lanes.
    Vector(Box<Type>, u8),
    Array(Box<Type>, usize),
    Pointer(Box<Type>),
    Function(Box<FunctionType>),
}

impl Type {
    pub fn vec(lanes: u8) -> Self {
        Type::Vector(Box::new(Type::Float), lanes)
    }

    pub fn bool_vec(lanes: u8) -> Self {
        Type::Vector(Box::new(Type::Bool), lanes)
    }

    pub fn pointer_to(pointee: Type) -> Self {
        Type::Pointer(Box::new(pointee))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Type::Vector(..))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float)
    }

    /// Floats and float vectors: the operands that select `f*` instructions.
    pub fn is_float_like(&self) -> bool {
        match self {
            Type::Float => true,
            Type::Vector(elem, _) => elem.is_float(),
            _ => false,
        }
    }

    pub fn lanes(&self) -> Option<u8> {
        match self {
            Type::Vector(_, lanes) => Some(*lanes),
            _ => None,
        }
    }

    /// Element type of a vector or array.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Vector(elem, _) | Type::Array(elem, _) => Some(elem),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The type a comparison of two values of this type produces.
    pub fn comparison_result(&self) -> Type {
        match self {
            Type::Vector(_, lanes) => Type::bool_vec(*lanes),
            _ => Type::Bool,
        }
    }

    /// Native machine type for backends built on cranelift. Shapes with no native
    /// register class (3-lane vectors, aggregates) map to `None`.
    pub fn to_cranelift(&self) -> Option<clif_types::Type> {
        match self {
            Type::Bool => Some(clif_types::I8),
            Type::Int => Some(clif_types::I32),
            Type::Float => Some(clif_types::F32),
            Type::Pointer(_) | Type::Function(_) => Some(clif_types::I64),
            Type::Vector(elem, lanes) => elem.to_cranelift()?.by(u32::from(*lanes)),
            Type::Void | Type::Array(..) => None,
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Type::Void => 0,
            Type::Bool => 1,
            Type::Int | Type::Float => 4,
            Type::Vector(elem, lanes) => elem.size_bytes() * *lanes as usize,
            Type::Array(elem, len) => elem.size_bytes() * len,
            Type::Pointer(_) | Type::Function(_) => 8,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "i1"),
            Type::Int => write!(f, "i32"),
            Type::Float => write!(f, "f32"),
            Type::Vector(elem, lanes) => write!(f, "<{} x {}>", lanes, elem),
            Type::Array(elem, len) => write!(f, "[{} x {}]", len, elem),
            Type::Pointer(inner) => write!(f, "{}*", inner),
            Type::Function(ft) => write!(f, "{}", ft),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub returns: Type,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.returns)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}
