use crate::types::Type;
use serde::{Deserialize, Serialize};

/// An operand. Temps are typed virtual registers, slots and globals are addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Temp(TempId),
    Param(ParamId),
    Slot(SlotId),
    Global(GlobalId),
    Function(String),
    Constant(Constant),
}

impl Value {
    pub fn int(value: i32) -> Self {
        Value::Constant(Constant::Int(value))
    }

    pub fn float(value: f32) -> Self {
        Value::Constant(Constant::float(value))
    }

    pub fn bool(value: bool) -> Self {
        Value::Constant(Constant::Bool(value))
    }

    pub fn undef(ty: Type) -> Self {
        Value::Constant(Constant::Undef(ty))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(id) => Some(*id),
            _ => None,
        }
    }

    /// Storage addresses, as opposed to materialized values.
    pub fn is_address(&self) -> bool {
        matches!(self, Value::Slot(_) | Value::Global(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Temp(id) => write!(f, "%{}", id),
            Value::Param(id) => write!(f, "%{}", id),
            Value::Slot(id) => write!(f, "%{}", id),
            Value::Global(id) => write!(f, "@{}", id),
            Value::Function(name) => write!(f, "@{}", name),
            Value::Constant(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Compile-time constants. Floats keep their bit pattern so constants stay `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Bool(bool),
    Int(i32),
    Float(u32),
    Zero(Type),
    Undef(Type),
}

impl Constant {
    pub fn float(value: f32) -> Self {
        Constant::Float(value.to_bits())
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Constant::Float(bits) => Some(f32::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Constant::Int(value) => Some(*value),
            Constant::Bool(b) => Some(i32::from(*b)),
            _ => None,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Constant::Bool(_) => Type::Bool,
            Constant::Int(_) => Type::Int,
            Constant::Float(_) => Type::Float,
            Constant::Zero(ty) | Constant::Undef(ty) => ty.clone(),
        }
    }

    pub fn zero(ty: &Type) -> Option<Self> {
        match ty {
            Type::Bool => Some(Constant::Bool(false)),
            Type::Int => Some(Constant::Int(0)),
            Type::Float => Some(Constant::float(0.0)),
            Type::Vector(..) | Type::Array(..) => Some(Constant::Zero(ty.clone())),
            Type::Void | Type::Pointer(_) | Type::Function(_) => None,
        }
    }

    pub fn one(ty: &Type) -> Option<Self> {
        match ty {
            Type::Bool => Some(Constant::Bool(true)),
            Type::Int => Some(Constant::Int(1)),
            Type::Float => Some(Constant::float(1.0)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Float(bits) => write!(f, "{:?}", f32::from_bits(*bits)),
            Constant::Zero(_) => write!(f, "zeroinitializer"),
            Constant::Undef(_) => write!(f, "undef"),
        }
    }
}
