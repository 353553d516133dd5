use crate::errors::{LowerError, Result};
use glimmer_ast::SourceType;
use glimmer_core::{Constant, Type, Value};

/// Maps front-end types onto IR types.
pub struct TypeLowering;

impl TypeLowering {
    /// Type of a storable value. `void` and user types have no mapping.
    pub fn lower(ty: &SourceType) -> Result<Type> {
        match ty {
            SourceType::Int => Ok(Type::Int),
            SourceType::Bool => Ok(Type::Bool),
            SourceType::Float => Ok(Type::Float),
            SourceType::Vec2 | SourceType::Vec3 | SourceType::Vec4 => {
                let lanes = ty
                    .vector_width()
                    .ok_or_else(|| LowerError::UnmappableType(ty.to_string()))?;
                Ok(Type::vec(lanes))
            }
            SourceType::Array(elem, len) => Ok(Type::Array(Box::new(Self::lower(elem)?), *len)),
            SourceType::Void | SourceType::Named(_) => {
                Err(LowerError::UnmappableType(ty.to_string()))
            }
        }
    }

    /// Like [`TypeLowering::lower`], but `void` is allowed.
    pub fn lower_return(ty: &SourceType) -> Result<Type> {
        match ty {
            SourceType::Void => Ok(Type::Void),
            other => Self::lower(other),
        }
    }

    pub fn zero_value(ty: &Type) -> Result<Value> {
        Constant::zero(ty)
            .map(Value::Constant)
            .ok_or_else(|| LowerError::UnmappableType(format!("zero value of {}", ty)))
    }
}
