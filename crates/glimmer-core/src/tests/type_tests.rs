use crate::types::Type;
use crate::values::Constant;
use cranelift_codegen::ir::types as clif_types;
use pretty_assertions::assert_eq;

#[test]
fn test_scalar_cranelift_mapping() {
    assert_eq!(Type::Int.to_cranelift(), Some(clif_types::I32));
    assert_eq!(Type::Float.to_cranelift(), Some(clif_types::F32));
    assert_eq!(Type::Bool.to_cranelift(), Some(clif_types::I8));
    assert_eq!(Type::Void.to_cranelift(), None);
}

#[test]
fn test_vector_cranelift_mapping() {
    assert_eq!(Type::vec(4).to_cranelift(), Some(clif_types::F32X4));
    assert_eq!(Type::vec(3).to_cranelift(), None);
}

#[test]
fn test_vector_helpers() {
    let v3 = Type::vec(3);
    assert!(v3.is_vector());
    assert!(v3.is_float_like());
    assert_eq!(v3.lanes(), Some(3));
    assert_eq!(v3.element(), Some(&Type::Float));
    assert_eq!(v3.size_bytes(), 12);
    assert_eq!(v3.comparison_result(), Type::bool_vec(3));
    assert!(!Type::bool_vec(3).is_float_like());
    assert!(!Type::Int.is_float_like());
}

#[test]
fn test_type_display() {
    assert_eq!(Type::Int.to_string(), "i32");
    assert_eq!(Type::Bool.to_string(), "i1");
    assert_eq!(Type::vec(2).to_string(), "<2 x f32>");
    assert_eq!(Type::Array(Box::new(Type::Int), 8).to_string(), "[8 x i32]");
    assert_eq!(Type::pointer_to(Type::Float).to_string(), "f32*");
}

#[test]
fn test_constants() {
    assert_eq!(Constant::zero(&Type::Int), Some(Constant::Int(0)));
    assert_eq!(Constant::zero(&Type::vec(4)), Some(Constant::Zero(Type::vec(4))));
    assert_eq!(Constant::zero(&Type::Void), None);
    assert_eq!(Constant::one(&Type::Float).and_then(|c| c.as_f32()), Some(1.0));
    assert_eq!(Constant::float(-2.5).to_string(), "-2.5");
    assert_eq!(Constant::float(1.0).ty(), Type::Float);
}
