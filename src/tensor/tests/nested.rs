use crate::tensor::{NestedArray, Tensor};
use serde_json::json;

#[test]
fn test_to_nested_matrix() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.to_nested(), json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
}

#[test]
fn test_to_nested_scalar_and_vector() {
    assert_eq!(Tensor::scalar(0.5).to_nested(), json!(0.5));
    assert_eq!(Tensor::new(&[1., 2.], &[2]).to_nested(), json!([1.0, 2.0]));
}

#[test]
fn test_to_nested_3d() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 1, 2]);
    assert_eq!(tensor.to_nested(), json!([[[1.0, 2.0]], [[3.0, 4.0]]]));
}

#[test]
fn test_nested_array_serializes_as_literal_sequence() {
    let arr = NestedArray(Tensor::new(&[1., 2.], &[1, 2]).squeeze());
    assert_eq!(serde_json::to_string(&arr).unwrap(), "[1.0,2.0]");
}
