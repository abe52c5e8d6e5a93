use crate::tensor::Tensor;

#[test]
fn test_compare_shapes_with_diff_shapes() {
    let tensor1 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[4]);
    assert!(!tensor1.is_same_shape(&tensor2));

    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    assert!(tensor1.is_same_shape(&tensor2));
}

#[test]
fn test_try_new_with_wrong_len() {
    let result = Tensor::try_new(&[1., 2., 3.], &[2, 2]);
    assert!(result.is_err());
}

#[test]
fn test_squeeze() {
    let tensor = Tensor::new(&[1., 2., 3.], &[1, 3, 1]);
    assert_eq!(tensor.squeeze().shape(), &[3]);

    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 1, 3]);
    let squeezed = tensor.squeeze();
    assert_eq!(squeezed.shape(), &[2, 3]);
    assert_eq!(squeezed.data_as_slice(), vec![1., 2., 3., 4., 5., 6.]);

    // 单元素张量被压成0阶
    let tensor = Tensor::new(&[7.], &[1, 1]);
    let squeezed = tensor.squeeze();
    assert_eq!(squeezed.dimension(), 0);
    assert_eq!(squeezed.number(), Some(7.));
}

#[test]
fn test_can_broadcast_with() {
    let a = Tensor::zeros(&[3, 4]);
    assert!(a.can_broadcast_with(&Tensor::zeros(&[1, 4])));
    assert!(a.can_broadcast_with(&Tensor::zeros(&[4])));
    assert!(!a.can_broadcast_with(&Tensor::zeros(&[3])));
}
