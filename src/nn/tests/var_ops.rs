/*
 * @Description  : Var 运算与运行期节点测试
 */

use crate::nn::{GradNode, GraphError, Init, OpKind, Parameter, Var};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_binary_ops_record_operands_in_order() {
    let a = Var::input(&Tensor::new(&[1., 2.], &[1, 2]));
    let b = Var::constant(&Tensor::new(&[3., 4.], &[1, 2]));

    let c = a.try_sub(&b).unwrap();
    assert_eq!(c.value(), &Tensor::new(&[-2., -2.], &[1, 2]));

    let GradNode::Op(op) = c.node() else {
        panic!("应为算子节点");
    };
    assert_eq!(op.kind(), OpKind::Sub);
    assert_eq!(op.shape(), &[1, 2]);
    assert!(op.operands()[0].same_node(a.node()));
    assert!(op.operands()[1].same_node(b.node()));
}

#[test]
fn test_values_are_eager() {
    let x = Var::input(&Tensor::new(&[-1., 0., 2.], &[3]));
    assert_eq!(x.relu().value(), &Tensor::new(&[0., 0., 2.], &[3]));
    assert_eq!(x.neg().value(), &Tensor::new(&[1., -0., -2.], &[3]));
    assert_eq!(x.scale(2.0).value(), &Tensor::new(&[-2., 0., 4.], &[3]));
    assert_abs_diff_eq!(x.sigmoid().value().data_as_slice()[1], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(
        x.tanh().value().data_as_slice()[2],
        2f32.tanh(),
        epsilon = 1e-6
    );

    let y = x.try_mul(&x).unwrap();
    assert_eq!(y.value(), &Tensor::new(&[1., 0., 4.], &[3]));
}

#[test]
fn test_broadcast_and_mismatch() {
    let x = Var::input(&Tensor::ones(&[2, 3]));
    let b = Var::constant(&Tensor::new(&[1., 2., 3.], &[1, 3]));
    assert_eq!(x.try_add(&b).unwrap().shape(), &[2, 3]);

    let bad = Var::constant(&Tensor::ones(&[2, 2]));
    assert!(matches!(x.try_add(&bad), Err(GraphError::Tensor(_))));
    assert!(matches!(x.matmul(&bad), Err(GraphError::Tensor(_))));
}

#[test]
fn test_parameter_identity() {
    let p = Parameter::new(Tensor::ones(&[2, 2]));
    let q = Parameter::new(Tensor::ones(&[2, 2]));
    assert!(p.ptr_eq(&p.clone()));
    assert!(!p.ptr_eq(&q));
    assert_ne!(p.key(), q.key());

    // 同一参数的两次 var() 指向同一个节点
    assert!(p.var().node().same_node(p.clone().var().node()));
    assert!(!p.var().node().same_node(q.var().node()));
    // 两次 Var::input 是两个不同的输入
    let t = Tensor::ones(&[1]);
    assert!(!Var::input(&t).node().same_node(Var::input(&t).node()));
}

#[test]
fn test_parameter_set_value() {
    let p = Parameter::new(Tensor::zeros(&[2]));
    p.set_value(Tensor::new(&[1., 2.], &[2])).unwrap();
    assert_eq!(p.value(), Tensor::new(&[1., 2.], &[2]));
    assert!(matches!(
        p.set_value(Tensor::zeros(&[3])),
        Err(GraphError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_item() {
    assert_abs_diff_eq!(Var::input(&Tensor::scalar(3.5)).item().unwrap(), 3.5);
    assert!(Var::input(&Tensor::ones(&[2])).item().is_err());
}

#[test]
fn test_init_seeded_is_deterministic() {
    let a = Init::Kaiming.generate_with_rng(&[4, 3], &mut StdRng::seed_from_u64(9));
    let b = Init::Kaiming.generate_with_rng(&[4, 3], &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
    assert_eq!(Init::Constant(2.0).generate(&[2]), Tensor::new(&[2., 2.], &[2]));
    assert_eq!(Init::Zeros.generate(&[3]), Tensor::zeros(&[3]));
}
