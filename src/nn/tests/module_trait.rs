/*
 * @Description  : Module trait 单元测试
 *
 * 测试 Module trait 的核心功能：
 * - parameters() 递归收集并按身份去重
 * - num_params() 参数数量统计
 * - subtype() 类型名
 * - call() 触发钩子并记录运算所属模块
 */

use super::models::{SharedParent, TiedPair};
use crate::nn::{GradNode, Linear, Module, NodeKey, ReLU, Sequential, Var};
use crate::tensor::Tensor;
use std::rc::Rc;

/// 测试 Linear 层实现 Module trait
#[test]
fn test_linear_implements_module() {
    let fc = Linear::new_seeded(10, 5, true, 42);

    let params = fc.parameters();
    assert_eq!(params.len(), 2); // weight + bias
    assert_eq!(params[0].shape(), vec![10, 5]); // [in, out]
    assert_eq!(params[1].shape(), vec![1, 5]); // [1, out]
    assert_eq!(fc.num_params(), 55);

    let names: Vec<String> = fc.named_parameters().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["weight", "bias"]);
}

/// 测试不带 bias 的 Linear
#[test]
fn test_linear_no_bias() {
    let fc = Linear::new_seeded(8, 4, false, 42);
    assert_eq!(fc.parameters().len(), 1); // 只有 weight
    assert_eq!(fc.num_params(), 32);
}

/// 共享参数只计一次
#[test]
fn test_shared_parameters_deduplicated() {
    let model = TiedPair::new();
    let params = model.parameters();
    assert_eq!(params.len(), 2);
    assert!(params[0].ptr_eq(model.fc.weight()));
    assert!(params[1].ptr_eq(model.left.weight()));
    assert_eq!(model.num_params(), 18);

    let parent = SharedParent::new();
    assert_eq!(parent.parameters().len(), 1);
}

/// 数值相同的两个参数仍是不同的参数
#[test]
fn test_equal_values_are_distinct_parameters() {
    let a = Linear::from_parameters(crate::nn::Parameter::new(Tensor::ones(&[2, 2])), None).unwrap();
    let b = Linear::from_parameters(crate::nn::Parameter::new(Tensor::ones(&[2, 2])), None).unwrap();
    let model = Sequential::new(vec![Rc::new(a), Rc::new(b)]);
    assert_eq!(model.parameters().len(), 2);
}

#[test]
fn test_subtype() {
    assert_eq!(Linear::new(2, 2, true).subtype(), "Linear");
    assert_eq!(Sequential::default().subtype(), "Sequential");
    assert_eq!(ReLU::new().subtype(), "ReLU");
    assert_eq!(TiedPair::new().subtype(), "TiedPair");

    let as_dyn: Rc<dyn Module> = Rc::new(ReLU::new());
    assert_eq!(as_dyn.subtype(), "ReLU");
}

/// call() 中产生的运算记录最内层模块
#[test]
fn test_call_records_scope() {
    let fc = Rc::new(Linear::new_seeded(2, 2, false, 1));
    let relu = Rc::new(ReLU::new());
    let model = Sequential::new(vec![fc.clone(), relu.clone()]);

    let x = Var::input(&Tensor::new(&[1., -1.], &[1, 2]));
    let y = model.call(&[x.clone()]).unwrap();

    let GradNode::Op(relu_op) = y.node() else {
        panic!("输出应为算子节点");
    };
    assert_eq!(relu_op.scope(), Some(NodeKey::of_rc(&relu)));
    let GradNode::Op(matmul_op) = &relu_op.operands()[0] else {
        panic!("ReLU 的输入应为算子节点");
    };
    assert_eq!(matmul_op.scope(), Some(NodeKey::of_rc(&fc)));

    // 模块调用之外产生的运算没有所属模块
    let GradNode::Op(free) = x.neg().node().clone() else {
        panic!("应为算子节点");
    };
    assert_eq!(free.scope(), None);
}

/// call() 在 forward 之后按注册顺序触发钩子
#[test]
fn test_call_fires_hooks() {
    let fc = Linear::new_seeded(2, 3, true, 5);
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let log = seen.clone();
    fc.hooks().register(move |inputs, output| {
        log.borrow_mut().push((inputs.len(), output.shape().to_vec()));
        Ok(())
    });

    fc.call(&[Var::input(&Tensor::ones(&[4, 2]))]).unwrap();
    // forward 不触发钩子
    fc.forward(&[Var::input(&Tensor::ones(&[4, 2]))]).unwrap();

    assert_eq!(*seen.borrow(), vec![(1, vec![4, 3])]);
}
