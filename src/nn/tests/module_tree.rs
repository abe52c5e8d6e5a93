/*
 * @Description  : 模块树注册测试
 */

use super::models::{SharedParent, TiedPair, id};
use crate::nn::{Linear, Module, ModuleTree, Parameter, ReLU, Sequential};
use crate::tensor::Tensor;
use std::rc::Rc;

fn mlp() -> Rc<dyn Module> {
    Rc::new(Sequential::new(vec![
        Rc::new(Linear::new_seeded(2, 3, true, 1)),
        Rc::new(ReLU::new()),
        Rc::new(Linear::new_seeded(3, 1, true, 2)),
    ]))
}

/// 参数先编号，模块自顶向下编号
#[test]
fn test_register_order() {
    let (tree, last) = ModuleTree::register(&mlp()).unwrap();

    // 参数：0.weight=a, 0.bias=b, 2.weight=c, 2.bias=d
    assert_eq!(tree.parameters().len(), 4);
    assert_eq!(tree.parameter(id("a")).unwrap().shape, vec![2, 3]);
    assert_eq!(tree.parameter(id("b")).unwrap().shape, vec![1, 3]);
    assert_eq!(tree.parameter(id("d")).unwrap().element_type, "float32");

    // 模块：root=e, 0=f, 1=g, 2=h
    assert_eq!(tree.root(), id("e"));
    assert_eq!(last, id("h"));
    let root = tree.module(id("e")).unwrap();
    assert_eq!(root.subtype, "Sequential");
    assert!(root.params.is_empty());
    assert_eq!(
        root.children,
        vec![
            ("0".to_string(), id("f")),
            ("1".to_string(), id("g")),
            ("2".to_string(), id("h")),
        ]
    );
    let first = tree.module(id("f")).unwrap();
    assert_eq!(
        first.params,
        vec![("weight".to_string(), id("a")), ("bias".to_string(), id("b"))]
    );
    assert_eq!(tree.module(id("g")).unwrap().subtype, "ReLU");
    assert_eq!(tree.total_params(), 6 + 3 + 3 + 1);
}

/// 父子共享的参数只归属于子模块
#[test]
fn test_parent_child_shared_parameter() {
    let model = SharedParent::new();
    let w = model.w.clone();
    let root: Rc<dyn Module> = Rc::new(model);
    let (tree, last) = ModuleTree::register(&root).unwrap();

    assert_eq!(tree.parameter_id(&w), Some(id("a")));
    assert_eq!(tree.root(), id("b"));
    assert_eq!(last, id("c"));

    let owners: Vec<_> = tree
        .modules()
        .values()
        .filter(|m| m.params.iter().any(|(_, p)| *p == id("a")))
        .map(|m| m.id)
        .collect();
    assert_eq!(owners, vec![id("c")]);
    assert!(tree.module(id("b")).unwrap().params.is_empty());
}

/// 一个独立 Linear + 一对共享权重的 Linear
#[test]
fn test_tied_pair_scenario() {
    let model = TiedPair::new();
    let (fc_w, tied) = (model.fc.weight().clone(), model.left.weight().clone());
    let root: Rc<dyn Module> = Rc::new(model);
    let (tree, last) = ModuleTree::register(&root).unwrap();

    assert_eq!(tree.parameter_id(&fc_w), Some(id("a")));
    assert_eq!(tree.parameter_id(&tied), Some(id("b")));
    assert_eq!(tree.root(), id("c"));
    assert_eq!(last, id("f"));

    // fc=d, left=e, right=f；共享权重只归属于先完成注册的 left
    assert_eq!(tree.module(id("d")).unwrap().params, vec![("weight".to_string(), id("a"))]);
    assert_eq!(tree.module(id("e")).unwrap().params, vec![("weight".to_string(), id("b"))]);
    assert!(tree.module(id("f")).unwrap().params.is_empty());

    let attributions = tree
        .modules()
        .values()
        .flat_map(|m| m.params.iter())
        .filter(|(_, p)| *p == id("b"))
        .count();
    assert_eq!(attributions, 1);
}

/// 同一子模块实例出现两次只注册一次
#[test]
fn test_shared_module_registered_once() {
    let shared: Rc<dyn Module> = Rc::new(Linear::new_seeded(2, 2, false, 3));
    let root: Rc<dyn Module> = Rc::new(Sequential::new(vec![shared.clone(), shared.clone()]));
    let (tree, _) = ModuleTree::register(&root).unwrap();

    assert_eq!(tree.modules().len(), 2);
    assert_eq!(tree.parameters().len(), 1);
    let children = &tree.module(tree.root()).unwrap().children;
    assert_eq!(children[0].1, children[1].1);
    assert_eq!(tree.module_id(&shared), Some(children[0].1));
}

#[test]
fn test_unknown_lookups() {
    let (tree, _) = ModuleTree::register(&mlp()).unwrap();
    let stranger = Parameter::new(Tensor::ones(&[2, 3]));
    assert_eq!(tree.parameter_id(&stranger), None);
    let other: Rc<dyn Module> = Rc::new(ReLU::new());
    assert_eq!(tree.module_id(&other), None);
}
