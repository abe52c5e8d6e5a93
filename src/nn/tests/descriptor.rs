/*
 * @Description  : 图快照、描述符与文本摘要测试
 */

use super::models::{TiedPair, id};
use crate::nn::{
    Graph, GraphDescriptor, GraphError, GraphSnapshot, Linear, Module, NodeRecord, NodeType,
    ReLU, Sequential,
};
use crate::tensor::Tensor;
use serde_json::{Value, json};
use std::rc::Rc;

fn mlp_graph() -> Graph {
    let model: Rc<dyn Module> = Rc::new(Sequential::new(vec![
        Rc::new(Linear::new_seeded(2, 3, true, 1)),
        Rc::new(ReLU::new()),
        Rc::new(Linear::new_seeded(3, 1, true, 2)),
    ]));
    Graph::new(model).unwrap()
}

#[test]
fn test_tree_records() {
    let graph = mlp_graph();
    let snapshot = graph.serialize();
    assert_eq!(snapshot.count(NodeType::Parameter), 4);
    assert_eq!(snapshot.count(NodeType::Module), 4);

    assert_eq!(
        snapshot.get(id("a")),
        Some(&NodeRecord::Parameter {
            subtype: "float32".to_string(),
            shape: vec![2, 3],
        })
    );
    let NodeRecord::Module {
        subtype, children, ..
    } = snapshot.get(id("e")).unwrap()
    else {
        panic!("e 应为模块");
    };
    assert_eq!(subtype, "Sequential");
    assert_eq!(children.get("1"), Some(&id("g")));
}

/// 字段名与取值形式
#[test]
fn test_json_shape() {
    let mut graph = mlp_graph();
    graph
        .instrumented_forward(Some(&[Tensor::ones(&[1, 2])]))
        .unwrap();
    let value: Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();

    assert_eq!(
        value["f"],
        json!({
            "type": "Module",
            "subtype": "Linear",
            "params": {"bias": "b", "weight": "a"},
            "children": {},
        })
    );
    assert_eq!(value["a"], json!({"type": "Parameter", "subtype": "float32", "shape": [2, 3]}));
    assert_eq!(
        value["i"],
        json!({"type": "Input", "subtype": "float32", "shape": [1, 2], "dependencies": []})
    );
    // 第一层最先完成：Add=j, MatMul=k；ReLU=l；最后一层 Add=m, MatMul=n
    assert_eq!(value["j"]["type"], "Function");
    assert_eq!(value["j"]["subtype"], "Add");
    assert_eq!(value["j"]["parent_module"], "f");
    assert_eq!(value["j"]["dependencies"], json!(["b", "k"]));
    assert_eq!(value["l"]["subtype"], "ReLU");
    assert_eq!(value["l"]["parent_module"], "g");
    assert_eq!(value["n"]["dependencies"], json!(["c", "l"]));

    let output = value
        .as_object()
        .unwrap()
        .values()
        .find(|v| v["type"] == "Output")
        .unwrap();
    assert_eq!(output["dependencies"], json!(["m"]));
}

/// 序列化再解析得到同构的映射，且所有引用都存在
#[test]
fn test_round_trip() {
    let root: Rc<dyn Module> = Rc::new(TiedPair::new());
    let mut graph = Graph::new(root).unwrap();
    graph
        .instrumented_forward(Some(&[Tensor::ones(&[2, 3])]))
        .unwrap();

    let snapshot = graph.serialize();
    let parsed = GraphSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(parsed, snapshot);
    assert!(parsed.dangling_references().is_empty());
    // 键按序号排序
    let keys: Vec<_> = parsed.iter().map(|(k, _)| *k).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

/// 子模块按声明顺序输出，而不是按名称的字典序
#[test]
fn test_children_keep_declaration_order() {
    // Sequential=a，12 个 ReLU 依次为 b..m
    let layers: Vec<Rc<dyn Module>> = (0..12).map(|_| Rc::new(ReLU::new()) as Rc<dyn Module>).collect();
    let graph = Graph::new(Rc::new(Sequential::new(layers))).unwrap();
    let record = graph.serialize().get(id("a")).unwrap().clone();
    let NodeRecord::Module { children, .. } = &record else {
        panic!("a 应为模块");
    };
    let names: Vec<_> = children.keys().collect();
    assert_eq!(names[..3], ["0", "1", "2"]);
    assert_eq!(names[10..], ["10", "11"]);
    assert_eq!(children.get("10"), Some(&id("l")));

    let text = serde_json::to_string(&record).unwrap();
    assert!(text.contains(r#""children":{"0":"b","1":"c","2":"d","3":"e""#));
    assert!(text.contains(r#""9":"k","10":"l","11":"m"}"#));
    assert_eq!(serde_json::from_str::<NodeRecord>(&text).unwrap(), record);
}

#[test]
fn test_dangling_detection() {
    let snapshot = GraphSnapshot::from_json(
        r#"{"a": {"type": "Function", "subtype": "Add", "dependencies": ["b"]}}"#,
    )
    .unwrap();
    assert_eq!(snapshot.dangling_references(), vec![(id("a"), id("b"))]);

    assert!(matches!(
        GraphSnapshot::from_json(r#"{"A": {"type": "Parameter", "subtype": "float32", "shape": []}}"#),
        Err(GraphError::Serialization(_))
    ));
}

#[test]
fn test_forward_report_json() {
    let mut graph = mlp_graph();
    let report = graph
        .instrumented_forward_targets(Some(&[Tensor::new(&[1., 2.], &[1, 2])]), Some(&[id("g")]))
        .unwrap();
    let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    let activations = value["activations"].as_object().unwrap();
    assert_eq!(activations.keys().collect::<Vec<_>>(), vec!["g"]);
    // [1, 3] 去掉单维后为一维数组
    assert_eq!(activations["g"]["inputs"].as_array().unwrap().len(), 1);
    assert_eq!(activations["g"]["output"].as_array().unwrap().len(), 3);
    // 前向结果保留原形状 [1, 1]
    assert!(value["result"][0][0].is_number());
    assert!(value["functional_graph"]["i"]["type"] == "Input");
}

#[test]
fn test_describe() {
    let mut graph = mlp_graph().with_name("mlp");
    let before = graph.describe();
    assert_eq!(before.name, "mlp");
    assert_eq!(before.version, env!("CARGO_PKG_VERSION"));
    assert!(before.input_vars.is_empty());
    assert_eq!(before.total_params, 13);

    graph
        .instrumented_forward(Some(&[Tensor::ones(&[1, 2])]))
        .unwrap();
    let after = graph.describe();
    assert_eq!(after.input_vars, vec![id("i")]);

    let parsed = GraphDescriptor::from_json(&after.to_json().unwrap()).unwrap();
    assert_eq!(parsed, after);
}

#[test]
fn test_summary() {
    let graph = mlp_graph().with_name("mlp");
    let summary = graph.summary();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "mlp");
    assert_eq!(lines[1], "[e] Sequential");
    assert_eq!(lines[2], "  0 [f] Linear  weight[a]=[2, 3]  bias[b]=[1, 3]");
    assert_eq!(lines[3], "  1 [g] ReLU");
    assert_eq!(graph.to_string(), summary);

    // 共享模块第二次出现时不再展开
    let shared: Rc<dyn Module> = Rc::new(ReLU::new());
    let root: Rc<dyn Module> = Rc::new(Sequential::new(vec![shared.clone(), shared]));
    let summary = Graph::new(root).unwrap().summary();
    assert!(summary.contains("  1 [b] ReLU（共享）"));
}
