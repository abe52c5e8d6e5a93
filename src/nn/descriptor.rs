/*
 * @Author       : 老董
 * @Date         : 2025-12-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-07 15:12:44
 * @Description  : 图描述符（Graph Descriptor）
 *                 以标识符为键的扁平映射，用于序列化、前端查看与调试输出
 */

use super::GraphError;
use super::graph::{Activation, FunctionalGraph, FunctionalNode, Identifier, ModuleTree};
use crate::tensor::NestedArray;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 节点大类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Module,
    Parameter,
    Function,
    Input,
    Output,
}

/// 名称 → 标识符，保持模块声明顺序；序列化为 JSON 对象
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedIds(Vec<(String, Identifier)>);

impl NamedIds {
    pub fn get(&self, name: &str) -> Option<&Identifier> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, id)| id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter().map(|(_, id)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Identifier)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, Identifier)>> for NamedIds {
    fn from(entries: Vec<(String, Identifier)>) -> Self {
        Self(entries)
    }
}

impl Serialize for NamedIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, id)| (name, id)))
    }
}

impl<'de> Deserialize<'de> for NamedIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamedIdsVisitor;

        impl<'de> Visitor<'de> for NamedIdsVisitor {
            type Value = NamedIds;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("名称到标识符的映射")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NamedIds, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Identifier>()? {
                    entries.push(entry);
                }
                Ok(NamedIds(entries))
            }
        }

        deserializer.deserialize_map(NamedIdsVisitor)
    }
}

/// 节点记录（按 `type` 字段区分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeRecord {
    Module {
        subtype: String,
        params: NamedIds,
        children: NamedIds,
    },
    Parameter {
        /// 元素类型
        subtype: String,
        shape: Vec<usize>,
    },
    Function {
        /// 算子名
        subtype: String,
        dependencies: Vec<Identifier>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_module: Option<Identifier>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shape: Option<Vec<usize>>,
    },
    Input {
        subtype: String,
        shape: Vec<usize>,
        dependencies: Vec<Identifier>,
    },
    Output {
        subtype: String,
        shape: Vec<usize>,
        dependencies: Vec<Identifier>,
    },
}

impl NodeRecord {
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Module { .. } => NodeType::Module,
            Self::Parameter { .. } => NodeType::Parameter,
            Self::Function { .. } => NodeType::Function,
            Self::Input { .. } => NodeType::Input,
            Self::Output { .. } => NodeType::Output,
        }
    }

    pub fn subtype(&self) -> &str {
        match self {
            Self::Module { subtype, .. }
            | Self::Parameter { subtype, .. }
            | Self::Function { subtype, .. }
            | Self::Input { subtype, .. }
            | Self::Output { subtype, .. } => subtype,
        }
    }

    /// 本记录引用的全部标识符（依赖、参数、子模块、所属模块）
    pub fn references(&self) -> Vec<Identifier> {
        match self {
            Self::Module {
                params, children, ..
            } => params.values().chain(children.values()).copied().collect(),
            Self::Parameter { .. } => Vec::new(),
            Self::Function {
                dependencies,
                parent_module,
                ..
            } => dependencies.iter().chain(parent_module).copied().collect(),
            Self::Input { dependencies, .. } | Self::Output { dependencies, .. } => {
                dependencies.clone()
            }
        }
    }

    fn from_functional(node: &FunctionalNode) -> Self {
        let subtype = node.subtype.clone();
        let dependencies: Vec<Identifier> = node.dependencies.iter().copied().collect();
        let shape = node.shape.clone().unwrap_or_default();
        match node.node_type {
            NodeType::Input => Self::Input {
                subtype,
                shape,
                dependencies,
            },
            NodeType::Output => Self::Output {
                subtype,
                shape,
                dependencies,
            },
            _ => Self::Function {
                subtype,
                dependencies,
                parent_module: node.parent_module,
                shape: node.shape.clone(),
            },
        }
    }
}

/// 标识符 → 节点记录的扁平映射（按标识符顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphSnapshot {
    nodes: BTreeMap<Identifier, NodeRecord>,
}

impl GraphSnapshot {
    /// 模块树 + 当前函数图（若有）
    pub fn from_parts(tree: &ModuleTree, functional: Option<&FunctionalGraph>) -> Self {
        let mut nodes = BTreeMap::new();
        for (id, param) in tree.parameters() {
            nodes.insert(
                *id,
                NodeRecord::Parameter {
                    subtype: param.element_type.to_string(),
                    shape: param.shape.clone(),
                },
            );
        }
        for (id, module) in tree.modules() {
            nodes.insert(
                *id,
                NodeRecord::Module {
                    subtype: module.subtype.clone(),
                    params: module.params.clone().into(),
                    children: module.children.clone().into(),
                },
            );
        }
        let mut snapshot = Self { nodes };
        if let Some(functional) = functional {
            snapshot.extend_functional(functional);
        }
        snapshot
    }

    /// 仅函数图部分
    pub fn from_functional(functional: &FunctionalGraph) -> Self {
        let mut snapshot = Self::default();
        snapshot.extend_functional(functional);
        snapshot
    }

    fn extend_functional(&mut self, functional: &FunctionalGraph) {
        for (id, node) in functional.nodes() {
            self.nodes.insert(*id, NodeRecord::from_functional(node));
        }
    }

    pub fn get(&self, id: Identifier) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &NodeRecord)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 给定大类的节点数
    pub fn count(&self, node_type: NodeType) -> usize {
        self.nodes
            .values()
            .filter(|r| r.node_type() == node_type)
            .count()
    }

    /// 引用了不存在标识符的 (记录, 被引用标识符) 对
    pub fn dangling_references(&self) -> Vec<(Identifier, Identifier)> {
        self.nodes
            .iter()
            .flat_map(|(id, record)| record.references().into_iter().map(move |r| (*id, r)))
            .filter(|(_, r)| !self.nodes.contains_key(r))
            .collect()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 图的可序列化描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 图名称
    pub name: String,
    /// 最近一次前向的输入节点
    pub input_vars: Vec<Identifier>,
    /// 参数元素总数
    pub total_params: usize,
    /// 所有节点
    pub nodes: GraphSnapshot,
}

impl GraphDescriptor {
    /// 创建新的图描述符
    pub fn new(
        name: &str,
        input_vars: Vec<Identifier>,
        total_params: usize,
        nodes: GraphSnapshot,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            input_vars,
            total_params,
            nodes,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 一次内省前向的结果
#[derive(Debug, Clone, Serialize)]
pub struct ForwardReport {
    /// 模块标识符 → 激活
    pub activations: BTreeMap<Identifier, Activation>,
    /// 本次执行的函数图（含输入/输出节点）
    pub functional_graph: GraphSnapshot,
    /// 模型输出（嵌套数组）
    pub result: NestedArray,
}

impl ForwardReport {
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
