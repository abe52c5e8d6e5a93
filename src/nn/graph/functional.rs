/*
 * @Author       : 老董
 * @Date         : 2026-01-29
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-07 10:03:26
 * @Description  : 函数图：一次前向传播实际执行过的运算
 *
 * 每次内省前向都会新建一个 FunctionalGraphBuilder，编号接在上一次分配的标识符之后。
 * 运行期节点按身份（地址）去重，菱形依赖只会登记一次。
 */

use super::GraphError;
use super::ident::{Identifier, IdentifierSequence};
use super::tree::ModuleTree;
use crate::nn::descriptor::NodeType;
use crate::nn::nodes::{GradNode, NodeKey, OpNode};
use crate::nn::var::Var;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

/// 函数图节点（含输入/输出这两类合成节点）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalNode {
    pub id: Identifier,
    pub node_type: NodeType,
    /// 算子名；输入/输出为元素类型
    pub subtype: String,
    pub shape: Option<Vec<usize>>,
    pub dependencies: BTreeSet<Identifier>,
    /// 产生该运算的模块
    pub parent_module: Option<Identifier>,
}

/// 函数图快照（构建完成后不可变）
#[derive(Debug, Clone, Default)]
pub struct FunctionalGraph {
    nodes: BTreeMap<Identifier, FunctionalNode>,
    inputs: Vec<Identifier>,
    output: Option<Identifier>,
}

impl FunctionalGraph {
    pub const fn nodes(&self) -> &BTreeMap<Identifier, FunctionalNode> {
        &self.nodes
    }

    pub fn get(&self, id: Identifier) -> Option<&FunctionalNode> {
        self.nodes.get(&id)
    }

    pub fn inputs(&self) -> &[Identifier] {
        &self.inputs
    }

    pub const fn output(&self) -> Option<Identifier> {
        self.output
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 给定子类型（算子名）的节点数
    pub fn count_subtype(&self, subtype: &str) -> usize {
        self.nodes.values().filter(|n| n.subtype == subtype).count()
    }
}

/// 遍历中的单步结果
enum Visit {
    Done(Identifier),
    Pending(Frame),
}

/// 已编号、尚在等待操作数的算子
struct Frame {
    id: Identifier,
    op: Rc<OpNode>,
    parent: Option<Identifier>,
    /// 下一个待处理操作数的下标
    next: usize,
    dependencies: BTreeSet<Identifier>,
}

/// 函数图构建器
pub struct FunctionalGraphBuilder {
    tree: Rc<ModuleTree>,
    ids: IdentifierSequence,
    /// 运行期节点身份 → 标识符；同时持有节点，保证本次构建内地址不被复用
    seen: HashMap<NodeKey, (Identifier, GradNode)>,
    nodes: BTreeMap<Identifier, FunctionalNode>,
    inputs: Vec<Identifier>,
    output: Option<Identifier>,
}

impl FunctionalGraphBuilder {
    /// 新建构建器，编号从 `prev` 之后继续
    pub fn new(tree: Rc<ModuleTree>, prev: Identifier) -> Self {
        Self {
            tree,
            ids: IdentifierSequence::resume_after(prev),
            seen: HashMap::new(),
            nodes: BTreeMap::new(),
            inputs: Vec::new(),
            output: None,
        }
    }

    /// 登记一个外部输入
    pub fn add_input(&mut self, var: &Var) -> Result<Identifier, GraphError> {
        let node = var.node();
        if !matches!(node, GradNode::Input(_)) {
            return Err(GraphError::InvalidOperation(format!(
                "只能把输入节点登记为图输入，实际为{}",
                node.type_name()
            )));
        }
        if let Some((id, _)) = self.seen.get(&node.key()) {
            return Ok(*id);
        }
        let id = self.ids.allocate()?;
        self.seen.insert(node.key(), (id, node.clone()));
        self.nodes.insert(
            id,
            FunctionalNode {
                id,
                node_type: NodeType::Input,
                subtype: var.value().element_type().to_string(),
                shape: Some(var.shape().to_vec()),
                dependencies: BTreeSet::new(),
                parent_module: None,
            },
        );
        self.inputs.push(id);
        Ok(id)
    }

    /// 登记运行期节点及其尚未登记的全部依赖，返回其标识符
    ///
    /// 幂等：已登记过的节点直接返回原标识符。
    /// `owner` 为触发登记的模块，仅在节点本身没有记录所属模块时使用。
    /// 遍历用显式栈完成，算子链再长也不会耗尽调用栈。
    pub fn register(
        &mut self,
        node: &GradNode,
        owner: Option<Identifier>,
    ) -> Result<Identifier, GraphError> {
        let root = match self.visit(node, owner)? {
            Visit::Done(id) => return Ok(id),
            Visit::Pending(frame) => frame,
        };
        let root_id = root.id;
        let mut stack = vec![root];
        while let Some(frame) = stack.last_mut() {
            if let Some(operand) = frame.op.operands().get(frame.next).cloned() {
                frame.next += 1;
                match self.visit(&operand, owner)? {
                    Visit::Done(id) => {
                        if let Some(frame) = stack.last_mut() {
                            frame.dependencies.insert(id);
                        }
                    }
                    Visit::Pending(child) => stack.push(child),
                }
                continue;
            }
            // 操作数全部就绪，落表并回填到上一层
            let Some(done) = stack.pop() else { break };
            if let Some(frame) = stack.last_mut() {
                frame.dependencies.insert(done.id);
            }
            self.nodes.insert(
                done.id,
                FunctionalNode {
                    id: done.id,
                    node_type: NodeType::Function,
                    subtype: done.op.kind().name().to_string(),
                    shape: Some(done.op.shape().to_vec()),
                    dependencies: done.dependencies,
                    parent_module: done.parent,
                },
            );
        }
        Ok(root_id)
    }

    /// 处理单个节点：叶子当场完成；算子先分配标识符（先编号自身，再编号依赖），其操作数留给调用方
    fn visit(&mut self, node: &GradNode, owner: Option<Identifier>) -> Result<Visit, GraphError> {
        let key = node.key();
        if let Some((id, _)) = self.seen.get(&key) {
            return Ok(Visit::Done(*id));
        }
        match node {
            GradNode::Parameter(param) => self
                .tree
                .parameter_id(param)
                .map(Visit::Done)
                .ok_or_else(|| GraphError::UnrecognizedNodeType {
                    kind: "Parameter".to_string(),
                    detail: format!("形状为{:?}的参数不属于已注册的模块树", param.shape()),
                }),
            GradNode::Input(leaf) => Err(GraphError::UnrecognizedNodeType {
                kind: "Input".to_string(),
                detail: format!("形状为{:?}的输入不是本次前向的输入", leaf.shape()),
            }),
            GradNode::Constant(leaf) => {
                let id = self.ids.allocate()?;
                self.seen.insert(key, (id, node.clone()));
                self.nodes.insert(
                    id,
                    FunctionalNode {
                        id,
                        node_type: NodeType::Function,
                        subtype: node.type_name().to_string(),
                        shape: Some(leaf.shape().to_vec()),
                        dependencies: BTreeSet::new(),
                        parent_module: self.scope_id(leaf.scope()).or(owner),
                    },
                );
                Ok(Visit::Done(id))
            }
            GradNode::Op(op) => {
                let id = self.ids.allocate()?;
                self.seen.insert(key, (id, node.clone()));
                Ok(Visit::Pending(Frame {
                    id,
                    op: Rc::clone(op),
                    parent: self.scope_id(op.scope()).or(owner),
                    next: 0,
                    dependencies: BTreeSet::new(),
                }))
            }
        }
    }

    /// 创建时所在的模块调用 → 模块标识符
    fn scope_id(&self, scope: Option<NodeKey>) -> Option<Identifier> {
        scope.and_then(|key| self.tree.module_id_by_key(key))
    }

    /// 登记合成的输出节点，依赖根模块的最终运算
    pub fn add_output(&mut self, var: &Var) -> Result<Identifier, GraphError> {
        let dependency = self.register(var.node(), Some(self.tree.root()))?;
        let id = self.ids.allocate()?;
        self.nodes.insert(
            id,
            FunctionalNode {
                id,
                node_type: NodeType::Output,
                subtype: var.value().element_type().to_string(),
                shape: Some(var.shape().to_vec()),
                dependencies: BTreeSet::from([dependency]),
                parent_module: None,
            },
        );
        self.output = Some(id);
        Ok(id)
    }

    /// 最近一次分配的标识符
    pub fn last_issued(&self) -> Option<Identifier> {
        self.ids.last_issued()
    }

    /// 完成构建，返回快照与最后分配的标识符；身份映射随之丢弃
    pub fn finish(self) -> (FunctionalGraph, Option<Identifier>) {
        let last = self.ids.last_issued();
        log::debug!("函数图构建完成：{}个节点", self.nodes.len());
        (
            FunctionalGraph {
                nodes: self.nodes,
                inputs: self.inputs,
                output: self.output,
            },
            last,
        )
    }
}
