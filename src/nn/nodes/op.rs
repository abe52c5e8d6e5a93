use super::{GradNode, NodeKey};
use std::fmt;
use std::rc::Rc;

/// 算子类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpKind {
    Add,
    Sub,
    Mul,
    MatMul,
    ReLU,
    Tanh,
    Sigmoid,
    Neg,
    Scale(f32),
}

impl OpKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mul",
            Self::MatMul => "MatMul",
            Self::ReLU => "ReLU",
            Self::Tanh => "Tanh",
            Self::Sigmoid => "Sigmoid",
            Self::Neg => "Neg",
            Self::Scale(_) => "Scale",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale(factor) => write!(f, "Scale({factor})"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// 一次算子调用
///
/// `scope` 为创建该节点时正在执行 `Module::call` 的最内层模块（若有）。
#[derive(Debug)]
pub struct OpNode {
    kind: OpKind,
    operands: Vec<GradNode>,
    shape: Vec<usize>,
    scope: Option<NodeKey>,
}

impl OpNode {
    pub(crate) fn new(
        kind: OpKind,
        operands: Vec<GradNode>,
        shape: &[usize],
        scope: Option<NodeKey>,
    ) -> Self {
        Self {
            kind,
            operands,
            shape: shape.to_vec(),
            scope,
        }
    }

    pub const fn kind(&self) -> OpKind {
        self.kind
    }

    /// 操作数（即本节点在运行期依赖的节点），保持调用时的顺序
    pub fn operands(&self) -> &[GradNode] {
        &self.operands
    }

    /// 结果的形状
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub const fn scope(&self) -> Option<NodeKey> {
        self.scope
    }
}

impl Drop for OpNode {
    /// 逐层拆开独占的操作数，长链释放时不递归
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.operands);
        while let Some(node) = pending.pop() {
            if let GradNode::Op(op) = node {
                if let Ok(mut inner) = Rc::try_unwrap(op) {
                    pending.append(&mut inner.operands);
                }
            }
        }
    }
}
