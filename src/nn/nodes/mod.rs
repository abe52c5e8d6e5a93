/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 运行期计算图节点（动态图，每次前向传播重新生成）
 *
 * 每个 Var 都携带其“创建者”节点（GradNode）：
 * - Input：外部输入的叶子
 * - Constant：前向过程中临时创建的常量叶子
 * - Parameter：可学习参数（身份由底层共享张量决定，而非数值）
 * - Op：一次算子调用，按顺序记录其操作数
 *
 * 节点的身份一律按共享分配的地址判定（NodeKey），两个数值相同的参数是不同的节点。
 */

mod op;
mod parameter;

pub use op::{OpKind, OpNode};
pub use parameter::Parameter;

use std::rc::Rc;

/// 按对象身份（地址）区分节点的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl NodeKey {
    /// 取任意（可能是胖）指针的数据地址作为键
    pub(crate) fn of_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr as *const () as usize)
    }

    pub(crate) fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self::of_ptr(Rc::as_ptr(rc))
    }
}

/// 叶子节点（输入/常量）：只记录形状，身份即其 Rc 地址
#[derive(Debug)]
pub struct Leaf {
    shape: Vec<usize>,
    scope: Option<NodeKey>,
}

impl Leaf {
    pub(crate) fn new(shape: &[usize]) -> Rc<Self> {
        Self::scoped(shape, None)
    }

    /// 记下创建时所在的模块调用（常量用）
    pub(crate) fn scoped(shape: &[usize], scope: Option<NodeKey>) -> Rc<Self> {
        Rc::new(Self {
            shape: shape.to_vec(),
            scope,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub const fn scope(&self) -> Option<NodeKey> {
        self.scope
    }
}

/// Var 的创建者节点
#[derive(Debug, Clone)]
pub enum GradNode {
    Input(Rc<Leaf>),
    Constant(Rc<Leaf>),
    Parameter(Parameter),
    Op(Rc<OpNode>),
}

impl GradNode {
    /// 节点身份
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Input(leaf) | Self::Constant(leaf) => NodeKey::of_rc(leaf),
            Self::Parameter(param) => param.key(),
            Self::Op(op) => NodeKey::of_rc(op),
        }
    }

    /// 节点类型名称（算子节点为算子名）
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input",
            Self::Constant(_) => "Constant",
            Self::Parameter(_) => "Parameter",
            Self::Op(op) => op.kind().name(),
        }
    }

    /// 按身份判断是否为同一节点
    pub fn same_node(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
