/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-05 16:20:41
 * @Description  : Var - 动态图变量句柄：值 + 创建者节点
 *
 * 前向计算是即时（eager）的：每次算子调用立即算出值，并生成一个新的运行期节点，
 * 节点按顺序引用各操作数的创建者，由此在运行期动态地长出依赖图。
 */

use super::GraphError;
use super::module::current_scope;
use super::nodes::{GradNode, Leaf, OpKind, OpNode, Parameter};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用全局 RNG）
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        match self {
            Self::Constant(v) => &Tensor::ones(shape) * *v,
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal(*mean, *std, shape),
            Self::Kaiming => Tensor::normal(0.0, Self::kaiming_std(shape), shape),
            Self::Xavier => Tensor::normal(0.0, Self::xavier_std(shape), shape),
        }
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => &Tensor::ones(shape) * *v,
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => Tensor::normal_with_rng(0.0, Self::kaiming_std(shape), shape, rng),
            Self::Xavier => Tensor::normal_with_rng(0.0, Self::xavier_std(shape), shape, rng),
        }
    }

    fn kaiming_std(shape: &[usize]) -> f32 {
        let fan_in = shape.first().copied().unwrap_or(1).max(1);
        (2.0 / fan_in as f32).sqrt()
    }

    fn xavier_std(shape: &[usize]) -> f32 {
        let (fan_in, fan_out) = (
            shape.first().copied().unwrap_or(1),
            shape.get(1).copied().unwrap_or(1),
        );
        (2.0 / (fan_in + fan_out).max(1) as f32).sqrt()
    }
}

// ==================== Var 结构 ====================

/// 动态图变量句柄
///
/// # 设计原则
/// - 值在创建时即已算出（eager）
/// - 创建者节点记录“它是怎么来的”，这是构建运行期依赖图的唯一依据
/// - Clone 开销极低（两个 Rc clone）
///
/// # 使用示例
/// ```ignore
/// let x = Var::input(&images);
/// let h = x.matmul(&w.var())?.relu();
/// let y = h.try_add(&b.var())?;
/// ```
#[derive(Clone)]
pub struct Var {
    value: Rc<Tensor>,
    node: GradNode,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var")
            .field("node", &self.node.type_name())
            .field("shape", &self.value.shape())
            .finish()
    }
}

impl Var {
    /// 创建外部输入
    pub fn input(value: &Tensor) -> Self {
        Self {
            node: GradNode::Input(Leaf::new(value.shape())),
            value: Rc::new(value.clone()),
        }
    }

    /// 创建常量（前向过程中临时构造的张量），归属于当前所在的模块调用
    pub fn constant(value: &Tensor) -> Self {
        Self {
            node: GradNode::Constant(Leaf::scoped(value.shape(), current_scope())),
            value: Rc::new(value.clone()),
        }
    }

    pub(crate) fn from_parameter(param: &Parameter) -> Self {
        Self {
            value: Rc::new(param.value()),
            node: GradNode::Parameter(param.clone()),
        }
    }

    fn from_op(kind: OpKind, operands: &[&Self], value: Tensor) -> Self {
        let operands = operands.iter().map(|v| v.node.clone()).collect();
        let op = OpNode::new(kind, operands, value.shape(), current_scope());
        Self {
            value: Rc::new(value),
            node: GradNode::Op(Rc::new(op)),
        }
    }

    /// 节点的值
    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    /// 创建者节点
    pub const fn node(&self) -> &GradNode {
        &self.node
    }

    /// 获取标量值
    pub fn item(&self) -> Result<f32, GraphError> {
        self.value
            .number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    // ==================== 二元算子 ====================

    /// 逐元素加法（支持广播）
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        let value = self.value.try_add(&other.value)?;
        Ok(Self::from_op(OpKind::Add, &[self, other], value))
    }

    /// 逐元素减法（支持广播）
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        let value = self.value.try_sub(&other.value)?;
        Ok(Self::from_op(OpKind::Sub, &[self, other], value))
    }

    /// 逐元素乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        let value = self.value.try_mul(&other.value)?;
        Ok(Self::from_op(OpKind::Mul, &[self, other], value))
    }

    /// 矩阵乘法：[m, k] @ [k, n] = [m, n]
    pub fn matmul(&self, other: &Self) -> Result<Self, GraphError> {
        let value = self.value.try_mat_mul(&other.value)?;
        Ok(Self::from_op(OpKind::MatMul, &[self, other], value))
    }

    // ==================== 一元算子 ====================

    pub fn relu(&self) -> Self {
        Self::from_op(OpKind::ReLU, &[self], self.value.map(|x| x.max(0.0)))
    }

    pub fn tanh(&self) -> Self {
        Self::from_op(OpKind::Tanh, &[self], self.value.map(f32::tanh))
    }

    pub fn sigmoid(&self) -> Self {
        Self::from_op(
            OpKind::Sigmoid,
            &[self],
            self.value.map(|x| 1.0 / (1.0 + (-x).exp())),
        )
    }

    pub fn neg(&self) -> Self {
        Self::from_op(OpKind::Neg, &[self], self.value.map(|x| -x))
    }

    /// 乘以纯数
    pub fn scale(&self, factor: f32) -> Self {
        Self::from_op(OpKind::Scale(factor), &[self], &*self.value * factor)
    }
}
