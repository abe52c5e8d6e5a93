/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-05 18:30:19
 * @Description  : Linear (全连接) 层
 */

use super::single_input;
use crate::nn::{ForwardHooks, GraphError, Init, Module, Parameter, Var};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Linear (全连接) 层
///
/// PyTorch 风格的全连接层：`output = x @ W + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
///
/// # 使用示例
/// ```ignore
/// let fc = Rc::new(Linear::new(784, 128, true));
/// let h = fc.call(&[x])?.relu();
/// ```
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weight: Parameter,
    /// 偏置参数 [1, out_features]（可选）
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
    hooks: ForwardHooks,
}

impl Linear {
    /// 创建新的 Linear 层
    ///
    /// 权重用 Kaiming 初始化（适合 ReLU），偏置零初始化
    pub fn new(in_features: usize, out_features: usize, use_bias: bool) -> Self {
        let weight = Parameter::new(Init::Kaiming.generate(&[in_features, out_features]));
        Self::with_weight(weight, use_bias, in_features, out_features)
    }

    /// 创建新的 Linear 层（带种子，确保可重复性）
    pub fn new_seeded(in_features: usize, out_features: usize, use_bias: bool, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weight = Parameter::new(
            Init::Kaiming.generate_with_rng(&[in_features, out_features], &mut rng),
        );
        Self::with_weight(weight, use_bias, in_features, out_features)
    }

    fn with_weight(weight: Parameter, use_bias: bool, in_features: usize, out_features: usize) -> Self {
        let bias = use_bias.then(|| Parameter::new(Init::Zeros.generate(&[1, out_features])));
        Self {
            weight,
            bias,
            in_features,
            out_features,
            hooks: ForwardHooks::new(),
        }
    }

    /// 由现成的参数创建（可用于权重共享）
    ///
    /// `weight` 须为 [in, out]，`bias` 须为 [1, out]
    pub fn from_parameters(weight: Parameter, bias: Option<Parameter>) -> Result<Self, GraphError> {
        let shape = weight.shape();
        let [in_features, out_features] = shape[..] else {
            return Err(GraphError::InvalidOperation(format!(
                "Linear 权重必须是2阶张量，实际形状为{shape:?}"
            )));
        };
        if let Some(bias) = &bias {
            if bias.shape() != [1, out_features] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![1, out_features],
                    got: bias.shape(),
                    message: "Linear 偏置形状与权重不匹配".to_string(),
                });
            }
        }
        Ok(Self {
            weight,
            bias,
            in_features,
            out_features,
            hooks: ForwardHooks::new(),
        })
    }

    pub const fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub const fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    /// 计算 `x @ W + b`
    fn forward(&self, inputs: &[Var]) -> Result<Var, GraphError> {
        let x = single_input(inputs, "Linear")?;
        if x.shape().len() != 2 || x.shape()[1] != self.in_features {
            return Err(GraphError::ShapeMismatch {
                expected: vec![x.shape().first().copied().unwrap_or(1), self.in_features],
                got: x.shape().to_vec(),
                message: "Linear 输入的特征维度不匹配".to_string(),
            });
        }
        // x @ W: [batch, in] @ [in, out] = [batch, out]
        let out = x.matmul(&self.weight.var())?;
        match &self.bias {
            Some(bias) => out.try_add(&bias.var()),
            None => Ok(out),
        }
    }

    fn hooks(&self) -> &ForwardHooks {
        &self.hooks
    }

    fn named_parameters(&self) -> Vec<(String, Parameter)> {
        let mut params = vec![("weight".to_string(), self.weight.clone())];
        if let Some(bias) = &self.bias {
            params.push(("bias".to_string(), bias.clone()));
        }
        params
    }
}
