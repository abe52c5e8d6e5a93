/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-05 18:12:40
 * @Description  : Layer 模块 - 常用的 Module 实现
 */

mod activation;
mod linear;
mod sequential;

pub use activation::{ReLU, Sigmoid, Tanh};
pub use linear::Linear;
pub use sequential::Sequential;

use crate::nn::{GraphError, Var};

/// 取单输入层的唯一输入
pub(crate) fn single_input<'a>(inputs: &'a [Var], layer: &str) -> Result<&'a Var, GraphError> {
    match inputs {
        [x] => Ok(x),
        _ => Err(GraphError::InvalidOperation(format!(
            "{layer}只接受1个输入，实际为{}个",
            inputs.len()
        ))),
    }
}
