/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03 10:12:40
 * @Description  : 张量：计算图中流动的数值载体（仅支持f32）
 */

use ndarray::{Array, IxDyn};
use rand::Rng;
use rand::distributions::Standard;
use rand::rngs::StdRng;

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod mat_mul;
    pub mod mul;
    pub mod others;
    pub mod sub;
}

mod nested;
pub use nested::NestedArray;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 张量元素类型的名称（本库的张量统一为f32）
pub const ELEMENT_TYPE: &str = "float32";

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic（需要错误返回请用`try_new`）。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Self::try_new(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    /// `new`的非panic版本
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .map(|data| Self { data })
            .map_err(|_| TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            })
    }

    /// 创建一个纯数对应的0阶张量
    pub fn scalar(value: f32) -> Self {
        Self {
            data: Array::from_elem(IxDyn(&[]), value),
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 创建一个服从正态分布的随机张量（使用线程随机数）
    pub fn normal(mean: f32, std_dev: f32, shape: &[usize]) -> Self {
        Self::normal_from(mean, std_dev, shape, &mut rand::thread_rng())
    }

    /// 创建一个服从正态分布的随机张量（使用指定的 RNG，便于复现）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        Self::normal_from(mean, std_dev, shape, rng)
    }

    // Box-Muller
    fn normal_from<R: Rng + ?Sized>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.sample(Standard);
            let u2: f32 = rng.sample(Standard);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self {
            data: Array::from_shape_vec(IxDyn(shape), data)
                .unwrap_or_else(|_| Array::zeros(IxDyn(shape))),
        }
    }
}
