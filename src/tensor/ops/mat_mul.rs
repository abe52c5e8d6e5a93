use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::Ix2;

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，
    /// 且需要保证前一个张量的列数（col）等于后一个张量的行数（row），否则返回错误。
    pub fn try_mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        // 检查输入的张量维度
        for dims in [self.dimension(), other.dimension()] {
            if dims != 2 {
                return Err(TensorError::MatMulNeed2Dims(dims));
            }
        }
        // 检查前一个张量的列数是否等于后一个张量的行数
        if self.shape()[1] != other.shape()[0] {
            return Err(TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        // 将动态维度数组转换为常量维度数组
        let self_data = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| TensorError::IncompatibleShape)?;
        let other_data = other
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Self {
            data: self_data.dot(&other_data).into_dyn(),
        })
    }
}
