use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 两个张量逐元素相减（`self - other`），广播规则同`try_add`
    pub fn try_sub(&self, other: &Self) -> Result<Self, TensorError> {
        if !self.can_broadcast_with(other) {
            return Err(TensorError::OperatorError {
                operator: Operator::Sub,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        Ok(Self {
            data: &self.data - &other.data,
        })
    }
}
