use super::NodeKey;
use crate::nn::GraphError;
use crate::nn::var::Var;
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// 可学习参数
///
/// Clone 得到的是同一个参数的另一个句柄（共享底层张量），
/// 因此可以把同一个参数交给多个模块实现权重共享。
#[derive(Clone)]
pub struct Parameter {
    value: Rc<RefCell<Tensor>>,
}

impl Parameter {
    pub fn new(value: Tensor) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::of_rc(&self.value)
    }

    /// 是否为同一个参数（身份比较，而非数值比较）
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.value.borrow().shape().to_vec()
    }

    pub fn size(&self) -> usize {
        self.value.borrow().size()
    }

    pub fn element_type(&self) -> &'static str {
        self.value.borrow().element_type()
    }

    /// 当前值的拷贝
    pub fn value(&self) -> Tensor {
        self.value.borrow().clone()
    }

    /// 覆盖参数值（形状必须不变）
    pub fn set_value(&self, value: Tensor) -> Result<(), GraphError> {
        let expected = self.shape();
        if value.shape() != expected.as_slice() {
            return Err(GraphError::ShapeMismatch {
                expected,
                got: value.shape().to_vec(),
                message: "参数值的形状不能改变".to_string(),
            });
        }
        *self.value.borrow_mut() = value;
        Ok(())
    }

    /// 以当前值创建一个以本参数为创建者的 Var
    pub fn var(&self) -> Var {
        Var::from_parameter(self)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("shape", &self.shape())
            .finish()
    }
}
