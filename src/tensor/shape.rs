use super::Tensor;
use ndarray::IxDyn;

impl Tensor {
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    /// 即`shape()`的元素个数--如：形状为`[]`的标量阶数为0，向量阶数为1，矩阵阶数为2，以此类推
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 判断张量是否为标量
    pub fn is_scalar(&self) -> bool {
        self.shape().is_empty() || self.shape().iter().all(|x| *x == 1)
    }

    /// 判断两个张量能否按 NumPy 规则广播
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        self.shape()
            .iter()
            .rev()
            .zip(other.shape().iter().rev())
            .all(|(&a, &b)| a == b || a == 1 || b == 1)
    }

    /// 去掉所有长度为1的维度（如[1, 3, 1]→[3]，[1, 1]→[]）
    pub fn squeeze(&self) -> Self {
        let new_shape: Vec<usize> = self
            .data
            .shape()
            .iter()
            .copied()
            .filter(|&dim| dim != 1)
            .collect();
        // 元素个数不变，故按行优先重排必定成功
        let squeezed = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(&new_shape));
        match squeezed {
            Ok(data) => Self { data },
            Err(_) => self.clone(),
        }
    }
}
