/*
 * @Author       : 老董
 * @Date         : 2025-01-21
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-04 09:30:12
 * @Description  : DataLoader - PyTorch 风格的数据批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle)
 * - 丢弃不完整批次 (drop_last)
 */

use super::DataError;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::seq::SliceRandom;

/// TensorDataset - 持有特征和标签的数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::new(features, labels)?;
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TensorDataset {
    features: Tensor,
    labels: Tensor,
    len: usize,
}

impl TensorDataset {
    /// 创建新的 TensorDataset
    ///
    /// # 参数
    /// - `features`: 特征张量，第一维为样本数
    /// - `labels`: 标签张量，第一维为样本数（必须与 features 一致）
    pub fn new(features: Tensor, labels: Tensor) -> Result<Self, DataError> {
        let (Some(&len), Some(&label_len)) = (features.shape().first(), labels.shape().first())
        else {
            return Err(DataError::MissingSampleDim);
        };
        if len != label_len {
            return Err(DataError::SampleCountMismatch {
                features: len,
                labels: label_len,
            });
        }
        Ok(Self {
            features,
            labels,
            len,
        })
    }

    /// 获取样本数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 检查数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获取特征张量引用
    pub fn features(&self) -> &Tensor {
        &self.features
    }

    /// 获取标签张量引用
    pub fn labels(&self) -> &Tensor {
        &self.labels
    }
}

/// DataLoader - PyTorch 风格的数据批量加载器
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(dataset, 32)?
///     .shuffle(true)
///     .drop_last(true);
///
/// for (x_batch, y_batch) in loader.iter() {
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DataLoader {
    dataset: TensorDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl DataLoader {
    /// 创建新的 DataLoader
    ///
    /// # 参数
    /// - `dataset`: 数据集
    /// - `batch_size`: 批大小
    pub fn new(dataset: TensorDataset, batch_size: usize) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::ZeroBatchSize);
        }
        Ok(Self {
            dataset,
            batch_size,
            shuffle: false,
            drop_last: false,
            seed: None,
        })
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// 取第一个批次的输入（标签被丢弃），没有任何批次时返回 None
    pub fn first_inputs(&self) -> Option<Tensor> {
        self.iter().next().map(|(inputs, _targets)| inputs)
    }

    /// 创建迭代器
    pub fn iter(&self) -> DataLoaderIterator<'_> {
        let n = self.dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();

        if self.shuffle {
            if let Some(seed) = self.seed {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                indices.shuffle(&mut rng);
            } else {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
            }
        }

        DataLoaderIterator {
            loader: self,
            indices,
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器
pub struct DataLoaderIterator<'a> {
    loader: &'a DataLoader,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for DataLoaderIterator<'_> {
    type Item = (Tensor, Tensor);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.loader.dataset.len();
        let batch_size = self.loader.batch_size;
        let start = self.current_batch * batch_size;

        if start >= n {
            return None;
        }

        let end = (start + batch_size).min(n);

        // 如果 drop_last 且批次不完整，则跳过
        if self.loader.drop_last && end - start < batch_size {
            return None;
        }

        self.current_batch += 1;

        let batch_indices = &self.indices[start..end];
        Some((
            extract_batch(&self.loader.dataset.features, batch_indices),
            extract_batch(&self.loader.dataset.labels, batch_indices),
        ))
    }
}

/// 按样本索引从张量中提取一个批次（第一维为样本维）
fn extract_batch(source: &Tensor, indices: &[usize]) -> Tensor {
    let shape = source.shape();
    let sample_size: usize = shape[1..].iter().product();
    let flat = source.data_as_slice();

    let mut data = Vec::with_capacity(indices.len() * sample_size);
    for &idx in indices {
        let sample_start = idx * sample_size;
        data.extend_from_slice(&flat[sample_start..sample_start + sample_size]);
    }

    let mut new_shape = vec![indices.len()];
    new_shape.extend_from_slice(&shape[1..]);
    Tensor::new(&data, &new_shape)
}
