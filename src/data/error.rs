//! 数据加载错误类型定义

use thiserror::Error;

/// 数据加载相关错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    /// 特征与标签的样本数不一致
    #[error("特征与标签的样本数不一致: {features} vs {labels}")]
    SampleCountMismatch { features: usize, labels: usize },

    /// 张量至少需要1维（第一维为样本数）
    #[error("数据集张量至少需要1维，但收到的是0阶张量")]
    MissingSampleDim,

    /// 批大小非法
    #[error("batch_size 必须大于 0")]
    ZeroBatchSize,
}
