//! 数据加载模块
//!
//! 计算图在未显式给出输入时，会从这里配置的 [`DataLoader`] 中取一个批次作为输入。
//!
//! # 主要组件
//!
//! - [`DataLoader`]: `PyTorch` 风格的数据批量加载器
//! - [`TensorDataset`]: 持有特征和标签的数据集
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use netscope::data::{DataLoader, TensorDataset};
//!
//! let dataset = TensorDataset::new(train_x, train_y)?;
//! let loader = DataLoader::new(dataset, 32)?
//!     .shuffle(true)
//!     .seed(42);
//!
//! for (x_batch, _y_batch) in loader.iter() {
//!     // ...
//! }
//! ```

mod dataloader;
pub mod error;

#[cfg(test)]
mod tests;

pub use dataloader::{DataLoader, DataLoaderIterator, TensorDataset};
pub use error::DataError;
