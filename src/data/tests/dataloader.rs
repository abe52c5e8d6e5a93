//! DataLoader 单元测试

use crate::data::{DataError, DataLoader, TensorDataset};
use crate::tensor::Tensor;

fn sample_dataset(n: usize) -> TensorDataset {
    let features = Tensor::new(
        &(0..n * 2).map(|x| x as f32).collect::<Vec<_>>(),
        &[n, 2],
    );
    let labels = Tensor::new(&(0..n).map(|x| x as f32).collect::<Vec<_>>(), &[n, 1]);
    TensorDataset::new(features, labels).unwrap()
}

#[test]
fn test_tensor_dataset() {
    let dataset = sample_dataset(3);
    assert_eq!(dataset.len(), 3);
    assert!(!dataset.is_empty());
}

#[test]
fn test_tensor_dataset_mismatch() {
    let features = Tensor::zeros(&[3, 2]);
    let labels = Tensor::zeros(&[2, 1]);
    assert_eq!(
        TensorDataset::new(features, labels).unwrap_err(),
        DataError::SampleCountMismatch {
            features: 3,
            labels: 2
        }
    );
}

#[test]
fn test_dataloader_zero_batch_size() {
    assert_eq!(
        DataLoader::new(sample_dataset(4), 0).unwrap_err(),
        DataError::ZeroBatchSize
    );
}

#[test]
fn test_dataloader_basic() {
    let loader = DataLoader::new(sample_dataset(10), 3).unwrap();
    assert_eq!(loader.num_batches(), 4); // 10 / 3 = 3.33, 向上取整 = 4

    let batches: Vec<_> = loader.iter().collect();
    assert_eq!(batches.len(), 4);

    // 前 3 个批次大小为 3
    assert_eq!(batches[0].0.shape(), &[3, 2]);
    assert_eq!(batches[1].0.shape()[0], 3);
    assert_eq!(batches[2].0.shape()[0], 3);
    // 最后一个批次大小为 1
    assert_eq!(batches[3].0.shape()[0], 1);
    assert_eq!(batches[3].1.data_as_slice(), vec![9.0]);
}

#[test]
fn test_dataloader_drop_last() {
    let loader = DataLoader::new(sample_dataset(10), 3)
        .unwrap()
        .drop_last(true);
    assert_eq!(loader.num_batches(), 3);
    assert_eq!(loader.iter().count(), 3);
}

#[test]
fn test_dataloader_shuffle_with_seed() {
    let loader1 = DataLoader::new(sample_dataset(10), 5)
        .unwrap()
        .shuffle(true)
        .seed(42);
    let loader2 = DataLoader::new(sample_dataset(10), 5)
        .unwrap()
        .shuffle(true)
        .seed(42);

    let b1: Vec<_> = loader1.iter().map(|(x, _)| x.data_as_slice()).collect();
    let b2: Vec<_> = loader2.iter().map(|(x, _)| x.data_as_slice()).collect();
    assert_eq!(b1, b2);
}

#[test]
fn test_first_inputs() {
    let loader = DataLoader::new(sample_dataset(4), 2).unwrap();
    let inputs = loader.first_inputs().unwrap();
    assert_eq!(inputs, Tensor::new(&[0., 1., 2., 3.], &[2, 2]));

    let empty = TensorDataset::new(Tensor::zeros(&[0, 2]), Tensor::zeros(&[0, 1])).unwrap();
    let loader = DataLoader::new(empty, 2).unwrap();
    assert!(loader.first_inputs().is_none());
}
