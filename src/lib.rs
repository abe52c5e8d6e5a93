//! # netscope
//!
//! `netscope`用纯rust对神经网络模型做计算图内省：注册模块树、在一次前向传播中
//! 记录实际执行的运算（动态图）与各模块的激活值，并导出为以标识符为键的 JSON 快照，
//! 供外部的查看器使用。
//!

pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
