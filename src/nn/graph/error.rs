/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06 11:02:18
 * @Description  : Graph 模块的错误类型
 *
 * 所有错误都是结构性/配置性的，不存在可重试的瞬时错误：一律立即返回给调用方，
 * 且失败时不会返回残缺的图。
 */

use super::ident::Identifier;
use crate::data::DataError;
use crate::errors::TensorError;
use thiserror::Error;

/// Graph 操作错误类型
#[derive(Debug, Error)]
pub enum GraphError {
    /// 未给出输入，且构造时没有配置数据加载器（或加载器没有任何批次）
    #[error("缺少输入：{0}")]
    MissingInput(String),

    /// 遍历中遇到无法识别的节点（既非已注册的模块/参数，也非本次的输入或算子）
    #[error("无法识别的{kind}节点：{detail}")]
    UnrecognizedNodeType { kind: String, detail: String },

    /// 观察钩子未能全部卸载（其余钩子仍已尽力卸载）
    #[error("{failed}/{total}个钩子卸载失败：{detail}")]
    HookLifecycle {
        failed: usize,
        total: usize,
        detail: String,
    },

    /// 标识符在当前图中不存在
    #[error("图中不存在标识符`{0}`")]
    UnknownIdentifier(Identifier),

    /// 非法的标识符字符串
    #[error("非法标识符`{0}`：只允许非空的小写字母串")]
    InvalidIdentifier(String),

    /// 标识符空间耗尽
    #[error("标识符已用尽")]
    IdentifierExhausted,

    #[error("形状不匹配：期望{expected:?}，实际{got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("非法操作：{0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("序列化失败：{0}")]
    Serialization(#[from] serde_json::Error),
}
