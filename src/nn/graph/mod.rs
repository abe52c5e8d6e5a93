/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 模块：计算图内省的核心实现
 *
 * 公开 API：
 * - `Graph`: 用户级句柄（聚合模块树、当前函数图与标识符分配状态）
 * - `ModuleTree` / `FunctionalGraphBuilder` / `ActivationRecorder`: 各阶段的构件
 * - `Identifier` / `IdentifierSequence`: 节点标识符
 * - `GraphError`: 错误类型
 */

mod error;
mod functional;
mod handle;
mod ident;
mod recorder;
mod tree;

pub use error::GraphError;
pub use functional::{FunctionalGraph, FunctionalGraphBuilder, FunctionalNode};
pub use handle::Graph;
pub use ident::{Identifier, IdentifierSequence};
pub use recorder::{Activation, ActivationRecorder};
pub use tree::{ModuleNode, ModuleTree, ParameterNode};
