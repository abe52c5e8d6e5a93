/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-08 11:40:02
 * @Description  : 神经网络（neural network）的模块、动态计算图与内省
 */

mod descriptor;
mod display;
mod graph;
mod hooks;
pub mod layer;
mod module;
mod nodes;
mod var;

pub use descriptor::{
    ForwardReport, GraphDescriptor, GraphSnapshot, NamedIds, NodeRecord, NodeType,
};
pub use graph::{
    Activation, ActivationRecorder, FunctionalGraph, FunctionalGraphBuilder, FunctionalNode, Graph,
    GraphError, Identifier, IdentifierSequence, ModuleNode, ModuleTree, ParameterNode,
};
pub use hooks::{ForwardHooks, HookGuard, HookHandle};
pub use layer::{Linear, ReLU, Sequential, Sigmoid, Tanh};
pub use module::Module;
pub use nodes::{GradNode, Leaf, NodeKey, OpKind, OpNode, Parameter};
pub use var::{Init, Var};

#[cfg(test)]
mod tests;
