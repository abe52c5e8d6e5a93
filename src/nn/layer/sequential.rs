/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : Sequential 容器：按顺序串联子模块
 */

use crate::nn::{ForwardHooks, GraphError, Module, Var};
use std::rc::Rc;

/// 顺序容器
///
/// 子模块依次命名为 `"0"`, `"1"`, …；第一个子模块接收全部输入，
/// 其后每个子模块接收前一个的输出。没有子模块时原样返回唯一输入。
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Rc<dyn Module>>,
    hooks: ForwardHooks,
}

impl Sequential {
    pub fn new(layers: Vec<Rc<dyn Module>>) -> Self {
        Self {
            layers,
            hooks: ForwardHooks::new(),
        }
    }

    /// 追加一个子模块
    pub fn add(mut self, layer: Rc<dyn Module>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Module for Sequential {
    fn forward(&self, inputs: &[Var]) -> Result<Var, GraphError> {
        let Some((first, rest)) = self.layers.split_first() else {
            return super::single_input(inputs, "空的 Sequential").cloned();
        };
        let mut x = first.call(inputs)?;
        for layer in rest {
            x = layer.call(std::slice::from_ref(&x))?;
        }
        Ok(x)
    }

    fn hooks(&self) -> &ForwardHooks {
        &self.hooks
    }

    fn named_children(&self) -> Vec<(String, Rc<dyn Module>)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (i.to_string(), Rc::clone(layer)))
            .collect()
    }
}
