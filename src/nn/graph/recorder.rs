/*
 * @Author       : 老董
 * @Date         : 2026-01-30
 * @Description  : 激活值记录：模块完成前向时拷贝其输入与输出
 */

use super::ident::Identifier;
use crate::nn::var::Var;
use crate::tensor::NestedArray;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 一个模块的一次激活（已去掉大小为 1 的维度，只含数值）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activation {
    pub inputs: Vec<NestedArray>,
    pub output: NestedArray,
}

/// 激活值记录器
///
/// 同一模块在一次前向中被多次调用时，保留最后一次。
#[derive(Debug, Clone, Default)]
pub struct ActivationRecorder {
    activations: BTreeMap<Identifier, Activation>,
}

impl ActivationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module: Identifier, inputs: &[Var], output: &Var) {
        let activation = Activation {
            inputs: inputs
                .iter()
                .map(|var| NestedArray(var.value().squeeze()))
                .collect(),
            output: NestedArray(output.value().squeeze()),
        };
        self.activations.insert(module, activation);
    }

    /// 只保留给定模块的激活
    pub fn retain(&mut self, targets: &BTreeSet<Identifier>) {
        self.activations.retain(|id, _| targets.contains(id));
    }

    pub fn get(&self, module: Identifier) -> Option<&Activation> {
        self.activations.get(&module)
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    pub fn into_activations(self) -> BTreeMap<Identifier, Activation> {
        self.activations
    }
}
