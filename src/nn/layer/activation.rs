/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 激活函数模块（无参数）
 */

use super::single_input;
use crate::nn::{ForwardHooks, GraphError, Module, Var};

macro_rules! activation_module {
    ($(#[$doc:meta])* $name:ident, $method:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            hooks: ForwardHooks,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl Module for $name {
            fn forward(&self, inputs: &[Var]) -> Result<Var, GraphError> {
                Ok(single_input(inputs, stringify!($name))?.$method())
            }

            fn hooks(&self) -> &ForwardHooks {
                &self.hooks
            }
        }
    };
}

activation_module!(
    /// max(0, x)
    ReLU,
    relu
);
activation_module!(Tanh, tanh);
activation_module!(
    /// 1 / (1 + e^(-x))
    Sigmoid,
    sigmoid
);
