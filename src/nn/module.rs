/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-05 17:48:03
 * @Description  : Module trait 定义
 *
 * 模块是一棵（可能有共享子树的）树：每个模块直接持有若干命名参数与命名子模块，
 * 同一个参数或子模块可以被多处持有。
 */

use super::GraphError;
use super::hooks::ForwardHooks;
use super::nodes::{NodeKey, Parameter};
use super::var::Var;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

thread_local! {
    /// 正在执行 `Module::call` 的模块栈（栈顶为最内层）
    static CALL_STACK: RefCell<Vec<NodeKey>> = const { RefCell::new(Vec::new()) };
}

/// 进入一次模块调用，离开作用域时自动出栈（即使 forward 出错）
struct CallScope;

impl CallScope {
    fn enter(key: NodeKey) -> Self {
        CALL_STACK.with(|stack| stack.borrow_mut().push(key));
        Self
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        CALL_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// 当前最内层的模块调用
pub(crate) fn current_scope() -> Option<NodeKey> {
    CALL_STACK.with(|stack| stack.borrow().last().copied())
}

/// 模块 trait
///
/// # 设计原则
/// - `forward()` 接收任意个输入，返回单个输出
/// - 子模块一律经由 `call()` 调用，这样才会触发前向观察钩子
/// - `new()` **不是** trait 方法（参数各异）
/// - 参数与子模块只列出“直接持有”的，递归遍历交给调用方
///
/// # 使用示例
///
/// ```ignore
/// struct Mlp {
///     fc1: Rc<Linear>,
///     fc2: Rc<Linear>,
///     hooks: ForwardHooks,
/// }
///
/// impl Module for Mlp {
///     fn forward(&self, inputs: &[Var]) -> Result<Var, GraphError> {
///         let h = self.fc1.call(inputs)?.relu();
///         self.fc2.call(&[h])
///     }
///
///     fn hooks(&self) -> &ForwardHooks {
///         &self.hooks
///     }
///
///     fn named_children(&self) -> Vec<(String, Rc<dyn Module>)> {
///         vec![
///             ("fc1".to_string(), self.fc1.clone() as Rc<dyn Module>),
///             ("fc2".to_string(), self.fc2.clone() as Rc<dyn Module>),
///         ]
///     }
/// }
/// ```
pub trait Module {
    /// 前向计算本体（不触发钩子，外部调用请用 `call`）
    fn forward(&self, inputs: &[Var]) -> Result<Var, GraphError>;

    /// 本模块的前向观察钩子表
    fn hooks(&self) -> &ForwardHooks;

    /// 直接持有的命名参数
    fn named_parameters(&self) -> Vec<(String, Parameter)> {
        Vec::new()
    }

    /// 直接持有的命名子模块
    fn named_children(&self) -> Vec<(String, Rc<dyn Module>)> {
        Vec::new()
    }

    /// 模块的类型名（不含路径与泛型参数），如 `Linear`
    fn subtype(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// 执行前向计算并通知钩子
    fn call(&self, inputs: &[Var]) -> Result<Var, GraphError> {
        let output = {
            let _scope = CallScope::enter(NodeKey::of_ptr(self as *const Self));
            self.forward(inputs)?
        };
        self.hooks().fire(inputs, &output)?;
        Ok(output)
    }

    /// 递归获取所有参数（按身份去重，先自身后子模块）
    fn parameters(&self) -> Vec<Parameter> {
        let mut seen = HashSet::new();
        let mut params = Vec::new();
        collect_parameters(
            self.named_parameters(),
            self.named_children(),
            &mut seen,
            &mut params,
        );
        params
    }

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.parameters().iter().map(Parameter::size).sum()
    }
}

fn collect_parameters(
    own: Vec<(String, Parameter)>,
    children: Vec<(String, Rc<dyn Module>)>,
    seen: &mut HashSet<NodeKey>,
    out: &mut Vec<Parameter>,
) {
    for (_, param) in own {
        if seen.insert(param.key()) {
            out.push(param);
        }
    }
    for (_, child) in children {
        collect_parameters(child.named_parameters(), child.named_children(), seen, out);
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
