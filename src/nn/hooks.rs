/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06 10:15:37
 * @Description  : 前向观察钩子
 *
 * 每个模块持有一张钩子表，`Module::call` 在前向计算完成后按注册顺序触发。
 * 一次内省期间安装的钩子统一由 HookGuard 管理，保证无论成功失败都会被卸载。
 */

use super::GraphError;
use super::module::Module;
use super::var::Var;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// 钩子句柄，用于卸载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(u64);

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type ForwardHook = Rc<dyn Fn(&[Var], &Var) -> Result<(), GraphError>>;

/// 模块的前向钩子表
#[derive(Default)]
pub struct ForwardHooks {
    next_id: Cell<u64>,
    /// 正在触发的层数（钩子内再次调用本模块时可能大于 1）
    firing: Cell<usize>,
    hooks: RefCell<Vec<(HookHandle, ForwardHook)>>,
}

impl fmt::Debug for ForwardHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardHooks")
            .field("len", &self.len())
            .finish()
    }
}

impl ForwardHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册钩子，回调参数为本次调用的输入与输出
    pub fn register<F>(&self, hook: F) -> HookHandle
    where
        F: Fn(&[Var], &Var) -> Result<(), GraphError> + 'static,
    {
        let handle = HookHandle(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.hooks.borrow_mut().push((handle, Rc::new(hook)));
        handle
    }

    /// 卸载钩子（不允许在钩子触发期间卸载）
    pub fn remove(&self, handle: HookHandle) -> Result<(), GraphError> {
        if self.firing.get() > 0 {
            return Err(GraphError::HookLifecycle {
                failed: 1,
                total: 1,
                detail: format!("钩子{handle}在触发期间不可卸载"),
            });
        }
        let mut hooks = self.hooks.borrow_mut();
        let Some(pos) = hooks.iter().position(|(h, _)| *h == handle) else {
            return Err(GraphError::HookLifecycle {
                failed: 1,
                total: 1,
                detail: format!("钩子{handle}不存在或已被卸载"),
            });
        };
        hooks.remove(pos);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.borrow().is_empty()
    }

    /// 按注册顺序触发，遇到第一个出错的钩子即停止
    pub(crate) fn fire(&self, inputs: &[Var], output: &Var) -> Result<(), GraphError> {
        let snapshot: Vec<ForwardHook> = self
            .hooks
            .borrow()
            .iter()
            .map(|(_, hook)| Rc::clone(hook))
            .collect();
        self.firing.set(self.firing.get() + 1);
        let result = snapshot.iter().try_for_each(|hook| hook(inputs, output));
        self.firing.set(self.firing.get() - 1);
        result
    }
}

/// 一批已安装钩子的守卫
///
/// 应显式调用 `release()` 以拿到卸载结果；
/// 若未调用就被丢弃，会在 Drop 中尽力卸载并记录警告。
#[derive(Default)]
pub struct HookGuard {
    installed: Vec<(Rc<dyn Module>, HookHandle)>,
}

impl HookGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在模块上安装钩子并纳入管理
    pub fn install<F>(&mut self, module: &Rc<dyn Module>, hook: F) -> HookHandle
    where
        F: Fn(&[Var], &Var) -> Result<(), GraphError> + 'static,
    {
        let handle = module.hooks().register(hook);
        self.installed.push((Rc::clone(module), handle));
        handle
    }

    /// 仍由本守卫管理的钩子数
    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    /// 卸载全部钩子；个别失败不影响其余钩子的卸载，失败汇总后返回
    pub fn release(mut self) -> Result<(), GraphError> {
        self.release_all()
    }

    fn release_all(&mut self) -> Result<(), GraphError> {
        let total = self.installed.len();
        let failures: Vec<String> = self
            .installed
            .drain(..)
            .filter_map(|(module, handle)| module.hooks().remove(handle).err())
            .map(|e| e.to_string())
            .collect();
        if failures.is_empty() {
            log::debug!("已卸载{total}个钩子");
            return Ok(());
        }
        Err(GraphError::HookLifecycle {
            failed: failures.len(),
            total,
            detail: failures.join("；"),
        })
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        if self.installed.is_empty() {
            return;
        }
        if let Err(e) = self.release_all() {
            log::warn!("丢弃 HookGuard 时卸载钩子失败：{e}");
        }
    }
}
