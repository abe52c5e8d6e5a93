/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-08 11:36:02
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::functional::{FunctionalGraph, FunctionalGraphBuilder};
use super::ident::Identifier;
use super::recorder::ActivationRecorder;
use super::tree::ModuleTree;
use crate::data::DataLoader;
use crate::nn::descriptor::{ForwardReport, GraphDescriptor, GraphSnapshot};
use crate::nn::display::format_module_tree;
use crate::nn::hooks::HookGuard;
use crate::nn::module::Module;
use crate::nn::var::Var;
use crate::tensor::{NestedArray, Tensor};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// 一次内省前向期间，钩子与 Graph 共享的构建状态
struct BuildState {
    builder: FunctionalGraphBuilder,
    recorder: ActivationRecorder,
}

/// Graph - 模型计算图的内省句柄
///
/// # 设计原则
/// - 模块树在构造时注册一次，之后不变
/// - 函数图与激活值在每次内省前向时重建，旧快照随之丢弃
/// - 标识符全程只增不复用：`prev_id` 记录最后分配的标识符
/// - 内省前向需要 `&mut self`，同一个 Graph 上的多次构建天然串行
///
/// # 使用示例
/// ```ignore
/// let model: Rc<dyn Module> = Rc::new(Sequential::new(vec![...]));
/// let mut graph = Graph::new(model)?.with_name("mlp");
/// let report = graph.instrumented_forward(Some(&[x]))?;
/// println!("{}", report.to_json()?);
/// ```
pub struct Graph {
    name: String,
    root: Rc<dyn Module>,
    tree: Rc<ModuleTree>,
    prev_id: Identifier,
    functional: Option<FunctionalGraph>,
    loader: Option<DataLoader>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 注册模型的模块树并创建句柄
    pub fn new(root: Rc<dyn Module>) -> Result<Self, GraphError> {
        let (tree, prev_id) = ModuleTree::register(&root)?;
        let name = root.subtype();
        Ok(Self {
            name,
            root,
            tree: Rc::new(tree),
            prev_id,
            functional: None,
            loader: None,
        })
    }

    /// 配置数据加载器：未给出输入时取其第一个批次
    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// 设置图名称（默认为根模块类型名）
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ==================== 访问 ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Rc<dyn Module> {
        &self.root
    }

    pub fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    /// 最近一次内省前向的函数图
    pub const fn functional_graph(&self) -> Option<&FunctionalGraph> {
        self.functional.as_ref()
    }

    /// 最后分配的标识符
    pub const fn prev_id(&self) -> Identifier {
        self.prev_id
    }

    // ==================== 序列化 ====================

    /// 模块树与当前函数图的扁平快照
    pub fn serialize(&self) -> GraphSnapshot {
        GraphSnapshot::from_parts(&self.tree, self.functional.as_ref())
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        self.serialize().to_json()
    }

    /// 带名称、输入与参数量的完整描述
    pub fn describe(&self) -> GraphDescriptor {
        let input_vars = self
            .functional
            .as_ref()
            .map(|f| f.inputs().to_vec())
            .unwrap_or_default();
        GraphDescriptor::new(
            &self.name,
            input_vars,
            self.tree.total_params(),
            self.serialize(),
        )
    }

    /// 模块树的文本摘要
    pub fn summary(&self) -> String {
        format!("{}\n{}", self.name, format_module_tree(&self.tree))
    }

    // ==================== 内省前向 ====================

    /// 执行一次前向，记录所有模块的激活
    pub fn instrumented_forward(
        &mut self,
        inputs: Option<&[Tensor]>,
    ) -> Result<ForwardReport, GraphError> {
        self.instrumented_forward_targets(inputs, None)
    }

    /// 执行一次前向，只返回 `targets` 中模块的激活（None 为全部）
    ///
    /// 无论成功失败，返回前都已卸载本次安装的全部钩子。
    pub fn instrumented_forward_targets(
        &mut self,
        inputs: Option<&[Tensor]>,
        targets: Option<&[Identifier]>,
    ) -> Result<ForwardReport, GraphError> {
        let targets = targets.map(|ids| self.resolve_targets(ids)).transpose()?;
        let inputs = self.resolve_inputs(inputs)?;
        self.functional = None;

        let mut builder = FunctionalGraphBuilder::new(Rc::clone(&self.tree), self.prev_id);
        let vars: Vec<Var> = inputs.iter().map(Var::input).collect();
        for var in &vars {
            builder.add_input(var)?;
        }
        let state = Rc::new(RefCell::new(BuildState {
            builder,
            recorder: ActivationRecorder::new(),
        }));

        let mut guard = HookGuard::new();
        for (id, module) in self.tree.handles() {
            let id = *id;
            let state = Rc::clone(&state);
            guard.install(module, move |inputs, output| {
                let mut state = state.try_borrow_mut().map_err(|_| {
                    GraphError::InvalidOperation(format!("模块`{id}`的钩子重入了构建状态"))
                })?;
                state.builder.register(output.node(), Some(id))?;
                state.recorder.record(id, inputs, output);
                Ok(())
            });
        }
        log::debug!("已安装{}个前向钩子", guard.len());

        let forward = self.root.call(&vars);
        let released = guard.release();
        let last = state.borrow().builder.last_issued();
        self.advance(last);

        let output = match (forward, released) {
            (Ok(output), Ok(())) => output,
            (Ok(_), Err(hook_err)) => return Err(hook_err),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(hook_err)) => {
                log::warn!("前向失败后卸载钩子也失败：{hook_err}");
                return Err(e);
            }
        };

        let BuildState {
            mut builder,
            mut recorder,
        } = Rc::try_unwrap(state)
            .map_err(|_| GraphError::HookLifecycle {
                failed: 0,
                total: self.tree.handles().len(),
                detail: "构建状态仍被钩子持有".to_string(),
            })?
            .into_inner();

        let added = builder.add_output(&output);
        self.advance(builder.last_issued());
        added?;
        let (functional, _) = builder.finish();

        if let Some(targets) = &targets {
            recorder.retain(targets);
        }
        let report = ForwardReport {
            activations: recorder.into_activations(),
            functional_graph: GraphSnapshot::from_functional(&functional),
            result: NestedArray(output.value().clone()),
        };
        self.functional = Some(functional);
        Ok(report)
    }

    fn resolve_inputs(&self, inputs: Option<&[Tensor]>) -> Result<Vec<Tensor>, GraphError> {
        if let Some(inputs) = inputs {
            return Ok(inputs.to_vec());
        }
        let Some(loader) = &self.loader else {
            return Err(GraphError::MissingInput(
                "未给出输入，且没有配置数据加载器".to_string(),
            ));
        };
        loader
            .first_inputs()
            .map(|batch| vec![batch])
            .ok_or_else(|| GraphError::MissingInput("数据加载器没有任何批次".to_string()))
    }

    fn resolve_targets(&self, ids: &[Identifier]) -> Result<BTreeSet<Identifier>, GraphError> {
        ids.iter()
            .map(|&id| {
                if self.tree.module(id).is_some() {
                    Ok(id)
                } else {
                    Err(GraphError::UnknownIdentifier(id))
                }
            })
            .collect()
    }

    fn advance(&mut self, last: Option<Identifier>) {
        if let Some(last) = last {
            self.prev_id = self.prev_id.max(last);
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
