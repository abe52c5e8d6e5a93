/*
 * @Author       : 老董
 * @Date         : 2026-01-28
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06 14:27:10
 * @Description  : 模块树：静态注册模块与参数
 *
 * 注册分两步：
 * 1. 按“先自身、后子模块”的顺序给所有（去重后的）参数编号；
 * 2. 自顶向下给模块编号（父模块编号总小于子孙），子模块全部注册完后，
 *    把仍未被认领的直接参数归属给当前模块。
 * 于是每个参数恰好归属于一个模块：直接持有它的最底层模块。
 */

use super::GraphError;
use super::ident::{Identifier, IdentifierSequence};
use crate::nn::module::Module;
use crate::nn::nodes::{NodeKey, Parameter};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

/// 模块节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    pub id: Identifier,
    pub subtype: String,
    /// 归属于本模块的参数：局部名 → 参数标识符
    pub params: Vec<(String, Identifier)>,
    /// 子模块：局部名 → 模块标识符
    pub children: Vec<(String, Identifier)>,
}

/// 参数节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNode {
    pub id: Identifier,
    pub element_type: &'static str,
    pub shape: Vec<usize>,
}

impl ParameterNode {
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

/// 模块树（构造后不可变）
pub struct ModuleTree {
    root: Identifier,
    modules: BTreeMap<Identifier, ModuleNode>,
    parameters: BTreeMap<Identifier, ParameterNode>,
    module_ids: HashMap<NodeKey, Identifier>,
    param_ids: HashMap<NodeKey, Identifier>,
    /// 按注册顺序持有的模块句柄（用于安装钩子，同时保证地址不被复用）
    handles: Vec<(Identifier, Rc<dyn Module>)>,
    /// 持有参数句柄，保证地址不被复用
    pinned: Vec<Parameter>,
}

impl fmt::Debug for ModuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleTree")
            .field("root", &self.root)
            .field("modules", &self.modules)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl ModuleTree {
    /// 注册整棵模块树，返回模块树与最后分配的标识符（后续动态编号从其之后继续）
    pub fn register(root: &Rc<dyn Module>) -> Result<(Self, Identifier), GraphError> {
        let mut ids = IdentifierSequence::new();
        let mut tree = Self {
            root: Identifier::FIRST,
            modules: BTreeMap::new(),
            parameters: BTreeMap::new(),
            module_ids: HashMap::new(),
            param_ids: HashMap::new(),
            handles: Vec::new(),
            pinned: Vec::new(),
        };

        for param in root.parameters() {
            let id = ids.allocate()?;
            tree.param_ids.insert(param.key(), id);
            tree.parameters.insert(
                id,
                ParameterNode {
                    id,
                    element_type: param.element_type(),
                    shape: param.shape(),
                },
            );
            tree.pinned.push(param);
        }

        let mut unclaimed: BTreeSet<Identifier> = tree.parameters.keys().copied().collect();
        tree.root = tree.register_module(root, &mut ids, &mut unclaimed)?;

        // 根模块一定分配了标识符
        let last = ids.last_issued().unwrap_or(tree.root);
        log::debug!(
            "模块树注册完成：{}个模块，{}个参数，最后标识符`{last}`",
            tree.modules.len(),
            tree.parameters.len()
        );
        Ok((tree, last))
    }

    fn register_module(
        &mut self,
        module: &Rc<dyn Module>,
        ids: &mut IdentifierSequence,
        unclaimed: &mut BTreeSet<Identifier>,
    ) -> Result<Identifier, GraphError> {
        let key = NodeKey::of_rc(module);
        if let Some(&id) = self.module_ids.get(&key) {
            return Ok(id);
        }
        let id = ids.allocate()?;
        self.module_ids.insert(key, id);
        self.handles.push((id, Rc::clone(module)));

        let mut children = Vec::new();
        for (name, child) in module.named_children() {
            children.push((name, self.register_module(&child, ids, unclaimed)?));
        }

        // 子孙已认领的参数不再出现在 unclaimed 中
        let mut params = Vec::new();
        for (name, param) in module.named_parameters() {
            let param_id = self.parameter_id(&param).ok_or_else(|| {
                GraphError::UnrecognizedNodeType {
                    kind: "Parameter".to_string(),
                    detail: format!("模块`{id}`的参数`{name}`未出现在参数遍历中"),
                }
            })?;
            if unclaimed.remove(&param_id) {
                params.push((name, param_id));
            }
        }

        self.modules.insert(
            id,
            ModuleNode {
                id,
                subtype: module.subtype(),
                params,
                children,
            },
        );
        Ok(id)
    }

    pub const fn root(&self) -> Identifier {
        self.root
    }

    pub const fn modules(&self) -> &BTreeMap<Identifier, ModuleNode> {
        &self.modules
    }

    pub const fn parameters(&self) -> &BTreeMap<Identifier, ParameterNode> {
        &self.parameters
    }

    pub fn module(&self, id: Identifier) -> Option<&ModuleNode> {
        self.modules.get(&id)
    }

    pub fn parameter(&self, id: Identifier) -> Option<&ParameterNode> {
        self.parameters.get(&id)
    }

    /// 按身份查找参数的标识符
    pub fn parameter_id(&self, param: &Parameter) -> Option<Identifier> {
        self.param_ids.get(&param.key()).copied()
    }

    /// 按身份查找模块的标识符
    pub fn module_id(&self, module: &Rc<dyn Module>) -> Option<Identifier> {
        self.module_ids.get(&NodeKey::of_rc(module)).copied()
    }

    pub(crate) fn module_id_by_key(&self, key: NodeKey) -> Option<Identifier> {
        self.module_ids.get(&key).copied()
    }

    pub(crate) fn handles(&self) -> &[(Identifier, Rc<dyn Module>)] {
        &self.handles
    }

    /// 参数元素总数
    pub fn total_params(&self) -> usize {
        self.parameters.values().map(ParameterNode::size).sum()
    }
}
