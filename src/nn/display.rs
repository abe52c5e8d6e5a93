/*
 * @Author       : 老董
 * @Date         : 2024-02-04 20:37:13
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-08 09:58:30
 * @Description  : 模块树的文本格式化
 */

use super::graph::{Identifier, ModuleTree};
use std::collections::HashSet;
use std::fmt::Write;

/// 把模块树格式化为缩进文本，每行形如：
///
/// ```text
/// [b] Sequential
///   0 [c] Linear  weight[a]=[2, 3] bias[...]=[1, 3]
/// ```
///
/// 共享的子模块第二次出现时只标注“共享”，不再展开。
pub(in crate::nn) fn format_module_tree(tree: &ModuleTree) -> String {
    let mut out = String::new();
    let mut visited = HashSet::new();
    write_module(tree, tree.root(), None, 0, &mut visited, &mut out);
    out
}

fn write_module(
    tree: &ModuleTree,
    id: Identifier,
    name: Option<&str>,
    depth: usize,
    visited: &mut HashSet<Identifier>,
    out: &mut String,
) {
    let Some(module) = tree.module(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let label = name.map(|n| format!("{n} ")).unwrap_or_default();
    // 写入 String 不会失败
    let _ = write!(out, "{indent}{label}[{id}] {}", module.subtype);
    if !visited.insert(id) {
        let _ = writeln!(out, "（共享）");
        return;
    }
    for (param_name, param_id) in &module.params {
        if let Some(param) = tree.parameter(*param_id) {
            let _ = write!(out, "  {param_name}[{param_id}]={:?}", param.shape);
        }
    }
    out.push('\n');
    for (child_name, child_id) in &module.children {
        write_module(tree, *child_id, Some(child_name), depth + 1, visited, out);
    }
}
