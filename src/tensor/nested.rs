/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 张量 → 嵌套数组（JSON 字面量）
 *
 * 前端查看器只认识嵌套的纯数列表，故这里不使用 ndarray 自带的 serde 格式
 * （后者是 {v, dim, data} 的扁平结构）。
 */

use super::Tensor;
use ndarray::{ArrayViewD, Axis};
use serde::{Serialize, Serializer};
use serde_json::Value;

impl Tensor {
    /// 转为嵌套的纯数序列：0阶张量为单个数，1阶为`[..]`，2阶为`[[..], ..]`，以此类推
    pub fn to_nested(&self) -> Value {
        nest(self.data.view())
    }
}

fn nest(view: ArrayViewD<'_, f32>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, |&x| number(x));
    }
    if view.ndim() == 1 {
        return Value::Array(view.iter().map(|&x| number(x)).collect());
    }
    Value::Array(view.axis_iter(Axis(0)).map(nest).collect())
}

// NaN/Inf 在 JSON 中无法表示，按 JSON 惯例写为 null
fn number(x: f32) -> Value {
    serde_json::Number::from_f64(f64::from(x)).map_or(Value::Null, Value::Number)
}

/// 以嵌套数组形式序列化的张量（用于激活值、前向结果等对外输出）
#[derive(Debug, Clone, PartialEq)]
pub struct NestedArray(pub Tensor);

impl Serialize for NestedArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_nested().serialize(serializer)
    }
}
