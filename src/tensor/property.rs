/*
 * @Author       : 老董
 * @Date         : 2023-10-21 03:22:26
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03 10:12:40
 */

use super::{ELEMENT_TYPE, Tensor};

impl Tensor {
    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 元素类型名称
    pub const fn element_type(&self) -> &'static str {
        ELEMENT_TYPE
    }

    /// 按行优先顺序拷贝出所有元素
    pub fn data_as_slice(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 转化为纯数（number）。若为标量，则返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }
}
