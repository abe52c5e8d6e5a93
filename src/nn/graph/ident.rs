/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-06 09:41:55
 * @Description  : 节点标识符：按双射 26 进制编码的小写字母串
 *
 * 序号 1..=26 对应 "a".."z"，27 对应 "aa"，以此类推；
 * 标识符之间的大小比较即序号的大小比较，因此 "z" < "aa" < "az" < "ba"。
 */

use super::GraphError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// 节点标识符
///
/// 全序即分配序：后分配的标识符一定更大。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(NonZeroU64);

impl Identifier {
    /// 第一个标识符 "a"
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    /// 由序号构造（序号从 1 开始）
    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        NonZeroU64::new(ordinal).map(Self)
    }

    pub const fn ordinal(self) -> u64 {
        self.0.get()
    }

    /// 下一个标识符，序号溢出时返回 None
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n = self.0.get();
        let mut letters = Vec::new();
        while n > 0 {
            n -= 1;
            letters.push(b'a' + (n % 26) as u8);
            n /= 26;
        }
        letters.reverse();
        // 只含 ASCII 小写字母
        f.write_str(&String::from_utf8_lossy(&letters))
    }
}

impl FromStr for Identifier {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GraphError::InvalidIdentifier(s.to_string());
        if s.is_empty() {
            return Err(invalid());
        }
        let mut ordinal: u64 = 0;
        for b in s.bytes() {
            if !b.is_ascii_lowercase() {
                return Err(invalid());
            }
            ordinal = ordinal
                .checked_mul(26)
                .and_then(|n| n.checked_add(u64::from(b - b'a') + 1))
                .ok_or_else(invalid)?;
        }
        Self::from_ordinal(ordinal).ok_or_else(invalid)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct IdentifierVisitor;

impl Visitor<'_> for IdentifierVisitor {
    type Value = Identifier;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("由小写字母组成的标识符")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(IdentifierVisitor)
    }
}

/// 标识符序列：严格递增地分配标识符
///
/// 可以从任意已分配的标识符之后继续，用于让多次构建的编号段首尾相接。
#[derive(Debug, Clone, Default)]
pub struct IdentifierSequence {
    /// 上一个已分配的序号（0 表示尚未分配）
    prev: u64,
}

impl IdentifierSequence {
    /// 从 "a" 开始的新序列
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `last` 之后继续
    pub fn resume_after(last: Identifier) -> Self {
        Self {
            prev: last.ordinal(),
        }
    }

    /// 最近一次分配的标识符
    pub fn last_issued(&self) -> Option<Identifier> {
        Identifier::from_ordinal(self.prev)
    }

    /// 分配下一个标识符
    pub fn allocate(&mut self) -> Result<Identifier, GraphError> {
        self.next().ok_or(GraphError::IdentifierExhausted)
    }
}

impl Iterator for IdentifierSequence {
    type Item = Identifier;

    fn next(&mut self) -> Option<Identifier> {
        let ordinal = self.prev.checked_add(1)?;
        self.prev = ordinal;
        Identifier::from_ordinal(ordinal)
    }
}
