//! 比较操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 样式规则比较操作符
///
/// 未识别的操作符反序列化为 `Unknown`，评估时始终不匹配。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperation {
    // 字符串比较
    #[default]
    Eq,
    Neq,

    // 数值比较
    Gt,
    Gte,
    Lt,
    Lte,

    // 正则匹配
    Regex,

    #[serde(other)]
    Unknown,
}

impl ComparisonOperation {
    /// 是否为数值有序比较
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for ComparisonOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Regex => "regex",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
