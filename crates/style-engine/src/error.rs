//! 样式引擎错误类型
//!
//! 仅用于配置加载与图层管理边界；规则匹配与样式解析本身不会产生错误。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("无效的图层配置: {0}")]
    InvalidConfig(String),

    #[error("图层未找到: {0}")]
    LayerNotFound(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StyleError>;
