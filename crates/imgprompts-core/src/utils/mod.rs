//! imgprompts 工具模块
//!
//! 包含错误类型与通用工具函数

pub mod error;
pub mod sanitize;

pub use error::*;
pub use sanitize::*;
