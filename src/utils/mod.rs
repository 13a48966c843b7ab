//! HTTP 层工具模块

pub mod error;
pub mod response;

pub use error::{ApiError, ApiResult, AppError, AppResult};
pub use response::{message_only, success, success_with_message, ApiResponse};
