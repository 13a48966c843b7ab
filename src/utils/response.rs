//! 统一响应结构

use axum::Json;
use serde::Serialize;

/// 统一响应数据结构 `{code, message, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 成功响应
pub fn success<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    success_with_message("success", data)
}

/// 带消息的成功响应
pub fn success_with_message<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 200,
        message: message.to_string(),
        data: Some(data),
    })
}

/// 只有消息的成功响应
pub fn message_only(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        code: 200,
        message: message.to_string(),
        data: None,
    })
}
