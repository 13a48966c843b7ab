//! HTTP 错误处理模块
//!
//! 把核心库的 `AppError` 包装为 HTTP 响应，统一输出 `{code, message}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub use imgprompts_core::utils::error::{AppError, AppResult};

use super::response::ApiResponse;

/// HTTP 层错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 核心库错误，状态码由错误类型决定
    #[error(transparent)]
    App(#[from] AppError),

    /// 请求格式错误
    #[error("{0}")]
    BadRequest(String),

    /// 依赖服务不可用
    #[error("{0}")]
    ServiceUnavailable(String),

    /// 服务器内部错误
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(e) => StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", message);
        }

        let body: ApiResponse<()> = ApiResponse {
            code: status.as_u16(),
            message,
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

/// 处理器结果类型别名
pub type ApiResult<T> = Result<T, ApiError>;
