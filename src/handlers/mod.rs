//! HTTP 处理器
//!
//! 每个处理器解析请求、调用核心库、输出统一响应。
//! 数据库与文件操作是阻塞调用，统一放到 `spawn_blocking` 中执行。

pub mod health;
pub mod prompts;
pub mod tags;

use imgprompts_core::models::{PaginationParams, DEFAULT_PAGE_SIZE};

use crate::binding::FormFields;
use crate::utils::{ApiError, ApiResult, AppResult};

/// 在阻塞线程池中执行核心库调用
pub async fn run_blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("后台任务失败: {}", e)))?
        .map_err(ApiError::from)
}

/// 解析路径中的 ID
pub fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("无效的ID".to_string()))
}

/// 宽松的分页参数：缺失或非法时使用默认值并收敛到合法范围
pub fn lenient_pagination(query: &FormFields) -> PaginationParams {
    PaginationParams::new(
        query.parse_lenient::<u32>("page").unwrap_or(1),
        query.parse_lenient::<u32>("page_size").unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .clamped()
}
