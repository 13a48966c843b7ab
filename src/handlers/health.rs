//! 服务状态

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

use super::run_blocking;

/// 欢迎信息
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Image Generate Prompts API",
        "version": env!("CARGO_PKG_VERSION"),
        "features": ["提示词管理", "标签系统", "图片上传", "搜索功能", "统计信息", "智能分析"],
        "endpoints": {
            "health": "/health",
            "db_status": "/db-status",
            "api": "/api/v1",
            "prompts": "/api/v1/prompts",
            "tags": "/api/v1/tags",
            "uploads": "/uploads",
        },
    }))
}

/// 健康检查
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Image Generate Prompts API is running",
    }))
}

/// 数据库连接检查
pub async fn db_status(State(state): State<AppState>) -> Response {
    let db = state.db.clone();

    match run_blocking(move || db.ping()).await {
        Ok(()) => Json(json!({
            "status": "connected",
            "message": "Database connection is healthy",
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("数据库连接检查失败: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "disconnected",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
