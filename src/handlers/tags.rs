//! 标签接口

use axum::extract::{Path, State};
use axum::Json;

use imgprompts_core::models::{Tag, TagStats};

use crate::binding::{CreateTagRequest, FormFields, Payload};
use crate::utils::{message_only, success, success_with_message, ApiError, ApiResponse, ApiResult};
use crate::AppState;

use super::{parse_id, run_blocking};

/// 创建标签，同名标签已存在时直接返回
pub async fn create_tag(
    State(state): State<AppState>,
    Payload(req): Payload<CreateTagRequest>,
) -> ApiResult<Json<ApiResponse<Tag>>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("请提供标签名称".to_string()));
    }

    let db = state.db.clone();
    let tag = run_blocking(move || db.create_tag(&req.name)).await?;
    Ok(success_with_message("创建成功", tag))
}

/// 获取所有标签
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Tag>>>> {
    let db = state.db.clone();
    let tags = run_blocking(move || db.get_all_tags()).await?;
    Ok(success(tags))
}

/// 按名称模糊搜索标签
pub async fn search_tags(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<Vec<Tag>>>> {
    let keyword = query.get("keyword").unwrap_or_default().to_string();

    let db = state.db.clone();
    let tags = run_blocking(move || db.search_tags(&keyword)).await?;
    Ok(success(tags))
}

/// 标签统计
pub async fn tag_stats(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<TagStats>>> {
    let db = state.db.clone();
    let stats = run_blocking(move || db.tag_stats()).await?;
    Ok(success(stats))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Tag>>> {
    let id = parse_id(&id)?;

    let db = state.db.clone();
    let tag = run_blocking(move || db.get_tag(id)).await?;
    Ok(success(tag))
}

/// 删除标签，仍被提示词引用时返回 409
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id = parse_id(&id)?;

    let db = state.db.clone();
    run_blocking(move || db.delete_tag(id)).await?;
    Ok(message_only("删除成功"))
}
