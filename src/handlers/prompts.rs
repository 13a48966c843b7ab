//! 提示词接口

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;

use imgprompts_core::models::{
    AnalysisInput, AnalysisSuggestion, CreatePrompt, DuplicateCheck, PaginatedResult,
    PaginationParams, Prompt, PromptFilter, PromptResponse, PromptSortField, PromptSortOptions,
    PromptStats, SortOrder, UpdatePrompt, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use imgprompts_core::services::encode_image;
use imgprompts_core::UploadStore;

use crate::binding::{read_multipart, BindRequest, FormFields, MultipartForm, Payload};
use crate::utils::{message_only, success, success_with_message, ApiError, ApiResponse, ApiResult};
use crate::AppState;

use super::{lenient_pagination, parse_id, run_blocking};

type PromptPage = PaginatedResult<PromptResponse>;

// ==================== 创建 ====================

/// 创建提示词（JSON 或表单），未提供输出图片时使用占位图
pub async fn create_prompt(
    State(state): State<AppState>,
    Payload(req): Payload<CreatePrompt>,
) -> ApiResult<Json<ApiResponse<PromptResponse>>> {
    let req = req.with_placeholder_output();

    let db = state.db.clone();
    let prompt = run_blocking(move || db.create_prompt(&req)).await?;
    Ok(success_with_message("创建成功", prompt.into_response()))
}

/// 上传图片并创建提示词
///
/// 文件字段：`input_images[]`（可多个）、`output_image`，
/// 以及兼容字段 `reference_images[]`、`image`。
/// 文件先写入磁盘，提示词保存失败时本次写入的文件全部删除。
pub async fn upload_prompt(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<PromptResponse>>> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let form = read_multipart(multipart).await?;
    let mut req = CreatePrompt::from_form(&form.fields)?;
    let base_url = request_base_url(&state, &headers);

    tracing::debug!(
        "上传提示词: {} 个文件字段, 字段名 {:?}",
        form.files.len(),
        form.files.iter().map(|f| f.field.as_str()).collect::<Vec<_>>()
    );

    let db = state.db.clone();
    let uploads = state.uploads.clone();
    let prompt = run_blocking(move || {
        let mut batch = uploads.begin();

        for file in form.files("input_images").chain(form.files("reference_images")) {
            let filename = batch.save(&file.file_name, &file.data)?;
            req.input_image_urls.push(UploadStore::file_url(&base_url, &filename));
        }

        if let Some(file) = form
            .first_file("output_image")
            .or_else(|| form.first_file("image"))
        {
            let filename = batch.save(&file.file_name, &file.data)?;
            req.output_image_url = UploadStore::file_url(&base_url, &filename);
        }

        let prompt = db.create_prompt(&req)?;
        let saved = batch.commit();
        tracing::info!("提示词 {} 上传了 {} 个文件", prompt.id, saved.len());
        Ok(prompt)
    })
    .await?;

    Ok(success_with_message("创建成功", prompt.into_response()))
}

/// 上传文件访问地址的前缀：优先使用配置，否则取请求的 Host
fn request_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = state.public_base_url.as_deref() {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}

// ==================== 智能分析 ====================

/// 分析上传的图片和提示词，返回元数据建议
pub async fn analyze_prompt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<AnalysisSuggestion>>> {
    let multipart = multipart.map_err(|_| ApiError::BadRequest("请提供图片文件".to_string()))?;
    let form = read_multipart(multipart).await?;
    let input = analysis_input(&form);
    if input.prompt_text.trim().is_empty() {
        return Err(ApiError::BadRequest("请提供提示词文本".to_string()));
    }
    if input.output_image.is_empty() {
        return Err(ApiError::BadRequest("请提供输出图片".to_string()));
    }

    let analyzer = state.analyzer.clone();
    let suggestion = run_blocking(move || analyzer.analyze(&input)).await?;
    Ok(success_with_message("分析成功", suggestion))
}

fn analysis_input(form: &MultipartForm) -> AnalysisInput {
    let output_image = form
        .first_file("output_image")
        .map(|f| encode_image(&f.data))
        .unwrap_or_default();

    let input_images = form
        .files("input_images")
        .chain(form.files("reference_images"))
        .filter_map(|f| {
            if f.data.is_empty() {
                tracing::warn!("跳过无法读取的参考图: {}", f.file_name);
                None
            } else {
                Some(encode_image(&f.data))
            }
        })
        .collect();

    AnalysisInput {
        prompt_text: form.fields.get("prompt_text").unwrap_or_default().to_string(),
        model_name: form.fields.get("model_name").unwrap_or_default().to_string(),
        output_image,
        input_images,
    }
}

// ==================== 查询 ====================

/// 分页查询提示词
///
/// 查询参数：`page`、`page_size`、`model_name`、`is_public`、`keyword`、
/// `tag_names`（逗号分隔）、`sort_by`、`sort_order`
pub async fn list_prompts(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<PromptPage>>> {
    let pagination = strict_pagination(&query)?;

    let filter = PromptFilter {
        model_name: query.non_empty("model_name").map(str::to_string),
        is_public: query.bool("is_public")?,
        keyword: query.non_empty("keyword").map(str::to_string),
        tag_names: query.list("tag_names"),
    };

    let sort = PromptSortOptions {
        field: query
            .get("sort_by")
            .and_then(PromptSortField::parse)
            .unwrap_or_default(),
        order: query.get("sort_order").map(SortOrder::parse).unwrap_or_default(),
    };

    let db = state.db.clone();
    let page = run_blocking(move || db.list_prompts(&filter, &sort, &pagination)).await?;
    Ok(success(page.map(Prompt::into_response)))
}

/// 列表接口的分页参数：显式给出的非法值返回 400
fn strict_pagination(query: &FormFields) -> ApiResult<PaginationParams> {
    let page = query.parse::<u32>("page")?.unwrap_or(1);
    let page_size = query.parse::<u32>("page_size")?.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ApiError::BadRequest("page 必须大于等于 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::BadRequest(format!(
            "page_size 必须在 1 到 {} 之间",
            MAX_PAGE_SIZE
        )));
    }

    Ok(PaginationParams::new(page, page_size))
}

/// 公开提示词分页
pub async fn list_public_prompts(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<PromptPage>>> {
    let pagination = lenient_pagination(&query);

    let db = state.db.clone();
    let page = run_blocking(move || db.list_public_prompts(&pagination)).await?;
    Ok(success(page.map(Prompt::into_response)))
}

/// 按标签搜索提示词，`tags` 为逗号分隔的标签名
pub async fn search_prompts_by_tags(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<PromptPage>>> {
    let tags = query.list("tags");
    if tags.is_empty() {
        return Err(ApiError::BadRequest("请提供标签名称".to_string()));
    }
    let pagination = lenient_pagination(&query);

    let db = state.db.clone();
    let page = run_blocking(move || db.search_prompts_by_tags(&tags, &pagination)).await?;
    Ok(success(page.map(Prompt::into_response)))
}

/// 提示词统计
pub async fn prompt_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<PromptStats>>> {
    let db = state.db.clone();
    let stats = run_blocking(move || db.prompt_stats()).await?;
    Ok(success(stats))
}

/// 最近的公开提示词
pub async fn recent_prompts(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<Vec<PromptResponse>>>> {
    let limit = query.parse_lenient::<u32>("limit").unwrap_or_default();

    let db = state.db.clone();
    let prompts = run_blocking(move || db.recent_prompts(limit)).await?;
    Ok(success(prompts.into_iter().map(Prompt::into_response).collect()))
}

/// 检查完全相同的提示词文本
pub async fn check_duplicate(
    State(state): State<AppState>,
    query: FormFields,
) -> ApiResult<Json<ApiResponse<DuplicateCheck>>> {
    let prompt_text = match query.get("prompt_text") {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return Err(ApiError::BadRequest("请提供提示词文本".to_string())),
    };

    let db = state.db.clone();
    let result = run_blocking(move || db.duplicate_check(&prompt_text)).await?;
    Ok(success(result))
}

// ==================== 单条操作 ====================

pub async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<PromptResponse>>> {
    let id = parse_id(&id)?;

    let db = state.db.clone();
    let prompt = run_blocking(move || db.get_prompt(id)).await?;
    Ok(success(prompt.into_response()))
}

/// 部分更新，只修改请求中出现的字段
pub async fn update_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(update): Payload<UpdatePrompt>,
) -> ApiResult<Json<ApiResponse<PromptResponse>>> {
    let id = parse_id(&id)?;

    let db = state.db.clone();
    let prompt = run_blocking(move || db.update_prompt(id, &update)).await?;
    Ok(success_with_message("更新成功", prompt.into_response()))
}

/// 软删除
pub async fn delete_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id = parse_id(&id)?;

    let db = state.db.clone();
    run_blocking(move || db.delete_prompt(id)).await?;
    Ok(message_only("删除成功"))
}
