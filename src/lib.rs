//! imgprompts - AI 图像生成提示词管理服务
//!
//! 基于 axum + SQLite 构建，存储与业务逻辑在 `imgprompts-core` 中

pub mod binding;
pub mod handlers;
pub mod logging;
pub mod utils;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use imgprompts_core::{Database, MockAnalyzer, PromptAnalyzer, UploadStore};

use handlers::{health, prompts, tags};

/// 一次上传请求最多携带的文件数，用于计算请求体上限
const MAX_FILES_PER_REQUEST: u64 = 10;

/// 应用程序状态
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub uploads: Arc<UploadStore>,
    pub analyzer: Arc<dyn PromptAnalyzer>,
    /// 上传文件访问地址的前缀，未配置时按请求 Host 生成
    pub public_base_url: Option<String>,
}

impl AppState {
    /// 使用模拟分析器创建状态
    pub fn new(db: Database, uploads: UploadStore) -> Self {
        Self {
            db: Arc::new(db),
            uploads: Arc::new(uploads),
            analyzer: Arc::new(MockAnalyzer::new()),
            public_base_url: None,
        }
    }

    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url.filter(|s| !s.trim().is_empty());
        self
    }
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(upload_body_limit(state.uploads.max_file_size()));
    let upload_dir = ServeDir::new(state.uploads.root());

    let api = Router::new()
        // 集合路径同时接受带和不带结尾斜杠的形式
        .route("/api/v1/tags", tag_collection())
        .route("/api/v1/tags/", tag_collection())
        .route("/api/v1/tags/search", get(tags::search_tags))
        .route("/api/v1/tags/stats", get(tags::tag_stats))
        .route("/api/v1/tags/:id", get(tags::get_tag).delete(tags::delete_tag))
        .route("/api/v1/prompts", prompt_collection())
        .route("/api/v1/prompts/", prompt_collection())
        .route(
            "/api/v1/prompts/upload",
            post(prompts::upload_prompt).layer(upload_limit.clone()),
        )
        .route(
            "/api/v1/prompts/analyze",
            post(prompts::analyze_prompt).layer(upload_limit),
        )
        .route("/api/v1/prompts/public", get(prompts::list_public_prompts))
        .route("/api/v1/prompts/recent", get(prompts::recent_prompts))
        .route("/api/v1/prompts/stats", get(prompts::prompt_stats))
        .route("/api/v1/prompts/search/tags", get(prompts::search_prompts_by_tags))
        .route("/api/v1/prompts/check-duplicate", get(prompts::check_duplicate))
        .route(
            "/api/v1/prompts/:id",
            get(prompts::get_prompt)
                .put(prompts::update_prompt)
                .delete(prompts::delete_prompt),
        );

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/db-status", get(health::db_status))
        .merge(api)
        .nest_service("/uploads", upload_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn tag_collection() -> MethodRouter<AppState> {
    post(tags::create_tag).get(tags::list_tags)
}

fn prompt_collection() -> MethodRouter<AppState> {
    post(prompts::create_prompt).get(prompts::list_prompts)
}

/// multipart 请求体上限：允许多个满额文件加上表单字段
fn upload_body_limit(max_file_size: u64) -> usize {
    let limit = max_file_size
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(1024 * 1024);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_body_limit() {
        assert_eq!(upload_body_limit(1024), 10 * 1024 + 1024 * 1024);
        assert_eq!(upload_body_limit(u64::MAX), usize::MAX);
    }
}
