//! imgprompts 数据模型模块
//!
//! 包含所有数据结构定义

pub mod analysis;
pub mod prompt;
pub mod settings;
pub mod tag;

// 重新导出常用类型
pub use analysis::{AnalysisInput, AnalysisSuggestion};
pub use prompt::{
    CreatePrompt, DuplicateCheck, ModelCount, Prompt, PromptResponse, PromptStats, UpdatePrompt,
};
pub use settings::{AppSettings, DatabaseSettings, LogSettings, ServerSettings};
pub use tag::{Tag, TagStats, TagUsage, TAG_NAME_MAX_CHARS};

/// 默认每页数量
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// 最大每页数量
pub const MAX_PAGE_SIZE: u32 = 100;

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaginationParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// 将越界的页码和每页数量收敛到合法范围
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.page_size as i64
    }
}

/// 分页结果
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &PaginationParams) -> Self {
        let page_size = pagination.page_size.max(1) as i64;
        let total_pages = ((total + page_size - 1) / page_size) as u32;
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            total_pages,
        }
    }

    /// 转换条目类型，保留分页信息
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// 解析查询参数，只有 "asc" 为升序，其余都视为降序
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// 提示词排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptSortField {
    #[default]
    CreatedAt,
}

impl PromptSortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            PromptSortField::CreatedAt => "created_at",
        }
    }

    /// 不支持的字段返回 None，调用方回落到默认排序
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "created_at" => Some(PromptSortField::CreatedAt),
            _ => None,
        }
    }
}

/// 提示词排序选项
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct PromptSortOptions {
    pub field: PromptSortField,
    pub order: SortOrder,
}

/// 提示词列表过滤器
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PromptFilter {
    /// 模型名称（精确匹配）
    pub model_name: Option<String>,
    /// 是否公开
    pub is_public: Option<bool>,
    /// 关键词（匹配提示词、负面提示词、风格描述、适用场景）
    pub keyword: Option<String>,
    /// 标签名称，命中任意一个即可
    pub tag_names: Vec<String>,
}

/// 当前时间，RFC 3339 UTC 格式（微秒精度，可按字典序排序）
pub fn now_iso8601() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}
