//! imgprompts 错误处理模块
//!
//! 定义应用程序错误类型，以及错误到 HTTP 状态码的映射

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 参数校验失败
    #[error("参数验证失败: {0}")]
    Validation(String),

    /// 记录不存在
    #[error("{0}")]
    NotFound(String),

    /// 操作与现有数据冲突（例如标签仍被引用）
    #[error("{0}")]
    Conflict(String),

    /// 不支持的格式
    #[error("不支持的文件类型: {0}")]
    UnsupportedFormat(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 通用错误
    #[error("{0}")]
    General(String),
}

impl AppError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::UnsupportedFormat(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Config(_)
            | AppError::General(_) => 500,
        }
    }
}

/// 判断 rusqlite 错误是否为 UNIQUE 约束冲突（并发 get-or-create 时会出现）
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;
