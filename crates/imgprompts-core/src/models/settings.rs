//! 服务配置数据模型

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认单文件大小上限（10 MiB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// HTTP 服务设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 上传文件保存目录
    pub upload_path: PathBuf,
    /// 单个上传文件的大小上限（字节）
    pub max_file_size: u64,
    /// 对外访问地址，例如 `https://img.example.com`；为空时根据请求的 Host 头生成
    pub public_base_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            upload_path: PathBuf::from("./uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            public_base_url: None,
        }
    }
}

impl ServerSettings {
    /// 监听地址字符串 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite 文件路径
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/imgprompts.db"),
        }
    }
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// 日志级别（trace/debug/info/warn/error）
    pub level: String,
    /// 日志文件路径，按天滚动；为空时只输出到终端
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file: None,
        }
    }
}

/// 应用程序设置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LogSettings,
}
