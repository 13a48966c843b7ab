//! imgprompts 服务模块
//!
//! 包含上传存储、智能分析和配置管理

pub mod analyzer;
pub mod settings;
pub mod uploads;

pub use analyzer::{encode_image, MockAnalyzer, PromptAnalyzer};
pub use settings::{SettingsManager, DEFAULT_CONFIG_PATH};
pub use uploads::{UploadBatch, UploadStore, ALLOWED_IMAGE_EXTENSIONS};
