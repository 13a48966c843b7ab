//! 配置文件服务
//!
//! 负责配置的读取、保存和管理

use crate::models::AppSettings;
use crate::utils::error::AppError;
use std::fs;
use std::path::PathBuf;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// 设置管理器
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// 从指定路径创建设置管理器
    pub fn from_path(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// 加载设置，文件不存在时返回默认设置
    pub fn load(&self) -> Result<AppSettings, AppError> {
        if !self.settings_path.exists() {
            tracing::info!("配置文件 {:?} 不存在，使用默认配置", self.settings_path);
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| AppError::Config(format!("无法读取配置文件: {}", e)))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("配置文件格式错误: {}", e)))?;

        tracing::info!("成功加载配置: {:?}", self.settings_path);
        Ok(settings)
    }

    /// 保存设置
    pub fn save(&self, settings: &AppSettings) -> Result<(), AppError> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::Config(format!("无法创建配置目录: {}", e)))?;
            }
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Config(format!("无法序列化配置: {}", e)))?;

        fs::write(&self.settings_path, content)
            .map_err(|e| AppError::Config(format!("无法保存配置文件: {}", e)))?;

        tracing::info!("成功保存配置: {:?}", self.settings_path);
        Ok(())
    }

    /// 重置为默认设置
    pub fn reset(&self) -> Result<AppSettings, AppError> {
        let default_settings = AppSettings::default();
        self.save(&default_settings)?;
        Ok(default_settings)
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &PathBuf {
        &self.settings_path
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::DEFAULT_MAX_FILE_SIZE;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.server.public_base_url.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"server":{"port":9000}}"#).unwrap();

        let settings = SettingsManager::from_path(&path).load().unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database, AppSettings::default().database);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            SettingsManager::from_path(&path).load(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_settings_manager_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let manager = SettingsManager::from_path(tmp.path().join("conf").join("config.json"));

        let settings = manager.load().unwrap();
        assert_eq!(settings, AppSettings::default());

        let mut changed = settings.clone();
        changed.server.public_base_url = Some("https://img.example.com".into());
        manager.save(&changed).unwrap();
        assert_eq!(manager.load().unwrap(), changed);

        assert_eq!(manager.reset().unwrap(), AppSettings::default());
    }
}
