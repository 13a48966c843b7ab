//! 标签数据模型

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// 标签名称最大长度（字符数）
pub const TAG_NAME_MAX_CHARS: usize = 100;

/// 标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// 标签ID
    pub id: i64,
    /// 标签名
    pub name: String,
    /// 创建时间
    pub created_at: String,
}

impl Tag {
    /// 校验并规整标签名称（去除首尾空白）
    pub fn normalize_name(name: &str) -> AppResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("标签名称不能为空".to_string()));
        }
        if name.chars().count() > TAG_NAME_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "标签名称不能超过 {} 个字符",
                TAG_NAME_MAX_CHARS
            )));
        }
        Ok(name.to_string())
    }
}

/// 标签使用次数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUsage {
    pub tag_id: i64,
    pub tag_name: String,
    pub use_count: i64,
}

/// 标签统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagStats {
    pub total_tags: i64,
    /// 使用次数最多的标签（最多 10 个）
    pub popular_tags: Vec<TagUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(Tag::normalize_name("  风景 ").unwrap(), "风景");
        assert!(matches!(
            Tag::normalize_name("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_name_length_counts_chars() {
        let hundred = "标".repeat(TAG_NAME_MAX_CHARS);
        assert!(Tag::normalize_name(&hundred).is_ok());

        let too_long = "a".repeat(TAG_NAME_MAX_CHARS + 1);
        assert!(Tag::normalize_name(&too_long).is_err());
    }
}
