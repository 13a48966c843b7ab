//! 提示词数据模型

use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// 输出图片缺省占位地址
pub const PLACEHOLDER_OUTPUT_IMAGE: &str = "/uploads/placeholder.jpg";

/// 提示词（数据库行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    /// 软删除时间
    pub deleted_at: Option<String>,
    /// 正面提示词
    pub prompt_text: String,
    /// 负面提示词
    pub negative_prompt: String,
    /// 使用的模型名称
    pub model_name: String,
    /// 输入参照图，多个地址以逗号连接存储
    pub input_image_url: String,
    pub output_image_url: String,
    pub is_public: bool,
    pub style_description: String,
    pub usage_scenario: String,
    pub atmosphere_description: String,
    pub expressive_intent: String,
    /// 结构分析 JSON（保存前已规整为合法 JSON）
    pub structure_analysis: String,
    /// 关联标签（按关联顺序）
    pub tags: Vec<Tag>,
}

impl Prompt {
    /// 解析输入图片地址列表
    pub fn input_image_urls(&self) -> Vec<String> {
        split_image_urls(&self.input_image_url)
    }

    /// 转换为 API 响应结构
    pub fn into_response(self) -> PromptResponse {
        let input_image_urls = self.input_image_urls();
        let structure_analysis = serde_json::from_str(&self.structure_analysis)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));

        PromptResponse {
            id: self.id,
            created_at: self.created_at,
            prompt_text: self.prompt_text,
            negative_prompt: self.negative_prompt,
            model_name: self.model_name,
            input_image_urls,
            output_image_url: self.output_image_url,
            is_public: self.is_public,
            style_description: self.style_description,
            usage_scenario: self.usage_scenario,
            atmosphere_description: self.atmosphere_description,
            expressive_intent: self.expressive_intent,
            structure_analysis,
            tags: self.tags,
        }
    }
}

/// 提示词 API 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    pub id: i64,
    pub created_at: String,
    pub prompt_text: String,
    pub negative_prompt: String,
    pub model_name: String,
    pub input_image_urls: Vec<String>,
    pub output_image_url: String,
    pub is_public: bool,
    pub style_description: String,
    pub usage_scenario: String,
    pub atmosphere_description: String,
    pub expressive_intent: String,
    /// 原样嵌入的 JSON 对象
    pub structure_analysis: serde_json::Value,
    pub tags: Vec<Tag>,
}

/// 创建提示词参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePrompt {
    pub prompt_text: String,
    pub negative_prompt: String,
    pub model_name: String,
    pub is_public: bool,
    pub style_description: String,
    pub usage_scenario: String,
    pub atmosphere_description: String,
    pub expressive_intent: String,
    pub structure_analysis: String,
    pub input_image_urls: Vec<String>,
    /// 为空时使用占位图
    pub output_image_url: String,
    pub tag_names: Vec<String>,
}

impl CreatePrompt {
    /// 未提供输出图片时填入占位图地址
    pub fn with_placeholder_output(mut self) -> Self {
        if self.output_image_url.trim().is_empty() {
            self.output_image_url = PLACEHOLDER_OUTPUT_IMAGE.to_string();
        }
        self
    }
}

/// 更新提示词参数（稀疏更新，None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePrompt {
    pub prompt_text: Option<String>,
    pub negative_prompt: Option<String>,
    pub model_name: Option<String>,
    pub is_public: Option<bool>,
    pub style_description: Option<String>,
    pub usage_scenario: Option<String>,
    pub atmosphere_description: Option<String>,
    pub expressive_intent: Option<String>,
    pub structure_analysis: Option<String>,
    pub input_image_urls: Option<Vec<String>>,
    pub output_image_url: Option<String>,
    /// Some(空列表) 清空关联；None 保持不变
    pub tag_names: Option<Vec<String>>,
}

impl UpdatePrompt {
    /// 是否没有任何字段需要修改
    pub fn is_empty(&self) -> bool {
        self.prompt_text.is_none()
            && self.negative_prompt.is_none()
            && self.model_name.is_none()
            && self.is_public.is_none()
            && self.style_description.is_none()
            && self.usage_scenario.is_none()
            && self.atmosphere_description.is_none()
            && self.expressive_intent.is_none()
            && self.structure_analysis.is_none()
            && self.input_image_urls.is_none()
            && self.output_image_url.is_none()
            && self.tag_names.is_none()
    }
}

/// 按模型统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCount {
    pub model_name: String,
    pub count: i64,
}

/// 提示词统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptStats {
    pub total_prompts: i64,
    pub public_prompts: i64,
    pub private_prompts: i64,
    pub model_stats: Vec<ModelCount>,
}

/// 重复检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub count: usize,
    pub prompts: Vec<PromptResponse>,
}

/// 过滤空白并以逗号连接图片地址
pub fn join_image_urls<S: AsRef<str>>(urls: &[S]) -> String {
    urls.iter()
        .map(|u| u.as_ref().trim())
        .filter(|u| !u.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// 拆分逗号连接的图片地址
pub fn split_image_urls(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// 规整结构分析字段：空值或非法 JSON 一律存为 `{}`
pub fn normalize_structure_analysis(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == "\"\"" {
        return "{}".to_string();
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(_) => raw.to_string(),
        Err(_) => "{}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_urls_join_and_split() {
        let urls = vec![" http://a/1.png ", "", "http://a/2.png"];
        let joined = join_image_urls(&urls);
        assert_eq!(joined, "http://a/1.png,http://a/2.png");
        assert_eq!(
            split_image_urls(&joined),
            vec!["http://a/1.png".to_string(), "http://a/2.png".to_string()]
        );
        assert!(split_image_urls("").is_empty());
        assert!(split_image_urls(" , ,").is_empty());
    }

    #[test]
    fn test_normalize_structure_analysis() {
        assert_eq!(normalize_structure_analysis(""), "{}");
        assert_eq!(normalize_structure_analysis("\"\""), "{}");
        assert_eq!(normalize_structure_analysis("not json"), "{}");
        assert_eq!(
            normalize_structure_analysis(r#"{"subject":"cat"}"#),
            r#"{"subject":"cat"}"#
        );
    }

    #[test]
    fn test_into_response_embeds_json() {
        let prompt = Prompt {
            id: 1,
            created_at: "2024-01-01T00:00:00.000000Z".into(),
            updated_at: "2024-01-01T00:00:00.000000Z".into(),
            deleted_at: None,
            prompt_text: "a cat".into(),
            negative_prompt: String::new(),
            model_name: String::new(),
            input_image_url: "u1,u2".into(),
            output_image_url: "o".into(),
            is_public: false,
            style_description: String::new(),
            usage_scenario: String::new(),
            atmosphere_description: String::new(),
            expressive_intent: String::new(),
            structure_analysis: r#"{"k":1}"#.into(),
            tags: vec![],
        };
        let resp = prompt.into_response();
        assert_eq!(resp.input_image_urls, vec!["u1", "u2"]);
        assert_eq!(resp.structure_analysis["k"], 1);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdatePrompt::default().is_empty());
        let update = UpdatePrompt {
            tag_names: Some(vec![]),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
