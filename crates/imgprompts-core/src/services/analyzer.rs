//! 提示词智能分析
//!
//! [`PromptAnalyzer`] 是接入真实模型的接口；当前只有 [`MockAnalyzer`]，
//! 根据提示词中的关键词给出固定格式的建议。

use base64::Engine;
use regex::{Regex, RegexBuilder};

use crate::models::{AnalysisInput, AnalysisSuggestion};
use crate::utils::error::{AppError, AppResult};

/// 所有分析结果都带的基础标签
pub const BASE_TAG: &str = "AI生成";

const DEFAULT_NEGATIVE_PROMPT: &str =
    "ugly, blurry, low quality, pixelated, noise, distorted, watermark, text, bad anatomy";
const DEFAULT_STYLE: &str = "写实风格，细节丰富";
const DEFAULT_SCENARIO: &str = "适用于创意设计、社交媒体配图、概念展示";
const DEFAULT_ATMOSPHERE: &str = "自然、和谐的整体氛围";
const DEFAULT_INTENT: &str = "表现画面主体的特征与情绪";

/// 图片数据编码为 base64
pub fn encode_image(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// 提示词分析器
pub trait PromptAnalyzer: Send + Sync {
    /// 分析提示词和图片，返回元数据建议
    fn analyze(&self, input: &AnalysisInput) -> AppResult<AnalysisSuggestion>;
}

/// 关键词规则：命中后追加标签，并可覆盖风格描述
struct KeywordRule {
    subject: &'static str,
    pattern: Regex,
    tag: &'static str,
    style: Option<&'static str>,
}

const RULES: &[(&str, &str, &str, Option<&str>)] = &[
    ("人像", r"\b(portrait|person|woman|man|girl|boy)s?\b|人像|肖像|人物", "人物", Some("人像摄影风格，柔和布光")),
    ("风景", r"landscape|mountain|sunset|sunrise|ocean|forest|风景|山|日落|海", "风景", Some("风景摄影风格，广角构图")),
    ("动物", r"\b(cat|dog|bird|animal)s?\b|动物|猫|狗|鸟", "动物", None),
    ("动漫", r"anime|manga|cartoon|动漫|二次元|卡通", "动漫", Some("日系动漫风格，线条清晰")),
    ("科幻", r"cyberpunk|sci-?fi|futuristic|neon|赛博|科幻|未来", "科幻", Some("赛博朋克风格，霓虹灯光效果")),
    ("复古", r"vintage|retro|film grain|复古|胶片", "复古", None),
    ("建筑", r"architecture|building|city|skyline|建筑|城市", "建筑", None),
];

/// 模拟分析器
pub struct MockAnalyzer {
    rules: Vec<KeywordRule>,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalyzer {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .filter_map(|&(subject, pattern, tag, style)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(pattern) => Some(KeywordRule {
                        subject,
                        pattern,
                        tag,
                        style,
                    }),
                    Err(e) => {
                        tracing::warn!("关键词规则 {} 无效: {}", subject, e);
                        None
                    }
                }
            })
            .collect();

        Self { rules }
    }
}

impl PromptAnalyzer for MockAnalyzer {
    fn analyze(&self, input: &AnalysisInput) -> AppResult<AnalysisSuggestion> {
        let prompt_text = input.prompt_text.trim();
        if prompt_text.is_empty() {
            return Err(AppError::Validation("请提供提示词文本".to_string()));
        }
        if input.output_image.is_empty() {
            return Err(AppError::Validation("请提供输出图片".to_string()));
        }

        let model_name = input.model_name.trim();
        let haystack = format!("{} {}", prompt_text, model_name);

        let mut tag_names = vec![BASE_TAG.to_string()];
        let mut subjects = Vec::new();
        let mut style = DEFAULT_STYLE;

        for rule in &self.rules {
            if rule.pattern.is_match(&haystack) {
                subjects.push(rule.subject);
                tag_names.push(rule.tag.to_string());
                if let Some(s) = rule.style {
                    style = s;
                }
            }
        }

        if !model_name.is_empty() {
            tag_names.push(model_name.to_string());
        }

        let mut seen = std::collections::HashSet::new();
        tag_names.retain(|t| seen.insert(t.clone()));

        let subject = if subjects.is_empty() {
            "未识别".to_string()
        } else {
            subjects.join("、")
        };
        let structure = serde_json::json!({
            "主体": subject,
            "风格": style,
            "模型": model_name,
            "参考图数量": input.input_images.len(),
            "提示词长度": prompt_text.chars().count(),
        });

        tracing::debug!("模拟分析完成，标签 {:?}", tag_names);

        Ok(AnalysisSuggestion {
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            style_description: style.to_string(),
            usage_scenario: DEFAULT_SCENARIO.to_string(),
            atmosphere_description: DEFAULT_ATMOSPHERE.to_string(),
            expressive_intent: DEFAULT_INTENT.to_string(),
            structure_analysis: serde_json::to_string(&structure)?,
            tag_names,
        })
    }
}
