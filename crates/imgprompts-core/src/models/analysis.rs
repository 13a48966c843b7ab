//! 智能分析数据模型

use serde::{Deserialize, Serialize};

/// 分析输入
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub prompt_text: String,
    pub model_name: String,
    /// 输出图片（base64）
    pub output_image: String,
    /// 输入参照图（base64），读取失败的图片不在其中
    pub input_images: Vec<String>,
}

/// 分析结果：为提示词补全的元数据建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSuggestion {
    pub negative_prompt: String,
    pub style_description: String,
    pub usage_scenario: String,
    pub atmosphere_description: String,
    pub expressive_intent: String,
    /// JSON 字符串
    pub structure_analysis: String,
    pub tag_names: Vec<String>,
}
