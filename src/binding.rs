//! 请求绑定
//!
//! 同一个逻辑请求可以用 JSON 或表单（urlencoded / multipart）提交。
//! [`Payload`] 按 `Content-Type` 选择解码器，两种解码器都产出同一个输入结构，
//! 存储层不感知请求格式。

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{Form, FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use imgprompts_core::models::{CreatePrompt, UpdatePrompt};

use crate::utils::ApiError;

// ==================== 表单字段 ====================

/// 解析表单布尔值，无法识别时返回 None
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// 拆分逗号分隔的列表，去除空白项
pub fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 表单/查询参数键值对，保留重复键
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let mut fields = Self::default();
        for (key, value) in pairs {
            fields.push(key, value);
        }
        fields
    }

    /// 追加字段，`tag_names[]` 与 `tag_names` 视为同一个键
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let key = key.strip_suffix("[]").map(str::to_string).unwrap_or(key);
        self.pairs.push((key, value.into()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// 第一个同名字段
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 非空白的字段值
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// 列表字段：支持重复键和逗号分隔
    pub fn list(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| split_list(v))
            .collect()
    }

    /// 布尔字段；缺失或为空返回 None，无法识别的值返回 400
    pub fn bool(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.non_empty(key) {
            None => Ok(None),
            Some(v) => parse_bool(v)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("参数 {} 不是有效的布尔值: {}", key, v))),
        }
    }

    /// 数字等可解析字段；缺失或为空返回 None，解析失败返回 400
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ApiError> {
        match self.non_empty(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<T>()
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("参数 {} 格式错误: {}", key, v))),
        }
    }

    /// 可解析字段，缺失或格式错误时返回 None
    pub fn parse_lenient<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.non_empty(key).and_then(|v| v.parse::<T>().ok())
    }
}

/// 查询参数提取为 [`FormFields`]
#[async_trait]
impl<S> FromRequestParts<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(FormFields::new(pairs))
    }
}

// ==================== Multipart ====================

/// 上传的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 表单字段名（已去掉 `[]` 后缀）
    pub field: String,
    pub file_name: String,
    pub data: Bytes,
}

/// 解析后的 multipart 表单
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: FormFields,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// 指定字段下的所有文件
    pub fn files(&self, field: &str) -> impl Iterator<Item = &UploadedFile> + '_ {
        let field = field.to_string();
        self.files.iter().filter(move |f| f.field == field)
    }

    /// 指定字段下的第一个文件
    pub fn first_file(&self, field: &str) -> Option<&UploadedFile> {
        self.files(field).next()
    }
}

/// 读取全部 multipart 字段，文本字段进入 `fields`，文件进入 `files`
pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("表单解析失败: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(file_name) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("读取上传文件失败: {}", e)))?;
                // 浏览器未选择文件时会提交空的文件字段
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                let field = name.strip_suffix("[]").unwrap_or(&name).to_string();
                form.files.push(UploadedFile {
                    field,
                    file_name,
                    data,
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("读取表单字段失败: {}", e)))?;
                form.fields.push(name, value);
            }
        }
    }

    Ok(form)
}

// ==================== 双格式绑定 ====================

/// 可以从 JSON 或表单绑定的请求
pub trait BindRequest: Sized + Send {
    /// JSON 请求体的形状
    type Json: DeserializeOwned;

    fn from_json(json: Self::Json) -> Self;

    fn from_form(fields: &FormFields) -> Result<Self, ApiError>;
}

/// 按 `Content-Type` 选择解码器的提取器
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: BindRequest,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.contains("application/json") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let json: T::Json = serde_json::from_slice(&body)
                .map_err(|e| ApiError::BadRequest(format!("JSON格式错误: {}", e)))?;
            return Ok(Payload(T::from_json(json)));
        }

        let fields = if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await?.fields
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            FormFields::new(pairs)
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if !body.is_empty() {
                return Err(ApiError::BadRequest(format!(
                    "不支持的 Content-Type: {}",
                    content_type
                )));
            }
            FormFields::default()
        };

        Ok(Payload(T::from_form(&fields)?))
    }
}

/// JSON 中的字符串列表：数组或逗号分隔字符串
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    Many(Vec<String>),
    One(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringList::Many(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            StringList::One(joined) => split_list(&joined).collect(),
        }
    }
}

/// 结构分析字段：JSON 字符串或内联 JSON 值，null 视为缺失
fn structure_analysis_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ---------- 标签 ----------

/// 创建标签请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTagRequest {
    pub name: String,
}

impl BindRequest for CreateTagRequest {
    type Json = CreateTagRequest;

    fn from_json(json: Self::Json) -> Self {
        json
    }

    fn from_form(fields: &FormFields) -> Result<Self, ApiError> {
        Ok(Self {
            name: fields.get("name").unwrap_or_default().to_string(),
        })
    }
}

// ---------- 提示词 ----------

/// 创建提示词的 JSON 请求体
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatePromptJson {
    prompt_text: String,
    negative_prompt: String,
    model_name: String,
    is_public: bool,
    style_description: String,
    usage_scenario: String,
    atmosphere_description: String,
    expressive_intent: String,
    structure_analysis: Option<serde_json::Value>,
    input_image_urls: Option<StringList>,
    output_image_url: String,
    tag_names: Option<StringList>,
}

impl BindRequest for CreatePrompt {
    type Json = CreatePromptJson;

    fn from_json(json: Self::Json) -> Self {
        CreatePrompt {
            prompt_text: json.prompt_text,
            negative_prompt: json.negative_prompt,
            model_name: json.model_name,
            is_public: json.is_public,
            style_description: json.style_description,
            usage_scenario: json.usage_scenario,
            atmosphere_description: json.atmosphere_description,
            expressive_intent: json.expressive_intent,
            structure_analysis: structure_analysis_text(json.structure_analysis).unwrap_or_default(),
            input_image_urls: json.input_image_urls.map(StringList::into_vec).unwrap_or_default(),
            output_image_url: json.output_image_url,
            tag_names: json.tag_names.map(StringList::into_vec).unwrap_or_default(),
        }
    }

    fn from_form(fields: &FormFields) -> Result<Self, ApiError> {
        let text = |key: &str| fields.get(key).unwrap_or_default().to_string();

        Ok(CreatePrompt {
            prompt_text: text("prompt_text"),
            negative_prompt: text("negative_prompt"),
            model_name: text("model_name"),
            is_public: fields.bool("is_public")?.unwrap_or(false),
            style_description: text("style_description"),
            usage_scenario: text("usage_scenario"),
            atmosphere_description: text("atmosphere_description"),
            expressive_intent: text("expressive_intent"),
            structure_analysis: text("structure_analysis"),
            input_image_urls: fields.list("input_image_urls"),
            output_image_url: text("output_image_url"),
            tag_names: fields.list("tag_names"),
        })
    }
}

/// 更新提示词的 JSON 请求体，缺失与 null 都表示不修改
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePromptJson {
    prompt_text: Option<String>,
    negative_prompt: Option<String>,
    model_name: Option<String>,
    is_public: Option<bool>,
    style_description: Option<String>,
    usage_scenario: Option<String>,
    atmosphere_description: Option<String>,
    expressive_intent: Option<String>,
    structure_analysis: Option<serde_json::Value>,
    input_image_urls: Option<StringList>,
    output_image_url: Option<String>,
    tag_names: Option<StringList>,
}

impl BindRequest for UpdatePrompt {
    type Json = UpdatePromptJson;

    fn from_json(json: Self::Json) -> Self {
        UpdatePrompt {
            prompt_text: json.prompt_text,
            negative_prompt: json.negative_prompt,
            model_name: json.model_name,
            is_public: json.is_public,
            style_description: json.style_description,
            usage_scenario: json.usage_scenario,
            atmosphere_description: json.atmosphere_description,
            expressive_intent: json.expressive_intent,
            structure_analysis: structure_analysis_text(json.structure_analysis),
            input_image_urls: json.input_image_urls.map(StringList::into_vec),
            output_image_url: json.output_image_url,
            tag_names: json.tag_names.map(StringList::into_vec),
        }
    }

    fn from_form(fields: &FormFields) -> Result<Self, ApiError> {
        let text = |key: &str| fields.get(key).map(str::to_string);
        // 键存在即视为要修改，空值表示清空
        let list = |key: &str| fields.contains(key).then(|| fields.list(key));

        Ok(UpdatePrompt {
            prompt_text: text("prompt_text"),
            negative_prompt: text("negative_prompt"),
            model_name: text("model_name"),
            is_public: fields.bool("is_public")?,
            style_description: text("style_description"),
            usage_scenario: text("usage_scenario"),
            atmosphere_description: text("atmosphere_description"),
            expressive_intent: text("expressive_intent"),
            structure_analysis: text("structure_analysis"),
            input_image_urls: list("input_image_urls"),
            output_image_url: text("output_image_url"),
            tag_names: list("tag_names"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "1", "ON", "yes"] {
            assert_eq!(parse_bool(v), Some(true));
        }
        for v in ["false", "0", "off", "No"] {
            assert_eq!(parse_bool(v), Some(false));
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_list_accepts_repeated_and_comma_joined() {
        let f = fields(&[
            ("tag_names", "a, b"),
            ("tag_names[]", " c "),
            ("tag_names", ""),
            ("other", "x"),
        ]);
        assert_eq!(f.list("tag_names"), vec!["a", "b", "c"]);
        assert!(f.list("missing").is_empty());
    }

    #[test]
    fn test_typed_fields() {
        let f = fields(&[("page", "2"), ("page_size", "abc"), ("flag", "maybe")]);
        assert_eq!(f.parse::<u32>("page").unwrap(), Some(2));
        assert!(f.parse::<u32>("page_size").is_err());
        assert_eq!(f.parse_lenient::<u32>("page_size"), None);
        assert_eq!(f.parse::<u32>("missing").unwrap(), None);
        assert!(f.bool("flag").is_err());
    }

    #[test]
    fn test_create_prompt_from_form() {
        let f = fields(&[
            ("prompt_text", "a cat"),
            ("is_public", "on"),
            ("tag_names", "animal,cute"),
            ("input_image_urls", "u1,u2"),
        ]);
        let req = CreatePrompt::from_form(&f).unwrap();
        assert_eq!(req.prompt_text, "a cat");
        assert!(req.is_public);
        assert_eq!(req.tag_names, vec!["animal", "cute"]);
        assert_eq!(req.input_image_urls, vec!["u1", "u2"]);
    }

    #[test]
    fn test_create_prompt_from_json() {
        let json: CreatePromptJson = serde_json::from_str(
            r#"{"prompt_text":"p","tag_names":["a"," ",""],"structure_analysis":{"k":1}}"#,
        )
        .unwrap();
        let req = CreatePrompt::from_json(json);
        assert_eq!(req.tag_names, vec!["a"]);
        assert_eq!(req.structure_analysis, r#"{"k":1}"#);

        let json: CreatePromptJson =
            serde_json::from_str(r#"{"prompt_text":"p","structure_analysis":"{\"k\":2}"}"#).unwrap();
        assert_eq!(CreatePrompt::from_json(json).structure_analysis, r#"{"k":2}"#);
    }

    #[test]
    fn test_update_tag_semantics_json() {
        let absent: UpdatePromptJson = serde_json::from_str(r#"{"model_name":"m"}"#).unwrap();
        assert!(UpdatePrompt::from_json(absent).tag_names.is_none());

        let null: UpdatePromptJson = serde_json::from_str(r#"{"tag_names":null}"#).unwrap();
        assert!(UpdatePrompt::from_json(null).tag_names.is_none());

        let empty: UpdatePromptJson = serde_json::from_str(r#"{"tag_names":[]}"#).unwrap();
        assert_eq!(UpdatePrompt::from_json(empty).tag_names, Some(vec![]));
    }

    #[test]
    fn test_update_tag_semantics_form() {
        let absent = UpdatePrompt::from_form(&fields(&[("model_name", "m")])).unwrap();
        assert!(absent.tag_names.is_none());
        assert_eq!(absent.model_name.as_deref(), Some("m"));
        assert!(absent.prompt_text.is_none());

        let cleared = UpdatePrompt::from_form(&fields(&[("tag_names", "")])).unwrap();
        assert_eq!(cleared.tag_names, Some(vec![]));
    }
}
