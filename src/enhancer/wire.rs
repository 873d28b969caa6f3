//! generateContent 请求 / 响应报文。
//!
//! 只建模用到的字段；响应中未知字段一律忽略。

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    pub(crate) contents: Vec<RequestContent<'a>>,
    pub(crate) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent<'a> {
    pub(crate) parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum RequestPart<'a> {
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineDataRef<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineDataRef<'a> {
    pub(crate) mime_type: &'a str,
    pub(crate) data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub(crate) response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    pub(crate) inline_data: Option<InlineData>,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    pub(crate) mime_type: Option<String>,
    #[serde(default)]
    pub(crate) data: String,
}

/// 服务端错误体：`{"error": {"code": 429, "message": "...", "status": "..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: String,
}

impl GenerateContentResponse {
    /// 第一个候选的第一个片段。
    pub(crate) fn first_part(&self) -> Option<&ResponsePart> {
        self.candidates.first()?.content.as_ref()?.parts.first()
    }
}
