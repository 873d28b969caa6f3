//! # 增强客户端
//!
//! ## 设计思路
//!
//! 一次调用 = 一次外部请求：发送原图 + 指令，要求服务以图片模态返回。
//! 本层不做重试；网络 / 服务错误原样上抛，是否重试由上层决定。
//!
//! ## 实现思路
//!
//! - 发请求前先检查凭据，缺失立即返回配置错误，不触网。
//! - 仅检查 `candidates[0].content.parts[0]`；其中有内联图片数据即成功，否则视为未生成图片。
//! - 记录请求耗时，便于诊断慢请求。

use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose};

use super::wire::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineDataRef,
    RequestContent, RequestPart,
};
use super::{EnhanceError, EnhancerConfig, ImageEnhancer};
use crate::model::{EncodedImage, MimeType};
use crate::prompt::build_prompt;
use crate::settings::EnhancementSettings;

const API_KEY_HEADER: &str = "x-goog-api-key";
const IMAGE_MODALITY: &str = "IMAGE";

/// 基于 generateContent 接口的增强客户端。
///
/// 内部复用同一个 HTTP 客户端，可在批处理中并发调用。
pub struct GeminiEnhancer {
    config: EnhancerConfig,
    http: reqwest::Client,
}

impl GeminiEnhancer {
    /// 校验配置并构建 HTTP 客户端。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use neorevive::enhancer::{EnhancerConfig, GeminiEnhancer};
    ///
    /// let enhancer = GeminiEnhancer::new(EnhancerConfig::from_env())?;
    /// # Ok::<(), neorevive::enhancer::EnhanceError>(())
    /// ```
    pub fn new(config: EnhancerConfig) -> Result<Self, EnhanceError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| EnhanceError::Configuration(format!("无法创建 HTTP 客户端：{}", e)))?;

        log::debug!("🔧 增强客户端已创建 - {:?}", config);

        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self, EnhanceError> {
        Self::new(EnhancerConfig::from_env())
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    async fn enhance_inner(
        &self,
        image: &[u8],
        mime_type: MimeType,
        settings: &EnhancementSettings,
    ) -> Result<EncodedImage, EnhanceError> {
        let api_key = self.config.require_api_key()?;
        let started = Instant::now();

        let prompt = build_prompt(settings);
        let encoded = general_purpose::STANDARD.encode(image);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Inline {
                        inline_data: InlineDataRef {
                            mime_type: mime_type.as_str(),
                            data: &encoded,
                        },
                    },
                    RequestPart::Text { text: &prompt },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![IMAGE_MODALITY],
            },
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| EnhanceError::InvalidResponse(format!("请求序列化失败：{}", e)))?;

        let endpoint = self.config.endpoint();
        log::debug!("📡 发送增强请求 - {} ({} bytes, {})", endpoint, image.len(), mime_type);

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if let Some(len) = response.content_length() {
            if len > self.config.max_response_bytes {
                return Err(EnhanceError::InvalidResponse(format!(
                    "响应体过大：{:.2} MB",
                    len as f64 / 1024.0 / 1024.0
                )));
            }
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if payload.len() as u64 > self.config.max_response_bytes {
            return Err(EnhanceError::InvalidResponse("响应体超过大小限制".to_string()));
        }

        if !status.is_success() {
            return Err(Self::service_error(status, &payload));
        }

        let result = Self::extract_image(&payload, mime_type)?;
        log::info!(
            "✅ 增强完成 - {} → {} bytes (base64) elapsed={}ms",
            mime_type,
            result.data.len(),
            started.elapsed().as_millis()
        );

        Ok(result)
    }

    /// 只看第一个片段；没有内联图片数据即视为模型未生成图片。
    fn extract_image(payload: &[u8], fallback_mime: MimeType) -> Result<EncodedImage, EnhanceError> {
        let parsed: GenerateContentResponse = serde_json::from_slice(payload)
            .map_err(|e| EnhanceError::InvalidResponse(format!("无法解析服务响应：{}", e)))?;

        let Some(part) = parsed.first_part() else {
            return Err(EnhanceError::NoImageProduced("服务未返回任何内容".to_string()));
        };

        match part.inline_data.as_ref().filter(|inline| !inline.data.trim().is_empty()) {
            Some(inline) => {
                let mime = inline
                    .mime_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or(fallback_mime.as_str());
                Ok(EncodedImage::new(mime, inline.data.trim()))
            }
            None => {
                if let Some(text) = part.text.as_deref() {
                    log::warn!("⚠️ 模型仅返回文本：{}", text.chars().take(120).collect::<String>());
                }
                Err(EnhanceError::NoImageProduced("模型可能未返回图片".to_string()))
            }
        }
    }

    /// 非 2xx：优先透传服务端错误消息。
    fn service_error(status: reqwest::StatusCode, payload: &[u8]) -> EnhanceError {
        let message = serde_json::from_slice::<ErrorEnvelope>(payload)
            .ok()
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.trim().is_empty());

        match message {
            Some(message) => EnhanceError::Transport(message),
            None => EnhanceError::Transport(format!("HTTP {}", status.as_u16())),
        }
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> EnhanceError {
        if e.is_timeout() {
            EnhanceError::Transport(format!("请求超时（{}秒）", self.config.request_timeout_secs))
        } else if e.is_connect() {
            EnhanceError::Transport(format!("无法连接：{}", e))
        } else {
            EnhanceError::Transport(format!("请求失败：{}", e))
        }
    }
}

impl ImageEnhancer for GeminiEnhancer {
    async fn enhance(
        &self,
        image: &[u8],
        mime_type: MimeType,
        settings: &EnhancementSettings,
    ) -> Result<EncodedImage, EnhanceError> {
        self.enhance_inner(image, mime_type, settings).await
    }
}
