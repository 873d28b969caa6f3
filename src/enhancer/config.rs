//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `EnhancerConfig`：服务地址、模型、凭据与超时。
//! 凭据缺失不是构造错误；每次增强调用在发起网络请求前检查并快速失败。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置（无凭据）。
//! - `from_env` 从环境变量补齐凭据与可选覆盖项。
//! - `validate` 对超时与体积上限做范围校验。

use super::EnhanceError;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// 凭据环境变量，按顺序查找。
const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];
const API_BASE_ENV_VAR: &str = "GEMINI_API_BASE";
const MODEL_ENV_VAR: &str = "GEMINI_IMAGE_MODEL";

/// 增强客户端配置。
#[derive(Clone)]
pub struct EnhancerConfig {
    /// 服务凭据；为空时所有增强调用返回配置错误。
    pub api_key: Option<String>,
    /// 服务根地址（不含模型路径）。
    pub api_base: String,
    /// 图像模型名称。
    pub model: String,
    /// 单次请求总超时（秒）。
    pub request_timeout_secs: u64,
    /// 建立连接（TCP/TLS）超时（秒）。
    pub connect_timeout_secs: u64,
    /// 响应体允许的最大字节数。
    pub max_response_bytes: u64,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

/// 手写 `Debug`，避免凭据出现在日志里。
impl std::fmt::Debug for EnhancerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl EnhancerConfig {
    /// 默认配置 + 环境变量覆盖。
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = API_KEY_ENV_VARS.iter().find_map(|name| non_empty_env(name));

        if let Some(base) = non_empty_env(API_BASE_ENV_VAR) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty_env(MODEL_ENV_VAR) {
            config.model = model;
        }

        config
    }

    /// 返回可用凭据；缺失或空白时给出配置错误。
    pub fn require_api_key(&self) -> Result<&str, EnhanceError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EnhanceError::Configuration("未设置 API_KEY 环境变量".to_string()))
    }

    /// 拼出 generateContent 端点。
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base.trim_end_matches('/'), model_path)
    }

    pub fn validate(&self) -> Result<(), EnhanceError> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(EnhanceError::Configuration(format!(
                "服务地址仅支持 HTTP/HTTPS：{}",
                self.api_base
            )));
        }
        if self.model.trim().is_empty() {
            return Err(EnhanceError::Configuration("模型名称不能为空".to_string()));
        }
        if !(1..=600).contains(&self.request_timeout_secs) {
            return Err(EnhanceError::Configuration("request_timeout_secs 必须在 1~600 秒之间".to_string()));
        }
        if !(1..=120).contains(&self.connect_timeout_secs) {
            return Err(EnhanceError::Configuration("connect_timeout_secs 必须在 1~120 秒之间".to_string()));
        }
        if self.max_response_bytes < 1024 * 1024 {
            return Err(EnhanceError::Configuration("max_response_bytes 不能小于 1MB".to_string()));
        }
        Ok(())
    }
}
