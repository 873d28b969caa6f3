//! # 增强客户端模块（enhancer）
//!
//! ## 设计思路
//!
//! 将“单张图片 → 外部生成式图像服务 → 增强图”的一次调用封装在此，
//! 按职责拆分子模块：
//!
//! - `config`：服务地址、模型、凭据、超时
//! - `error`：单次调用的错误模型
//! - `wire`：generateContent 请求 / 响应报文
//! - `client`：基于 reqwest 的 `GeminiEnhancer`
//!
//! ## 实现思路
//!
//! 批处理层只依赖 `ImageEnhancer` trait，不直接依赖 HTTP 细节；
//! 测试中可替换为进程内假实现。

mod client;
mod config;
mod error;
mod wire;

use std::future::Future;

pub use client::GeminiEnhancer;
pub use config::{DEFAULT_API_BASE, DEFAULT_MODEL, EnhancerConfig};
pub use error::EnhanceError;

use crate::model::{EncodedImage, MimeType};
use crate::settings::EnhancementSettings;

/// 单张图片增强能力。
///
/// 每次调用最多发起一次外部请求，不做重试。
pub trait ImageEnhancer: Send + Sync + 'static {
    fn enhance(
        &self,
        image: &[u8],
        mime_type: MimeType,
        settings: &EnhancementSettings,
    ) -> impl Future<Output = Result<EncodedImage, EnhanceError>> + Send;
}
