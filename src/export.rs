//! 增强图导出模块
//!
//! # 设计思路
//!
//! 结果卡片提供两类导出：按 PNG / JPEG 文件名保存，以及调用平台分享。
//! 分享能力由宿主在运行时探测，不可用时直接不展示该操作。
//!
//! # 实现思路
//!
//! - 保存只决定文件名（容器命名），字节原样写出，不做转码。
//! - 目标目录不存在时自动 `create_dir_all`。
//! - 分享通过 `ShareCapability` trait 交给宿主实现。

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;
use crate::model::EncodedImage;

const FILE_STEM: &str = "neorevived-image";

pub const SHARE_TITLE: &str = "Image Enhanced by NeoRevive";
pub const SHARE_TEXT: &str = "Check out this photo I enhanced with NeoRevive!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.{}", FILE_STEM, self.extension())
    }
}

/// 结果卡片上的导出操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "format", rename_all = "camelCase")]
pub enum ExportAction {
    Download(ExportFormat),
    Share,
}

/// 分享时交给平台的附件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: &'static str,
    pub text: &'static str,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SharePayload {
    pub fn from_image(image: &EncodedImage) -> Result<Self, AppError> {
        Ok(Self {
            title: SHARE_TITLE,
            text: SHARE_TEXT,
            file_name: ExportFormat::Png.file_name(),
            mime_type: image.mime_type.clone(),
            bytes: decode(image)?,
        })
    }
}

/// 平台分享能力。
pub trait ShareCapability: Send + Sync {
    /// 当前环境是否支持带附件分享。
    fn is_available(&self) -> bool;

    fn share(&self, payload: SharePayload) -> Result<(), AppError>;
}

/// 不支持分享的环境。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShare;

impl ShareCapability for NoShare {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, _payload: SharePayload) -> Result<(), AppError> {
        Err(AppError::Export("当前环境不支持分享".to_string()))
    }
}

/// 结果卡片可用的导出操作；分享仅在可用时出现。
pub fn available_actions(share: &dyn ShareCapability) -> Vec<ExportAction> {
    let mut actions = vec![
        ExportAction::Download(ExportFormat::Png),
        ExportAction::Download(ExportFormat::Jpeg),
    ];
    if share.is_available() {
        actions.push(ExportAction::Share);
    }
    actions
}

/// 将增强图保存到目录下，返回写出的完整路径。
pub async fn save_to_dir(
    image: &EncodedImage,
    dir: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<PathBuf, AppError> {
    let dir = dir.as_ref();
    let bytes = decode(image)?;

    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::Export(format!("创建目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }

    let path = dir.join(format.file_name());
    tokio::fs::write(&path, &bytes).await?;
    log::info!("💾 已保存增强图 - {} ({} bytes)", path.display(), bytes.len());

    Ok(path)
}

/// 分享增强图；分享能力不可用时返回错误。
pub fn share_image(share: &dyn ShareCapability, image: &EncodedImage) -> Result<(), AppError> {
    if !share.is_available() {
        return Err(AppError::Export("当前环境不支持分享".to_string()));
    }
    let payload = SharePayload::from_image(image)?;
    share.share(payload).inspect_err(|e| log::warn!("⚠️ 分享失败：{}", e))
}

fn decode(image: &EncodedImage) -> Result<Vec<u8>, AppError> {
    image
        .decode()
        .map_err(|e| AppError::Export(format!("图片数据不是有效的 Base64：{}", e)))
}
