//! # 数据模型
//!
//! ## 设计思路
//!
//! 将“上传得到的原图”和“服务返回的增强图”解耦：
//! - `SourceImage` 表示一张已读入内存、具有稳定标识的原图，创建后不可变
//! - `EncodedImage` 表示服务返回的 Base64 图片数据
//! - `MimeType` 限定可接受的三种图片类型

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 可接受的图片类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// 解析 MIME 字符串，忽略参数与大小写。不在白名单内返回 `None`。
    pub fn parse(value: &str) -> Option<Self> {
        let base = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match base.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// 按文件扩展名推断类型。
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上传阶段产出的原图记录。
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: String,
    name: String,
    last_modified: i64,
    mime_type: MimeType,
    bytes: Bytes,
    data_url: Arc<str>,
}

impl SourceImage {
    /// 创建原图记录，同时生成 Data URL。
    pub fn new(name: impl Into<String>, last_modified: i64, mime_type: MimeType, bytes: Bytes) -> Self {
        let name = name.into();
        let data_url = format!(
            "data:{};base64,{}",
            mime_type.as_str(),
            general_purpose::STANDARD.encode(&bytes)
        );

        Self {
            id: Self::identity(&name, last_modified),
            name,
            last_modified,
            mime_type,
            bytes,
            data_url: Arc::from(data_url),
        }
    }

    /// 标识 = 文件名 + 最后修改时间（毫秒）。
    ///
    /// 同名且同时间戳的两个文件会得到相同标识，视为同一张图片。
    pub fn identity(name: &str, last_modified: i64) -> String {
        format!("{}-{}", name, last_modified)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_modified(&self) -> i64 {
        self.last_modified
    }

    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// 服务返回的增强图（Base64 编码）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// 解码为原始字节（导出 / 分享时使用）。
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(self.data.trim())
    }
}
