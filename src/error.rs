//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖上传、增强、导出各环节，
//! 替代分散的 `.map_err(|e| e.to_string())` 与字符串错误。
//!
//! 宿主层（WebView 外壳）统一收到 `Result<T, AppError>`，
//! 通过 `Serialize` 获得人类可读的错误文案。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `EnhanceError` 提供 `From` 转换，批处理中直接 `?` 上抛。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 IPC 传输要求。

use serde::Serialize;

use crate::enhancer::EnhanceError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 单张图片增强失败（配置 / 网络 / 未产出图片）
    #[error("{0}")]
    Enhance(#[from] EnhanceError),

    /// 上传阶段任一文件读取失败，整批拒绝
    #[error("读取一张或多张图片文件失败")]
    Intake,

    /// 未上传图片就触发增强
    #[error("请先上传图片")]
    EmptyBatch,

    /// 批处理任务异常中断（panic / 被取消）
    #[error("批处理过程中发生未知错误：{0}")]
    Batch(String),

    /// 增强设置不合法
    #[error("设置无效：{0}")]
    Settings(String),

    /// 导出 / 分享失败
    #[error("导出失败：{0}")]
    Export(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 状态锁中毒
    #[error("应用状态锁已中毒")]
    StatePoisoned,
}

impl AppError {
    /// 批处理失败时展示给用户的完整文案。
    pub fn batch_failure_message(&self) -> String {
        match self {
            Self::EmptyBatch => self.to_string(),
            other => format!("增强失败：{}", other),
        }
    }
}

/// IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
