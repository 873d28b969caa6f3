//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 单次增强调用的所有失败来源收敛到一个枚举，调用侧可按分支匹配；
//! 服务端 / 网络错误的原始消息原样透传，不在本层重试或改写。

/// 增强客户端统一错误类型。
///
/// 在批处理层被上转为 `AppError`，最终透传给界面。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnhanceError {
    #[error("配置错误：{0}")]
    Configuration(String),

    #[error("{0}")]
    Transport(String),

    #[error("未生成图片：{0}")]
    NoImageProduced(String),

    #[error("响应格式错误：{0}")]
    InvalidResponse(String),
}

impl EnhanceError {
    /// 稳定错误码，供宿主层区分处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "E_CONFIG",
            Self::Transport(_) => "E_TRANSPORT",
            Self::NoImageProduced(_) => "E_NO_IMAGE",
            Self::InvalidResponse(_) => "E_RESPONSE",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config",
            Self::Transport(_) => "request",
            Self::NoImageProduced(_) | Self::InvalidResponse(_) => "response",
        }
    }
}
