//! # 增强设置模块
//!
//! ## 设计思路
//!
//! `EnhancementSettings` 是不可变值：界面每次修改都整体替换，而不是逐字段改写。
//! 增强档位（low / medium / ultra）作为面向用户的语义，提示词构建时再映射成文案。
//!
//! ## 实现思路
//!
//! - `Default` 提供首次打开时的设置（Medium、不上色、降噪 50、非科幻模式）。
//! - `smart_auto` 为“一键智能”预设，固定参数，不读取当前设置。
//! - `EnhancementLevel` 负责档位字符串解析与反向输出。
//! - `validate` 在设置进入状态容器前校验降噪范围。

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 降噪强度上限（含）。
pub const MAX_NOISE_REDUCTION: u8 = 100;

/// 增强档位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnhancementLevel {
    Low,
    Medium,
    Ultra,
}

impl EnhancementLevel {
    pub const ALL: [EnhancementLevel; 3] = [Self::Low, Self::Medium, Self::Ultra];

    /// 从外部字符串解析档位（大小写不敏感）。
    ///
    /// # 示例
    /// ```rust
    /// use neorevive::settings::EnhancementLevel;
    ///
    /// let level = EnhancementLevel::parse(" ULTRA ")?;
    /// assert_eq!(level.as_str(), "Ultra");
    /// # Ok::<(), neorevive::error::AppError>(())
    /// ```
    pub fn parse(level: &str) -> Result<Self, AppError> {
        match level.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "ultra" => Ok(Self::Ultra),
            other => Err(AppError::Settings(format!(
                "未知增强档位：{}（可选：low / medium / ultra）",
                other
            ))),
        }
    }

    /// 档位展示名，供界面按钮使用。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::Ultra => "Ultra",
        }
    }
}

/// 一次增强运行所使用的全部参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementSettings {
    #[serde(rename = "enhancementLevel")]
    pub level: EnhancementLevel,
    /// 是否按黑白照片进行上色。
    pub colorize: bool,
    /// 降噪强度（0–100）。
    pub noise_reduction: u8,
    /// 科幻风格模式；开启后忽略其余参数。
    pub sci_fi_mode: bool,
}

impl Default for EnhancementSettings {
    fn default() -> Self {
        Self {
            level: EnhancementLevel::Medium,
            colorize: false,
            noise_reduction: 50,
            sci_fi_mode: false,
        }
    }
}

impl EnhancementSettings {
    /// “一键智能”预设。
    pub fn smart_auto() -> Self {
        Self {
            level: EnhancementLevel::Medium,
            colorize: true,
            noise_reduction: 60,
            sci_fi_mode: false,
        }
    }

    /// 校验设置是否可用于发起增强。
    pub fn validate(&self) -> Result<(), AppError> {
        if self.noise_reduction > MAX_NOISE_REDUCTION {
            return Err(AppError::Settings(format!(
                "降噪强度必须在 0~{} 之间，当前：{}",
                MAX_NOISE_REDUCTION, self.noise_reduction
            )));
        }
        Ok(())
    }
}
