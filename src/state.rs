//! # 应用状态容器
//!
//! ## 设计思路
//!
//! 设置、图片列表、结果表、运行 / 错误标记集中在一个 `AppState` 中，
//! 只通过 `reduce(Action)` 变更，每种状态转移对应一个 `Action` 变体。
//!
//! ## 实现思路
//!
//! - 每次开始运行或重新上传都会递增 `generation`。
//! - 运行结束时携带发起时的 `generation`；与当前值不符（或已不在运行中）
//!   的结果直接丢弃，旧批次的结果不会覆盖新批次。
//! - 结果表的键始终是当前图片标识的子集。

use crate::batch::EnhancementResults;
use crate::error::AppError;
use crate::model::SourceImage;
use crate::settings::EnhancementSettings;
use crate::view::{ViewKind, derive_view};

/// 批处理状态。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BatchStatus {
    #[default]
    Idle,
    Running,
    Error(String),
}

/// 状态转移。
#[derive(Debug, Clone)]
pub enum Action {
    /// 上传成功：整体替换图片列表。
    Uploaded(Vec<SourceImage>),
    /// 上传失败：保留原图片，进入错误状态。
    UploadFailed(String),
    SettingsChanged(EnhancementSettings),
    RunStarted,
    RunSucceeded {
        generation: u64,
        results: EnhancementResults,
    },
    RunFailed {
        generation: u64,
        message: String,
    },
    /// 清除错误并丢弃当前图片，回到上传页。
    ClearError,
}

/// `reduce` 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// 已进入运行状态，返回本次运行的代号。
    Started { generation: u64 },
    /// 过期或当前状态下无意义的转移，状态未改变。
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    settings: EnhancementSettings,
    images: Vec<SourceImage>,
    results: EnhancementResults,
    status: BatchStatus,
    generation: u64,
}

impl AppState {
    pub fn new(settings: EnhancementSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &EnhancementSettings {
        &self.settings
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn results(&self) -> &EnhancementResults {
        &self.results
    }

    pub fn status(&self) -> &BatchStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.status == BatchStatus::Running
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            BatchStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// 运行中或没有图片时，设置面板与触发按钮不可用。
    pub fn controls_disabled(&self) -> bool {
        self.is_running() || self.images.is_empty()
    }

    pub fn view_kind(&self) -> ViewKind {
        derive_view(self.is_running(), self.error(), self.images.len())
    }

    /// 唯一的状态变更入口。
    ///
    /// 只有设置校验失败与空批次会返回错误；空批次同时把状态置为错误。
    pub fn reduce(&mut self, action: Action) -> Result<Transition, AppError> {
        match action {
            Action::Uploaded(images) => {
                self.generation += 1;
                self.images = images;
                self.results.clear();
                self.status = BatchStatus::Idle;
                Ok(Transition::Applied)
            }
            Action::UploadFailed(message) => {
                self.generation += 1;
                self.results.clear();
                self.status = BatchStatus::Error(message);
                Ok(Transition::Applied)
            }
            Action::SettingsChanged(settings) => {
                settings.validate()?;
                self.settings = settings;
                Ok(Transition::Applied)
            }
            Action::RunStarted => {
                self.results.clear();
                if self.images.is_empty() {
                    let err = AppError::EmptyBatch;
                    self.status = BatchStatus::Error(err.batch_failure_message());
                    return Err(err);
                }
                self.generation += 1;
                self.status = BatchStatus::Running;
                Ok(Transition::Started {
                    generation: self.generation,
                })
            }
            Action::RunSucceeded {
                generation,
                results,
            } => {
                if !self.is_current_run(generation) {
                    log::debug!("🗑️ 丢弃过期批次结果 - generation={}", generation);
                    return Ok(Transition::Ignored);
                }
                self.results = results
                    .into_iter()
                    .filter(|(id, _)| self.images.iter().any(|image| image.id() == id.as_str()))
                    .collect();
                self.status = BatchStatus::Idle;
                Ok(Transition::Applied)
            }
            Action::RunFailed {
                generation,
                message,
            } => {
                if !self.is_current_run(generation) {
                    log::debug!("🗑️ 丢弃过期批次错误 - generation={}", generation);
                    return Ok(Transition::Ignored);
                }
                self.results.clear();
                self.status = BatchStatus::Error(message);
                Ok(Transition::Applied)
            }
            Action::ClearError => {
                if self.error().is_none() {
                    return Ok(Transition::Ignored);
                }
                self.generation += 1;
                self.images.clear();
                self.results.clear();
                self.status = BatchStatus::Idle;
                Ok(Transition::Applied)
            }
        }
    }

    fn is_current_run(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }
}
