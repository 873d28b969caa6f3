//! # 增强会话
//!
//! ## 设计思路
//!
//! 宿主外壳只和 `EnhanceSession` 打交道：上传、改设置、开始增强、一键智能、清除错误、
//! 读取视图。会话内部把上传模块、批处理编排器和状态容器串起来。
//!
//! ## 实现思路
//!
//! - 状态放在 `Arc<Mutex<AppState>>` 中，只在同步代码段内加锁，
//!   等待网络 / 文件读取期间绝不持锁。
//! - 每次运行在开始时领取 `generation`，结束时带回；过期结果由状态容器丢弃，
//!   调用方得到 `RunOutcome::Superseded`。
//! - 会话可 `Clone`，多个宿主回调共享同一份状态。

use std::sync::{Arc, Mutex, MutexGuard};

use crate::batch::BatchOrchestrator;
use crate::enhancer::ImageEnhancer;
use crate::error::AppError;
use crate::export::ShareCapability;
use crate::intake::{IntakeFile, intake};
use crate::settings::EnhancementSettings;
use crate::state::{Action, AppState, Transition};
use crate::view::{View, render};

/// 一次增强运行的结局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 结果已发布到状态中。
    Completed { enhanced: usize },
    /// 运行期间有新的上传或新的运行，本次结果被丢弃。
    Superseded,
}

pub struct EnhanceSession<E> {
    state: Arc<Mutex<AppState>>,
    orchestrator: Arc<BatchOrchestrator<E>>,
}

impl<E> Clone for EnhanceSession<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

impl<E: ImageEnhancer> EnhanceSession<E> {
    pub fn new(enhancer: E) -> Self {
        Self::with_settings(enhancer, EnhancementSettings::default())
    }

    pub fn with_settings(enhancer: E, settings: EnhancementSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(settings))),
            orchestrator: Arc::new(BatchOrchestrator::new(enhancer)),
        }
    }

    pub fn enhancer(&self) -> &E {
        self.orchestrator.enhancer()
    }

    /// 上传一批文件，成功后整体替换当前图片。返回图片数量。
    pub async fn upload<F: IntakeFile>(&self, files: Vec<F>) -> Result<usize, AppError> {
        match intake(files).await {
            Ok(images) => {
                let count = images.len();
                self.lock()?.reduce(Action::Uploaded(images))?;
                Ok(count)
            }
            Err(e) => {
                self.lock()?.reduce(Action::UploadFailed(e.to_string()))?;
                Err(e)
            }
        }
    }

    pub fn update_settings(&self, settings: EnhancementSettings) -> Result<(), AppError> {
        self.lock()?.reduce(Action::SettingsChanged(settings))?;
        log::debug!("⚙️ 设置已更新 - {:?}", settings);
        Ok(())
    }

    /// 用当前设置增强全部图片。
    pub async fn enhance(&self) -> Result<RunOutcome, AppError> {
        let settings = *self.lock()?.settings();
        self.run(settings).await
    }

    /// 一键智能：写入预设并立即用预设运行。
    pub async fn smart_auto(&self) -> Result<RunOutcome, AppError> {
        let preset = EnhancementSettings::smart_auto();
        self.update_settings(preset)?;
        log::info!("✨ 一键智能增强");
        self.run(preset).await
    }

    /// 清除错误并丢弃当前图片。
    pub fn clear_error(&self) -> Result<(), AppError> {
        self.lock()?.reduce(Action::ClearError)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<AppState, AppError> {
        Ok(self.lock()?.clone())
    }

    pub fn view(&self, share: &dyn ShareCapability) -> Result<View, AppError> {
        let state = self.lock()?;
        Ok(render(&state, share))
    }

    async fn run(&self, settings: EnhancementSettings) -> Result<RunOutcome, AppError> {
        let (generation, images) = {
            let mut state = self.lock()?;
            let generation = match state.reduce(Action::RunStarted) {
                Ok(Transition::Started { generation }) => generation,
                Ok(_) => return Err(AppError::Batch("运行未能开始".to_string())),
                Err(e) => {
                    log::warn!("⚠️ {}", e);
                    return Err(e);
                }
            };
            (generation, state.images().to_vec())
        };

        let outcome = self.orchestrator.run_batch(&images, &settings).await;

        let mut state = self.lock()?;
        match outcome {
            Ok(results) => {
                let enhanced = results.len();
                match state.reduce(Action::RunSucceeded {
                    generation,
                    results,
                })? {
                    Transition::Applied => Ok(RunOutcome::Completed { enhanced }),
                    _ => Ok(RunOutcome::Superseded),
                }
            }
            Err(e) => {
                let message = e.batch_failure_message();
                match state.reduce(Action::RunFailed {
                    generation,
                    message,
                })? {
                    Transition::Applied => Err(e),
                    _ => Ok(RunOutcome::Superseded),
                }
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AppState>, AppError> {
        self.state.lock().map_err(|_| AppError::StatePoisoned)
    }
}
