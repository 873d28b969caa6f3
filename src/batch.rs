//! # 批处理编排
//!
//! ## 设计思路
//!
//! 一批图片同时提交：每张图一个任务，全部完成后统一发布结果。
//! 要么全部成功，要么整批失败；任一张失败即中止，不发布部分结果，
//! 避免界面把“半成品”当作一次成功的运行展示。
//!
//! ## 实现思路
//!
//! - 使用 `JoinSet` 扇出；首个失败出现时 `abort_all` 放弃其余在途任务。
//! - 结果按图片标识收集到 `HashMap`，只在全部任务结束后返回。
//! - 空批次直接返回 `EmptyBatch`，不发起任何外部调用。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use crate::enhancer::ImageEnhancer;
use crate::error::AppError;
use crate::model::{EncodedImage, SourceImage};
use crate::settings::EnhancementSettings;

/// 图片标识 → 增强结果。
pub type EnhancementResults = HashMap<String, EncodedImage>;

/// 批处理编排器。
pub struct BatchOrchestrator<E> {
    enhancer: Arc<E>,
}

impl<E: ImageEnhancer> BatchOrchestrator<E> {
    pub fn new(enhancer: E) -> Self {
        Self::from_shared(Arc::new(enhancer))
    }

    pub fn from_shared(enhancer: Arc<E>) -> Self {
        Self { enhancer }
    }

    pub fn enhancer(&self) -> &E {
        &self.enhancer
    }

    /// 并发增强整批图片。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use neorevive::batch::BatchOrchestrator;
    /// use neorevive::enhancer::GeminiEnhancer;
    /// use neorevive::settings::EnhancementSettings;
    ///
    /// # async fn demo(images: Vec<neorevive::model::SourceImage>) -> Result<(), neorevive::error::AppError> {
    /// let orchestrator = BatchOrchestrator::new(GeminiEnhancer::from_env()?);
    /// let results = orchestrator.run_batch(&images, &EnhancementSettings::default()).await?;
    /// assert_eq!(results.len(), images.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_batch(
        &self,
        images: &[SourceImage],
        settings: &EnhancementSettings,
    ) -> Result<EnhancementResults, AppError> {
        if images.is_empty() {
            return Err(AppError::EmptyBatch);
        }
        settings.validate()?;

        let started = Instant::now();
        log::info!("🚀 开始批量增强 - {} 张图片 ({:?})", images.len(), settings.level);

        let mut tasks = JoinSet::new();
        for image in images.iter().cloned() {
            let enhancer = Arc::clone(&self.enhancer);
            let settings = *settings;
            tasks.spawn(async move {
                let outcome = enhancer
                    .enhance(image.bytes(), image.mime_type(), &settings)
                    .await;
                (image.id().to_string(), outcome)
            });
        }

        let mut results = EnhancementResults::with_capacity(images.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(encoded))) => {
                    log::debug!("🖼️ 单张完成 - {} ({}/{})", id, results.len() + 1, images.len());
                    results.insert(id, encoded);
                }
                Ok((id, Err(e))) => {
                    tasks.abort_all();
                    log::warn!(
                        "⚠️ 单张增强失败，整批中止 - {} [{}/{}]: {}",
                        id,
                        e.stage(),
                        e.code(),
                        e
                    );
                    return Err(e.into());
                }
                Err(e) => {
                    tasks.abort_all();
                    log::error!("❌ 增强任务异常中断：{}", e);
                    return Err(AppError::Batch(e.to_string()));
                }
            }
        }

        log::info!(
            "✅ 批量增强完成 - {} 张 elapsed={}ms",
            results.len(),
            started.elapsed().as_millis()
        );

        Ok(results)
    }
}
