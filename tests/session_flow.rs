// 会话端到端流程：上传 → 增强 → 视图，使用进程内假增强器与暂停时钟
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use neorevive::enhancer::{EnhanceError, ImageEnhancer};
use neorevive::export::{ExportAction, NoShare};
use neorevive::intake::MemoryFile;
use neorevive::model::{EncodedImage, MimeType};
use neorevive::prompt::build_prompt;
use neorevive::settings::{EnhancementLevel, EnhancementSettings};
use neorevive::view::{View, ViewKind};
use neorevive::{AppError, EnhanceSession, RunOutcome};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

/// 按图片内容里的文件名决定延迟 / 失败。
#[derive(Default)]
struct ScriptedEnhancer {
    delays: HashMap<String, Duration>,
    failures: HashMap<String, EnhanceError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedEnhancer {
    fn slow(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    fn failing(mut self, name: &str, error: EnhanceError) -> Self {
        self.failures.insert(name.to_string(), error);
        self
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

impl ImageEnhancer for ScriptedEnhancer {
    async fn enhance(
        &self,
        image: &[u8],
        mime_type: MimeType,
        settings: &EnhancementSettings,
    ) -> Result<EncodedImage, EnhanceError> {
        let name = String::from_utf8_lossy(&image[PNG_MAGIC.len()..]).to_string();
        self.prompts.lock().expect("prompt log poisoned").push(build_prompt(settings));

        if let Some(delay) = self.delays.get(&name) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(&name) {
            return Err(error.clone());
        }
        Ok(EncodedImage::new(mime_type.as_str(), format!("ZW5o{}", name.len())))
    }
}

fn png(name: &str) -> MemoryFile {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(name.as_bytes());
    MemoryFile::new(name, 1_700_000_000_000, "image/png", bytes)
}

async fn wait_until_running<E: ImageEnhancer>(session: &EnhanceSession<E>) {
    while !session.snapshot().expect("snapshot").is_running() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn upload_then_enhance_shows_comparators() {
    let session = EnhanceSession::new(ScriptedEnhancer::default().slow("a.png", Duration::from_secs(3)));

    assert_eq!(session.view(&NoShare).expect("view").kind(), ViewKind::Upload);
    assert!(session.snapshot().expect("snapshot").controls_disabled());

    let count = session
        .upload(vec![png("a.png"), png("b.png")])
        .await
        .expect("upload should succeed");
    assert_eq!(count, 2);

    let View::Results { cards } = session.view(&NoShare).expect("view") else {
        panic!("expected results view after upload");
    };
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|card| card.enhanced_url.is_none()));

    let running = tokio::spawn({
        let session = session.clone();
        async move { session.enhance().await }
    });
    wait_until_running(&session).await;
    assert_eq!(session.view(&NoShare).expect("view"), View::Loading);
    assert!(session.snapshot().expect("snapshot").controls_disabled());

    let outcome = running.await.expect("run task panicked").expect("run should succeed");
    assert_eq!(outcome, RunOutcome::Completed { enhanced: 2 });

    let state = session.snapshot().expect("snapshot");
    assert_eq!(state.results().len(), 2);
    for image in state.images() {
        assert!(state.results().contains_key(image.id()));
    }

    let View::Results { cards } = session.view(&NoShare).expect("view") else {
        panic!("expected results view after run");
    };
    for card in &cards {
        assert!(card.is_comparable());
        assert!(card.actions.iter().all(|a| matches!(a, ExportAction::Download(_))));
    }

    let prompts = session.enhancer().prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| p.contains("medium") && p.contains("50 out of 100")));
    assert!(prompts.iter().all(|p| !p.contains("colorize")));
}

#[tokio::test]
async fn one_failure_publishes_no_results() {
    let fake = ScriptedEnhancer::default()
        .failing("2.png", EnhanceError::NoImageProduced("仅返回了文本".to_string()));
    let session = EnhanceSession::new(fake);
    session
        .upload(vec![png("1.png"), png("2.png"), png("3.png")])
        .await
        .expect("upload should succeed");

    let result = session.enhance().await;

    assert!(matches!(
        result,
        Err(AppError::Enhance(EnhanceError::NoImageProduced(_)))
    ));
    let state = session.snapshot().expect("snapshot");
    assert!(state.results().is_empty());
    assert_eq!(state.view_kind(), ViewKind::Error);
    assert!(state.error().is_some_and(|m| m.starts_with("增强失败：")));
}

#[tokio::test(start_paused = true)]
async fn stale_run_never_overwrites_newer_batch() {
    let fake = ScriptedEnhancer::default().slow("old.png", Duration::from_secs(30));
    let session = EnhanceSession::new(fake);
    session.upload(vec![png("old.png")]).await.expect("upload should succeed");

    let stale = tokio::spawn({
        let session = session.clone();
        async move { session.enhance().await }
    });
    wait_until_running(&session).await;

    session
        .upload(vec![png("new-1.png"), png("new-2.png")])
        .await
        .expect("upload should succeed");
    let fresh = session.enhance().await.expect("fresh run should succeed");
    assert_eq!(fresh, RunOutcome::Completed { enhanced: 2 });

    let stale = stale.await.expect("stale task panicked").expect("stale run is not an error");
    assert_eq!(stale, RunOutcome::Superseded);

    let state = session.snapshot().expect("snapshot");
    let ids: Vec<&str> = state.images().iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["new-1.png-1700000000000", "new-2.png-1700000000000"]);
    assert_eq!(state.results().len(), 2);
    assert!(!state.results().contains_key("old.png-1700000000000"));
    assert_eq!(state.view_kind(), ViewKind::Results);
}

#[tokio::test(start_paused = true)]
async fn stale_failure_does_not_flag_newer_batch() {
    let fake = ScriptedEnhancer::default()
        .slow("old.png", Duration::from_secs(30))
        .failing("old.png", EnhanceError::Transport("HTTP 500".to_string()));
    let session = EnhanceSession::new(fake);
    session.upload(vec![png("old.png")]).await.expect("upload should succeed");

    let stale = tokio::spawn({
        let session = session.clone();
        async move { session.enhance().await }
    });
    wait_until_running(&session).await;
    session.upload(vec![png("new.png")]).await.expect("upload should succeed");

    let stale = stale.await.expect("stale task panicked").expect("stale failure is swallowed");

    assert_eq!(stale, RunOutcome::Superseded);
    let state = session.snapshot().expect("snapshot");
    assert_eq!(state.error(), None);
    assert_eq!(state.view_kind(), ViewKind::Results);
}

#[tokio::test]
async fn smart_auto_runs_with_preset() {
    let session = EnhanceSession::with_settings(
        ScriptedEnhancer::default(),
        EnhancementSettings {
            level: EnhancementLevel::Ultra,
            colorize: false,
            noise_reduction: 10,
            sci_fi_mode: true,
        },
    );
    session.upload(vec![png("a.png")]).await.expect("upload should succeed");

    let outcome = session.smart_auto().await.expect("smart auto should succeed");

    assert_eq!(outcome, RunOutcome::Completed { enhanced: 1 });
    assert_eq!(
        *session.snapshot().expect("snapshot").settings(),
        EnhancementSettings::smart_auto()
    );
    let prompts = session.enhancer().prompts();
    assert_eq!(prompts, vec![build_prompt(&EnhancementSettings::smart_auto())]);
    assert!(prompts[0].contains("colorize"));
    assert!(prompts[0].contains("60 out of 100"));
}

#[tokio::test]
async fn clear_error_returns_to_upload_view() {
    let fake = ScriptedEnhancer::default().failing("a.png", EnhanceError::Transport("timeout".to_string()));
    let session = EnhanceSession::new(fake);
    session.upload(vec![png("a.png")]).await.expect("upload should succeed");
    assert!(session.enhance().await.is_err());

    let View::Error { message } = session.view(&NoShare).expect("view") else {
        panic!("expected error view");
    };
    assert_eq!(message, "增强失败：timeout");

    session.clear_error().expect("clear should succeed");

    let state = session.snapshot().expect("snapshot");
    assert!(state.images().is_empty());
    assert!(state.results().is_empty());
    assert_eq!(session.view(&NoShare).expect("view"), View::Upload);
}

#[tokio::test]
async fn invalid_settings_keep_previous_ones() {
    let session = EnhanceSession::new(ScriptedEnhancer::default());

    let result = session.update_settings(EnhancementSettings {
        noise_reduction: 200,
        ..EnhancementSettings::default()
    });

    assert!(matches!(result, Err(AppError::Settings(_))));
    assert_eq!(
        *session.snapshot().expect("snapshot").settings(),
        EnhancementSettings::default()
    );
}
