//! # 视图选择
//!
//! 当前展示哪个页面完全由 (是否运行中, 错误信息, 图片数量) 决定，
//! 按优先级：运行中 → 加载页；有错误 → 错误页；有图片 → 结果网格；否则 → 上传页。

use serde::Serialize;

use crate::export::{ExportAction, ShareCapability, available_actions};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    Upload,
    Loading,
    Error,
    Results,
}

/// 纯函数：相同输入永远得到相同视图。
pub fn derive_view(running: bool, error: Option<&str>, image_count: usize) -> ViewKind {
    if running {
        ViewKind::Loading
    } else if error.is_some() {
        ViewKind::Error
    } else if image_count > 0 {
        ViewKind::Results
    } else {
        ViewKind::Upload
    }
}

/// 结果网格中的一张卡片。
///
/// 还没有增强结果时只展示原图；有结果后展示前后对比与导出操作。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCard {
    pub id: String,
    pub name: String,
    pub original_url: String,
    pub enhanced_url: Option<String>,
    pub actions: Vec<ExportAction>,
}

impl ImageCard {
    pub fn is_comparable(&self) -> bool {
        self.enhanced_url.is_some()
    }
}

/// 交给宿主渲染的完整视图。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum View {
    Upload,
    Loading,
    Error { message: String },
    Results { cards: Vec<ImageCard> },
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::Upload => ViewKind::Upload,
            Self::Loading => ViewKind::Loading,
            Self::Error { .. } => ViewKind::Error,
            Self::Results { .. } => ViewKind::Results,
        }
    }
}

/// 由状态构建视图。
pub fn render(state: &AppState, share: &dyn ShareCapability) -> View {
    match state.view_kind() {
        ViewKind::Loading => View::Loading,
        ViewKind::Upload => View::Upload,
        ViewKind::Error => View::Error {
            message: state.error().unwrap_or_default().to_string(),
        },
        ViewKind::Results => {
            let actions = available_actions(share);
            let cards = state
                .images()
                .iter()
                .map(|image| {
                    let enhanced = state.results().get(image.id());
                    ImageCard {
                        id: image.id().to_string(),
                        name: image.name().to_string(),
                        original_url: image.data_url().to_string(),
                        enhanced_url: enhanced.map(|e| e.data_url()),
                        actions: if enhanced.is_some() {
                            actions.clone()
                        } else {
                            Vec::new()
                        },
                    }
                })
                .collect();
            View::Results { cards }
        }
    }
}
