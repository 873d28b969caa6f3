//! # NeoRevive 照片增强库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                宿主外壳 (WebView / 桌面壳)                │
//! │                                                          │
//! │  上传区 ── 设置面板 ── 结果网格 ── 导出 / 分享            │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ EnhanceSession (Result<T, AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                           │
//! │                                                          │
//! │  ┌─ session ──── 会话：串联上传 / 批处理 / 状态           │
//! │  │                                                       │
//! │  ├─ intake ───── 并发读取上传文件 → SourceImage           │
//! │  ├─ batch ────── 并发扇出，全部成功才发布                 │
//! │  │   └─ enhancer   单张调用 generateContent (reqwest)     │
//! │  │       └─ prompt 设置 → 指令文本                        │
//! │  ├─ state ────── AppState + Action，generation 防过期     │
//! │  ├─ view ─────── 视图选择 + 结果卡片                      │
//! │  └─ export ───── 保存文件 / 平台分享                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，会话所有操作的返回类型 |
//! | [`settings`] | 增强级别、增强设置、一键智能预设与校验 |
//! | [`prompt`] | 由设置生成发给图像服务的指令文本 |
//! | [`model`] | `SourceImage` / `EncodedImage` / `MimeType` |
//! | [`enhancer`] | `ImageEnhancer` trait 与基于 reqwest 的 `GeminiEnhancer` |
//! | [`intake`] | 上传文件句柄与并发读取 |
//! | [`batch`] | 批处理编排：并发增强、全有或全无 |
//! | [`state`] | 状态容器与状态转移 |
//! | [`view`] | 由状态推导视图 |
//! | [`export`] | 导出命名、保存、分享能力探测 |
//! | [`session`] | 面向宿主的异步会话 API |
//! | [`logging`] | `env_logger` 初始化 |

pub mod error;
pub mod settings;
pub mod prompt;
pub mod model;
pub mod enhancer;
pub mod intake;
pub mod batch;
pub mod state;
pub mod view;
pub mod export;
pub mod session;
pub mod logging;

pub use error::AppError;
pub use session::{EnhanceSession, RunOutcome};
