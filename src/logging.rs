//! 日志初始化。
//!
//! 默认级别 `info`，可通过 `RUST_LOG` 覆盖。重复调用不会报错，
//! 宿主外壳与测试都可以放心调用。

/// 安装 `env_logger`。已安装过时返回 `false`。
pub fn init_logging() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}
