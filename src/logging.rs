//! 日志模块 - CI 步骤的控制台日志
//!
//! 级别跟随 Runner 的调试开关（RUNNER_DEBUG=1 时输出调试日志）

use tracing_subscriber::EnvFilter;

/// 由 Runner 的调试开关决定默认级别
fn default_level() -> tracing::Level {
    match std::env::var("RUNNER_DEBUG") {
        Ok(v) if v == "1" => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    }
}

/// 初始化日志系统
pub fn init() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(default_level().into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .init();
}
