//! 日志系统初始化.
//!
//! 基于 tracing 生态: 控制台彩色输出 + 可选的按日滚动文件输出.
//! 库 crate 内部统一使用 `log` 宏记录, 由 tracing-subscriber 的
//! log 桥接一并收集.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 过滤指令, 如 `"info"` 或 `"liu_format=trace"`
    pub level: String,
    /// 日志文件目录; `None` 表示只输出到控制台
    #[serde(default)]
    pub directory: Option<String>,
    /// 日志文件名前缀
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "liu".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化全局日志订阅器
///
/// 进程内只应调用一次; 文件输出的后台线程守卫在进程生命周期内持有.
pub fn init(config: LoggingConfig) -> Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_filter(EnvFilter::new(&config.level));

    let file_layer = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("创建日志目录失败: {directory}"))?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            LOG_GUARD.set(guard).ok();
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(&config.level)),
            )
        }
        None => None,
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志订阅器注册失败 (是否重复初始化?)")?;
    tracing::info!(level = %config.level, "日志系统已初始化");
    Ok(())
}
