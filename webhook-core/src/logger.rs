//! 日志初始化：fmt layer 输出到 stdout，可选同时追加写入日志文件。

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::writer::{BoxMakeWriter, MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// 初始化全局 tracing 订阅者。
/// `filter` 为日志级别指令（如 `info`、`webhook_registrar=debug`）；无效或未提供时使用 `info`。
/// 提供 `log_file_path` 时，同一份输出追加写入该文件。
pub fn init_tracing(filter: Option<&str>, log_file_path: Option<&str>) -> anyhow::Result<()> {
    let env_filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let writer = match log_file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(io::stdout.and(Arc::new(file)))
        }
        None => BoxMakeWriter::new(io::stdout),
    };

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
