//! Tracing setup. The terminal belongs to the TUI while it runs, so log
//! output goes to a file instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber writing to `log_path`. Verbosity comes from
/// `RUST_LOG` and defaults to `info`.
pub fn init(log_path: &Path) -> Result<()> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", log_path.display()))?;
    fs::create_dir_all(dir).context("failed to create log directory")?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let writer = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
