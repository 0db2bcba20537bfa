//! Log setup: a daily-rotated file under the data directory, optionally
//! mirrored to stderr.

use std::path::Path;

use anyhow::Result;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const LOG_FILE_PREFIX: &str = "pomodesk";

/// Installs the global subscriber. `show_stderr` must stay off while the
/// terminal UI owns the screen.
pub fn enable_logging(data_dir: &Path, show_stderr: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(data_dir.join("logs"))?;

    let stderr = std::io::stderr.with_filter(move |_| show_stderr);

    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
        )))
        .with_ansi(false)
        .with_writer(stderr.and(appender))
        .init();
    Ok(())
}
