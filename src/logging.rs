//! Logging init: file under the per-user state dir, or fallback to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,hashutil=debug";
const LOG_FILE: &str = "hashutil.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Plain-text subscriber writing through `writer`; both init paths share it.
fn subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

pub fn log_dir() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .context("no state directory for this platform")?;
    Ok(base.join("hashutil"))
}

/// Initialize structured logging to `<state dir>/hashutil/hashutil.log`.
/// Returns Err when the log file cannot be opened so the caller can fall back.
pub fn init_logging() -> Result<PathBuf> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir).with_context(|| format!("create {}", log_dir.display()))?;
    let log_file_path = log_dir.join(LOG_FILE);

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open {}", log_file_path.display()))?;

    subscriber(Mutex::new(file)).init();
    tracing::info!("hashutil logging initialized at {}", log_file_path.display());
    Ok(log_file_path)
}

/// Initialize logging to stderr only. Use when [`init_logging`] fails.
pub fn init_logging_stderr() {
    subscriber(io::stderr).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn log_dir_is_app_specific() {
        if let Ok(dir) = log_dir() {
            assert!(dir.ends_with("hashutil"));
        }
    }

    #[test]
    fn file_subscriber_writes_plain_lines() {
        let mut log = tempfile::NamedTempFile::new().unwrap();
        let file = log.reopen().unwrap();
        tracing::subscriber::with_default(subscriber(Mutex::new(file)), || {
            tracing::error!(job = 7, "digest failed");
        });

        let mut text = String::new();
        log.as_file_mut().read_to_string(&mut text).unwrap();
        assert!(text.contains("digest failed"), "{text}");
        assert!(text.contains("job=7"), "{text}");
        assert!(!text.contains('\u{1b}'), "ansi escapes in {text}");
    }
}
