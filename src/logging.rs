use crate::storage::project_dirs;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "DAYBOOK_LOG";

pub enum LogTarget {
    /// Plain lines on stderr for one-shot commands.
    Stderr,
    /// Appended to a file while the TUI owns the terminal.
    File(PathBuf),
}

/// Installs the global subscriber. `DAYBOOK_LOG` wins over `default_filter`.
pub fn init(target: LogTarget, default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("building log filter")?;

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact()
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .context("installing log subscriber")?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening {:?}", path))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .context("installing log subscriber")?;
        }
    }
    Ok(())
}

pub fn default_log_file() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("daybook.log"))
}
