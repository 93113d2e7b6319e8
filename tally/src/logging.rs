use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides where log files are written
pub const LOG_DIR_ENV: &str = "TALLY_LOG_DIR";

/// Log files from earlier runs kept next to the new one
const KEEP_LOG_FILES: usize = 20;

const LOG_PREFIX: &str = "tally-";
const LOG_SUFFIX: &str = ".log";

/// The current run's log file. Dropping it flushes and closes the writer.
pub struct LogFile {
    path: PathBuf,
    _guard: WorkerGuard,
}

impl LogFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `TALLY_LOG_DIR`, or `<config dir>/tally/logs`
pub fn log_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("tally")
        .join("logs"))
}

/// Send tracing output to a fresh file for this run.
///
/// Stdout carries command output and stderr carries prompts, so nothing is
/// logged to either.
pub fn init_logging(verbose: u8) -> Result<LogFile> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let pruned = prune_logs(&dir, KEEP_LOG_FILES);
    let file_name = log_file_name(Local::now());
    let path = dir.join(&file_name);
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, &file_name));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("Logging was already initialized")?;

    match pruned {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(removed, "Pruned old log files"),
        Err(e) => tracing::warn!(error = %e, dir = %dir.display(), "Could not prune old log files"),
    }

    Ok(LogFile {
        path,
        _guard: guard,
    })
}

fn log_file_name(started: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        LOG_PREFIX,
        started.format("%Y%m%d-%H%M%S"),
        LOG_SUFFIX
    )
}

/// Filter used when `RUST_LOG` is not set
fn default_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "info,tally=debug,tally_api=debug,tally_auth=debug",
        _ => "debug,tally=trace,tally_api=trace,tally_auth=trace",
    }
}

/// Delete all but the newest `keep` log files in `dir`.
///
/// Names embed the start time, so the newest files sort last.
fn prune_logs(dir: &Path, keep: usize) -> std::io::Result<usize> {
    let mut logs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX))
        })
        .collect();

    if logs.len() <= keep {
        return Ok(0);
    }
    logs.sort();

    let stale = logs.len() - keep;
    for path in &logs[..stale] {
        std::fs::remove_file(path)?;
    }
    Ok(stale)
}
