use cap_std::fs_utf8::Dir;
use miette::{Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "hues.log";

/// Logs to stderr and to `hues.log` in the data dir. `RUST_LOG` overrides the default `info`.
/// Logs are written to the file until the returned guard is dropped.
pub fn install_tracing(hues_dir: &Dir) -> Result<WorkerGuard> {
    let log_file = hues_dir
        .create(LOG_FILE_NAME)
        .into_diagnostic()
        .wrap_err("failed to create log file")?
        .into_std();
    let (writer, guard) = tracing_appender::non_blocking(log_file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .into_diagnostic()
        .wrap_err("failed to set global tracing subscriber")?;
    Ok(guard)
}
