use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::Result;

/// Install the global subscriber: console output plus, unless disabled, a daily-rolling JSON
/// file under `config.directory`.
///
/// The returned guard flushes the file writer when dropped, so hold it until the run ends.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = if config.file_output {
        fs::create_dir_all(&config.directory)?;
        let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        (Some(fmt::layer().json().with_writer(writer)), Some(guard))
    } else {
        (None, None)
    };

    // Row spans already name the franchise, module targets only add noise on the console
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

/// RUST_LOG wins over the configured default filter.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}
