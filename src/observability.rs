//! Observability hooks for the decoder.
//!
//! Decoding a damaged chunk is mostly a diagnostic exercise, so each stage emits
//! structured key/value events through the `log_metric!` macro. Events go to the
//! `log` facade at debug level under the `chunkscope::metric` target; nothing is
//! printed unless the host application installs a logger, for example via
//! `init_logging`.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Once;

use crate::config::LoggingConfig;
use crate::error::InspectError;

/// Logs a structured key-value metric line at debug level.
///
/// # Example
/// ```ignore
/// log_metric!("event" = "block_decoded", "block" = ix, "entries" = n);
/// ```
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(target: "chunkscope::metric", log::Level::Debug) {
            let mut parts: Vec<String> = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!(target: "chunkscope::metric", "CHUNK_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend configured from `LoggingConfig`.
///
/// Only the first call has an effect; later calls (or a logger installed by the
/// host) are left untouched.
pub fn init_logging(config: &LoggingConfig) -> Result<(), InspectError> {
    let level = LevelFilter::from_str(&config.level).map_err(|_| {
        InspectError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unknown log level '{}'", config.level),
        ))
    })?;

    let file = match &config.file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(level);

        // Compact formatter: just the level and the message.
        builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
