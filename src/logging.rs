//! Logging setup

use crate::config::LogFormat;
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Respects `RUST_LOG` if set, otherwise logs at `info`. Returns false, after
/// reporting on stderr, when a global subscriber was already installed.
pub fn init_logging(format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    let builder = fmt().with_env_filter(env_filter).with_writer(io::stdout);
    let result = match format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to install log subscriber: {}", e);
            false
        }
    }
}
