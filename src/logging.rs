use tracing_subscriber::EnvFilter;

use crate::cli::TracingFormat;
use crate::config::Config;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the configured level applies to this crate and everything
/// else stays at `warn`.
pub fn setup_logging(config: &Config, format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,portal={}", config.log_level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        TracingFormat::Pretty => builder.init(),
        TracingFormat::Json => builder.json().init(),
    }
}
