//! Tracing subscriber initialisation.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a configured format name; anything but `json` is pretty.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Default filter directive for a configured level, e.g. `execution_scheduler=info`.
#[must_use]
pub fn default_directive(level: &str) -> String {
    format!("execution_scheduler={}", level.to_ascii_lowercase())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level seeds the
/// filter. Errors if a subscriber is already installed.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(level)))
        .map_err(|e| TracingError::Filter(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    result.map_err(|e| TracingError::Subscriber(e.to_string()))
}

/// Error type for tracing initialisation.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Invalid filter directive.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the subscriber.
    #[error("failed to initialize tracing subscriber: {0}")]
    Subscriber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_from_name() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("anything"), LogFormat::Pretty);
    }

    #[test]
    fn default_directive_targets_crate() {
        assert_eq!(default_directive("DEBUG"), "execution_scheduler=debug");
    }
}
