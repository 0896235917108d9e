//! Subscriber bootstrap for hosts that want panelgrid's diagnostics.
//!
//! The library crates only emit `tracing` events and spans; nothing is
//! printed until a host installs a subscriber. [`init`] installs a global
//! one filtered by `RUST_LOG` (or explicit directives), writing text or,
//! with the `tracing-json` feature, one JSON object per line.

use std::fmt;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

/// Directives used when neither the config nor `RUST_LOG` provides any.
pub const DEFAULT_DIRECTIVES: &str = "panelgrid=info,panelgrid_runtime=info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// Newline-delimited JSON. Needs the `tracing-json` feature.
    #[cfg(feature = "tracing-json")]
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// `EnvFilter` directives; `None` reads `RUST_LOG`.
    pub directives: Option<String>,
    pub format: LogFormat,
    /// Include the event target (module path) in each line.
    pub with_target: bool,
}

impl LogConfig {
    #[must_use]
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug)]
pub enum LoggingError {
    /// Explicit directives did not parse.
    Filter(ParseError),
    /// A global subscriber is already installed.
    AlreadyInstalled(TryInitError),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(e) => write!(f, "invalid log filter: {e}"),
            Self::AlreadyInstalled(e) => write!(f, "could not install subscriber: {e}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filter(e) => Some(e),
            Self::AlreadyInstalled(e) => Some(e),
        }
    }
}

/// Build the filter for `config`.
///
/// Explicit directives must parse. Without them `RUST_LOG` is used when it
/// parses, and [`DEFAULT_DIRECTIVES`] otherwise.
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    match &config.directives {
        Some(directives) => EnvFilter::try_new(directives).map_err(LoggingError::Filter),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))),
    }
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Text => registry
            .with(tracing_fmt::layer().with_target(config.with_target))
            .try_init(),
        #[cfg(feature = "tracing-json")]
        LogFormat::Json => registry
            .with(
                tracing_fmt::layer()
                    .json()
                    .with_target(config.with_target)
                    .with_span_list(false),
            )
            .try_init(),
    };
    installed.map_err(LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directives_are_validated() {
        let ok = LogConfig::default().with_directives("panelgrid_runtime=trace,warn");
        assert!(build_filter(&ok).is_ok());

        let bad = LogConfig::default().with_directives("panelgrid_runtime=loud");
        let err = build_filter(&bad).expect_err("bad level");
        assert!(matches!(err, LoggingError::Filter(_)));
        assert!(err.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn second_install_is_rejected() {
        let config = LogConfig::default().with_directives("panelgrid_runtime=debug");
        init(&config).expect("first install");
        let err = init(&config).expect_err("already installed");
        assert!(matches!(err, LoggingError::AlreadyInstalled(_)));
        tracing::debug!(target: "panelgrid_runtime", "visible once installed");
    }
}
