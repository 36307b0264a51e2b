//! Tracing subscriber setup
//!
//! For applications embedding the library; the library itself only emits
//! events through `tracing` and never installs a subscriber on its own.

use crate::config::{LogFormat, LoggingConfig};
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if a
/// global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(env_filter(config));

    match config.format {
        // JSON logging for production (better for log aggregation)
        LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Pretty => subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_only_once() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            filter: "realm_auth=debug".to_string(),
        };
        // Another test may have installed a subscriber first; either way the
        // second call in this test must fail.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
