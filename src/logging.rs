//! Log setup
//!
//! casement logs through the `log` facade. Embedders that already install a
//! logger need nothing from here; standalone tools and tests can call
//! [`init`] to get an `env_logger` configured from [`LoggingConfig`].
//! `RUST_LOG` always wins over the configured level.

use anyhow::{Context, Result};
use log::debug;

use crate::config::LoggingConfig;

/// Installs `env_logger` as the global logger.
///
/// Fails if another logger was installed first.
pub fn init(config: &LoggingConfig) -> Result<()> {
    builder(config)
        .try_init()
        .context("Failed to install logger")?;

    debug!("📝 Logging initialized at level {}", config.level);
    Ok(())
}

/// Like [`init`], but quietly keeps an existing logger
pub fn try_init(config: &LoggingConfig) -> bool {
    builder(config).try_init().is_ok()
}

fn builder(config: &LoggingConfig) -> env_logger::Builder {
    let level = config.level.to_ascii_lowercase();
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if config.timestamps {
        builder.format_timestamp_millis();
    } else {
        builder.format_timestamp(None);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let config = LoggingConfig {
            level: "TRACE".to_string(),
            timestamps: false,
        };

        // Whichever call comes first in this process wins
        let _ = try_init(&config);
        assert!(init(&config).is_err());
        assert!(!try_init(&config));
    }
}
