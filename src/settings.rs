use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, Map};

use crate::enrich::Pacing;

/// Runtime settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    /// TMDB credential. `None` turns enrichment off.
    pub tmdb_api_key: Option<String>,
    pub pacing: Pacing,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            pacing: Pacing::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Read `TMDB_API_KEY` and the `PICKER_*` variables from the environment.
    pub fn load() -> Result<Self> {
        Self::from_config(&environment(None)?)
    }

    fn from_config(cfg: &Config) -> Result<Self> {
        let defaults = Settings::default();

        let tmdb_api_key = optional(cfg.get_string("tmdb_api_key"))?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let batch_size = match optional(cfg.get_int("picker_batch_size"))? {
            Some(n) if n > 0 => usize::try_from(n).context("PICKER_BATCH_SIZE is too large")?,
            Some(n) => anyhow::bail!("PICKER_BATCH_SIZE must be positive, got {}", n),
            None => defaults.pacing.batch_size,
        };

        let delay = match optional(cfg.get_int("picker_pacing_ms"))? {
            Some(ms) => Duration::from_millis(
                u64::try_from(ms).context("PICKER_PACING_MS must not be negative")?,
            ),
            None => defaults.pacing.delay,
        };

        let user_agent = optional(cfg.get_string("picker_user_agent"))?
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        Ok(Settings {
            tmdb_api_key,
            pacing: Pacing { batch_size, delay },
            user_agent,
        })
    }
}

/// Both sources keep their prefix in the key, so `PICKER_*` can never set
/// the TMDB credential and `TMDB_*` can never set picker options.
/// `vars` replaces the process environment when given.
fn environment(vars: Option<Map<String, String>>) -> Result<Config> {
    Config::builder()
        .add_source(Environment::with_prefix("TMDB").keep_prefix(true).source(vars.clone()))
        .add_source(Environment::with_prefix("PICKER").keep_prefix(true).source(vars))
        .build()
        .context("Failed to read settings from the environment")
}

fn default_user_agent() -> String {
    format!("list-picker/{}", env!("CARGO_PKG_VERSION"))
}

/// Missing keys are fine; malformed values are not.
fn optional<T>(res: std::result::Result<T, ConfigError>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
