use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use technical_analysis::{IndicatorConfig, IndicatorSet};

use crate::cache::DEFAULT_TTL_SECS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub cache_ttl_secs: i64,     // 300 (5 minutes)
    pub history_days: i64,       // 365
    pub indicator_set: IndicatorSet,
    pub indicators: IndicatorConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_TTL_SECS,
            history_days: 365,
            indicator_set: IndicatorSet::Extended,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Read `ANALYSIS_*` variables, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            cache_ttl_secs: env::var("ANALYSIS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_TTL_SECS.to_string())
                .parse()
                .context("ANALYSIS_CACHE_TTL_SECS must be a whole number of seconds")?,
            history_days: env::var("ANALYSIS_HISTORY_DAYS")
                .unwrap_or_else(|_| "365".to_string())
                .parse()
                .context("ANALYSIS_HISTORY_DAYS must be a whole number of days")?,
            indicator_set: parse_indicator_set(
                &env::var("ANALYSIS_INDICATOR_SET").unwrap_or_else(|_| "extended".to_string()),
            )?,
            indicators: IndicatorConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs < 0 {
            bail!("cache TTL cannot be negative: {}", self.cache_ttl_secs);
        }
        if self.history_days <= 0 {
            bail!("history window must be at least one day: {}", self.history_days);
        }
        self.indicators
            .validate()
            .context("invalid indicator configuration")?;
        Ok(())
    }
}

pub fn parse_indicator_set(raw: &str) -> Result<IndicatorSet> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "basic" => Ok(IndicatorSet::Basic),
        "extended" | "advanced" => Ok(IndicatorSet::Extended),
        other => bail!("unknown indicator set '{}', expected basic or extended", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrchestratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.indicator_set, IndicatorSet::Extended);
    }

    #[test]
    fn test_parse_indicator_set() {
        assert_eq!(parse_indicator_set("Basic").unwrap(), IndicatorSet::Basic);
        assert_eq!(parse_indicator_set(" extended ").unwrap(), IndicatorSet::Extended);
        assert!(parse_indicator_set("everything").is_err());
    }

    #[test]
    fn test_rejects_bad_windows() {
        let config = OrchestratorConfig {
            history_days: 0,
            ..OrchestratorConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = OrchestratorConfig::default();
        config.indicators.rsi_period = 0;
        assert!(config.validate().is_err());
    }
}
