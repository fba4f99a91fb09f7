//! Core configuration: provider endpoints, retry policy and cache bounds.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working setup.

use crate::data::{DataError, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub provider: ProviderConfig,
    pub retry: RetryPolicy,
    pub cache: CacheConfig,
}

impl CoreConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        let config: Self =
            toml::from_str(content).map_err(|e| DataError::Config(format!("parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.retry.max_attempts == 0 {
            return Err(DataError::Config("retry.max_attempts must be >= 1".into()));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(DataError::Config("retry.multiplier must be >= 1.0".into()));
        }
        for (name, policy) in [("ticker", &self.cache.ticker), ("series", &self.cache.series)] {
            if policy.capacity == 0 {
                return Err(DataError::Config(format!(
                    "cache.{name}.capacity must be >= 1"
                )));
            }
        }
        if self.provider.timeout_secs == 0 {
            return Err(DataError::Config("provider.timeout_secs must be >= 1".into()));
        }
        Ok(())
    }
}

/// HTTP provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub search_url: String,
    pub chart_url: String,
    pub user_agent: String,
    /// Per-request timeout; bounds each attempt independently of the retry loop.
    pub timeout_secs: u64,
    /// How many candidates to ask the search endpoint for.
    pub quotes_count: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            search_url: "https://query2.finance.yahoo.com/v1/finance/search".into(),
            chart_url: "https://query2.finance.yahoo.com/v8/finance/chart".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            timeout_secs: 10,
            quotes_count: 5,
        }
    }
}

/// TTL and capacity for both caches.
///
/// A partial `[cache.ticker]` or `[cache.series]` table keeps that cache's own
/// defaults for the fields it leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CacheConfigToml")]
pub struct CacheConfig {
    pub ticker: CachePolicy,
    pub series: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ticker: CachePolicy::ticker(),
            series: CachePolicy::series(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePolicy {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl CachePolicy {
    /// Name → symbol mappings are near-static.
    pub fn ticker() -> Self {
        Self {
            ttl_secs: 3600,
            capacity: 500,
        }
    }

    /// Prices move continuously; dashboard interactions are bursty.
    pub fn series() -> Self {
        Self {
            ttl_secs: 120,
            capacity: 200,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn overridden(self, overrides: PolicyOverrides) -> Self {
        Self {
            ttl_secs: overrides.ttl_secs.unwrap_or(self.ttl_secs),
            capacity: overrides.capacity.unwrap_or(self.capacity),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheConfigToml {
    ticker: PolicyOverrides,
    series: PolicyOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PolicyOverrides {
    ttl_secs: Option<u64>,
    capacity: Option<usize>,
}

impl From<CacheConfigToml> for CacheConfig {
    fn from(raw: CacheConfigToml) -> Self {
        Self {
            ticker: CachePolicy::ticker().overridden(raw.ticker),
            series: CachePolicy::series().overridden(raw.series),
        }
    }
}
