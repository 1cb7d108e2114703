//! Client configuration.
//!
//! A [`ClientConfig`] carries everything one exchange-client instance needs:
//! credentials, endpoint URLs, the currency-code remap table, and the numeric
//! precision rules used when converting amounts back to wire format.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Direction used when truncating amounts/prices to exchange precision.
///
/// Exchanges disagree on the rule, so it is configurable rather than
/// hardcoded. `Floor` is the default: rounding an amount down can never
/// overdraw a balance on the sell side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    Floor,
    HalfUp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API key for private endpoints.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for request signing.
    #[serde(default)]
    pub secret: Option<String>,
    /// Base URL for public (unauthenticated) endpoints.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Base URL for the authenticated trading API.
    #[serde(default = "default_trading_url")]
    pub trading_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Decimal places applied when converting amounts/prices to wire format.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Truncation direction for precision conversion.
    #[serde(default)]
    pub rounding: RoundingMode,
    /// Per-exchange remap of legacy/rebranded ticker symbols to canonical
    /// codes. Merged over the exchange's built-in table; entries here win.
    #[serde(default)]
    pub common_currencies: HashMap<String, String>,
}

fn default_public_url() -> String {
    "https://poloniex.com/public".into()
}

fn default_trading_url() -> String {
    "https://poloniex.com/tradingApi".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_precision() -> u32 {
    8
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret: None,
            public_url: default_public_url(),
            trading_url: default_trading_url(),
            timeout_secs: default_timeout_secs(),
            precision: default_precision(),
            rounding: RoundingMode::default(),
            common_currencies: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Pick up credentials from the environment (`CAMBIST_API_KEY` /
    /// `CAMBIST_API_SECRET`), reading a `.env` file if present. Existing
    /// explicit credentials are kept.
    #[must_use]
    pub fn with_env_credentials(mut self) -> Self {
        let _ = dotenvy::dotenv();
        if self.api_key.is_none() {
            self.api_key = std::env::var("CAMBIST_API_KEY").ok();
        }
        if self.secret.is_none() {
            self.secret = std::env::var("CAMBIST_API_SECRET").ok();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.public_url.is_empty() {
            return Err(ConfigError::MissingField { field: "public_url" }.into());
        }
        if self.trading_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "trading_url",
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        // rust_decimal supports at most 28 fractional digits.
        if self.precision > 28 {
            return Err(ConfigError::InvalidValue {
                field: "precision",
                reason: format!("{} exceeds the maximum of 28", self.precision),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.precision, 8);
        assert_eq!(config.rounding, RoundingMode::Floor);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "timeout_secs",
                ..
            }))
        ));
    }

    #[test]
    fn excessive_precision_is_rejected() {
        let config = ClientConfig {
            precision: 40,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_parses_with_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_key = "k"
            secret = "s"
            rounding = "half_up"

            [common_currencies]
            STR = "XLM"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.rounding, RoundingMode::HalfUp);
        assert_eq!(config.common_currencies.get("STR").map(String::as_str), Some("XLM"));
        assert_eq!(config.timeout_secs, 30);
    }
}
