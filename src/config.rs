//! Configuration loaded from `config.toml`
//!
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [calculator]
//! income_tax_base = "net_of_iof"   # or "gross_gain"
//! negative_net = "report"          # or "clamp_to_zero"
//!
//! [alerts]
//! maturity_window_days = 30
//! high_risk_threshold = 4
//! low_liquidity_threshold = 4
//!
//! [market]
//! selic = "10.50"
//! cdi = "10.40"
//! ipca = "4.50"
//! ```

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::RendimentoError;
use crate::models::MarketIndicators;

const CONFIG_ENV: &str = "RENDIMENTO_CONFIG";
const CONFIG_FILENAME: &str = "config.toml";

/// Which gain the income tax is computed on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTaxBase {
    /// IOF is deducted first; IR applies to what is left of the gain
    #[default]
    NetOfIof,
    /// IR applies to the full gain, independently of IOF
    GrossGain,
}

/// What to do when fees push the net value below zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NegativeNetPolicy {
    #[default]
    Report,
    ClampToZero,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CalculatorConfig {
    pub income_tax_base: IncomeTaxBase,
    pub negative_net: NegativeNetPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertConfig {
    /// Remaining days at or below which maturity counts as approaching
    pub maturity_window_days: i64,
    pub high_risk_threshold: u8,
    pub low_liquidity_threshold: u8,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            maturity_window_days: 30,
            high_risk_threshold: 4,
            low_liquidity_threshold: 4,
        }
    }
}

/// Fallback indicators used when the caller does not pass them explicitly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarketDefaults {
    pub selic: Option<Decimal>,
    pub cdi: Option<Decimal>,
    pub ipca: Option<Decimal>,
}

impl MarketDefaults {
    /// Merge explicit values over the defaults; every indicator must end up set.
    pub fn resolve(
        &self,
        selic: Option<Decimal>,
        cdi: Option<Decimal>,
        ipca: Option<Decimal>,
    ) -> Result<MarketIndicators, RendimentoError> {
        Ok(MarketIndicators {
            selic: selic
                .or(self.selic)
                .ok_or(RendimentoError::MissingIndicator("selic"))?,
            cdi: cdi.or(self.cdi).ok_or(RendimentoError::MissingIndicator("cdi"))?,
            ipca: ipca
                .or(self.ipca)
                .ok_or(RendimentoError::MissingIndicator("ipca"))?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub calculator: CalculatorConfig,
    pub alerts: AlertConfig,
    pub market: MarketDefaults,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RendimentoError::Config(e.to_string()).into())
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        info!("Loading config from {:?}", path);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }
}

/// `$RENDIMENTO_CONFIG`, else `<config home>/rendimento/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(explicit));
    }
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("rendimento").join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.alerts.maturity_window_days, 30);
        assert_eq!(config.calculator.income_tax_base, IncomeTaxBase::NetOfIof);
        assert_eq!(config.calculator.negative_net, NegativeNetPolicy::Report);
    }

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            r#"
            [calculator]
            negative_net = "clamp_to_zero"

            [alerts]
            maturity_window_days = 15

            [market]
            cdi = "10.40"
            ipca = 4.5
            "#,
        )
        .unwrap();

        assert_eq!(config.calculator.negative_net, NegativeNetPolicy::ClampToZero);
        assert_eq!(config.calculator.income_tax_base, IncomeTaxBase::NetOfIof);
        assert_eq!(config.alerts.maturity_window_days, 15);
        assert_eq!(config.alerts.high_risk_threshold, 4);
        assert_eq!(config.market.cdi, Some(dec!(10.40)));
        assert_eq!(config.market.ipca, Some(dec!(4.5)));
        assert_eq!(config.market.selic, None);
    }

    #[test]
    fn test_unknown_policy_is_a_config_error() {
        let err = Config::from_toml_str("[calculator]\nnegative_net = \"ignore\"").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[calculator]\nincome_tax_base = \"gross_gain\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.calculator.income_tax_base, IncomeTaxBase::GrossGain);
    }

    #[test]
    fn test_market_resolution_prefers_explicit_values() {
        let defaults = MarketDefaults {
            selic: Some(dec!(10.50)),
            cdi: Some(dec!(10.40)),
            ipca: None,
        };
        let market = defaults
            .resolve(None, Some(dec!(11)), Some(dec!(4.2)))
            .unwrap();
        assert_eq!(market.selic, dec!(10.50));
        assert_eq!(market.cdi, dec!(11));
        assert_eq!(market.ipca, dec!(4.2));

        let err = defaults.resolve(None, None, None).unwrap_err();
        assert!(matches!(err, RendimentoError::MissingIndicator("ipca")));
    }
}
