use crate::engine::{Fraction, OddsInput, MAX_DENOMINATOR};
use crate::table::Tolerances;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OddsType {
    American,
    Decimal,
    Fractional,
}

/// Odds and stake used by `convert` when none are given on the command line.
#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_odds_type")]
    pub odds_type: OddsType,
    /// "-110", "1.91" or "10/11" depending on `odds_type`.
    #[serde(default = "default_odds")]
    pub odds: String,
    #[serde(default = "default_stake")]
    pub stake: f64,
}

fn default_odds_type() -> OddsType {
    OddsType::American
}
fn default_odds() -> String {
    "-110".to_string()
}
fn default_stake() -> f64 {
    100.0
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            odds_type: default_odds_type(),
            odds: default_odds(),
            stake: default_stake(),
        }
    }
}

impl DefaultsConfig {
    pub fn odds_input(&self) -> Result<OddsInput> {
        parse_odds(self.odds_type, &self.odds)
            .with_context(|| format!("invalid [defaults] odds {:?}", self.odds))
    }
}

/// Parse odds text in the given notation. Validation of the value itself is
/// left to the engine, except for fractions which validate on construction.
pub fn parse_odds(odds_type: OddsType, raw: &str) -> Result<OddsInput> {
    let raw = raw.trim();
    let input = match odds_type {
        OddsType::American => OddsInput::American(
            raw.trim_start_matches('+')
                .parse::<i32>()
                .with_context(|| format!("{raw:?} is not an integer moneyline"))?,
        ),
        OddsType::Decimal => OddsInput::Decimal(
            raw.parse::<f64>()
                .with_context(|| format!("{raw:?} is not a decimal price"))?,
        ),
        OddsType::Fractional => {
            let fraction: Fraction = raw.parse()?;
            OddsInput::Fractional(fraction)
        }
    };
    Ok(input)
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversionConfig {
    #[serde(default = "default_max_denominator")]
    pub max_denominator: u64,
}

fn default_max_denominator() -> u64 {
    MAX_DENOMINATOR
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_denominator: MAX_DENOMINATOR,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    #[serde(default = "default_table_path")]
    pub path: PathBuf,
    /// Seconds before the cached table is reloaded. Absent = keep until
    /// invalidated.
    #[serde(default)]
    pub refresh_secs: Option<u64>,
    #[serde(default = "default_decimal_tolerance")]
    pub decimal_tolerance: f64,
    #[serde(default = "default_probability_tolerance")]
    pub probability_tolerance: f64,
}

fn default_table_path() -> PathBuf {
    PathBuf::from("data/odds.csv")
}
fn default_decimal_tolerance() -> f64 {
    Tolerances::default().decimal
}
fn default_probability_tolerance() -> f64 {
    Tolerances::default().probability
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: default_table_path(),
            refresh_secs: None,
            decimal_tolerance: default_decimal_tolerance(),
            probability_tolerance: default_probability_tolerance(),
        }
    }
}

impl TableConfig {
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            decimal: self.decimal_tolerance,
            probability: self.probability_tolerance,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.refresh_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "odds_converter=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// A path named by the user must exist; only the implicit
    /// [`DEFAULT_CONFIG_PATH`] may be missing.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.conversion.max_denominator == 0 {
            anyhow::bail!("[conversion] max_denominator must be at least 1");
        }
        let t = &self.table;
        if !(t.decimal_tolerance >= 0.0 && t.probability_tolerance >= 0.0) {
            anyhow::bail!("[table] tolerances must be non-negative");
        }
        Ok(())
    }
}
