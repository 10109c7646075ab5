use std::{env, time::Duration};

use runtime::SessionConfig;
use strategy::{ExitRule, SizingConfig, StrategyError};
use thiserror::Error;

pub const MIN_CAPITAL: f64 = 1_000.0;

const ENV_CAPITAL: &str = "TRADER_CAPITAL";
const ENV_SEED: &str = "TRADER_SEED";
const ENV_FEED_INTERVAL: &str = "TRADER_FEED_INTERVAL_MS";
const ENV_DECISION_INTERVAL: &str = "TRADER_DECISION_INTERVAL_MS";
const ENV_REPORT_INTERVAL: &str = "TRADER_REPORT_INTERVAL_MS";
const ENV_WARMUP: &str = "TRADER_WARMUP_MS";
const ENV_SUMMARY_FORMAT: &str = "TRADER_SUMMARY_FORMAT";
const ENV_STOP_LOSS_PCT: &str = "TRADER_STOP_LOSS_PCT";
const ENV_TAKE_PROFIT_PCT: &str = "TRADER_TAKE_PROFIT_PCT";
const ENV_POSITION_SIZE_PCT: &str = "TRADER_POSITION_SIZE_PCT";
const ENV_MAX_OPEN_POSITIONS: &str = "TRADER_MAX_OPEN_POSITIONS";
const ENV_MIN_CONFIDENCE: &str = "TRADER_MIN_CONFIDENCE";

const DEFAULT_FEED_INTERVAL_MS: u64 = 50;
const DEFAULT_DECISION_INTERVAL_MS: u64 = 150;
const DEFAULT_REPORT_INTERVAL_MS: u64 = 1_000;
const DEFAULT_WARMUP_MS: u64 = 3_000;
const DEFAULT_SUMMARY_FORMAT: SummaryFormat = SummaryFormat::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl SummaryFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Skips the interactive prompt when set. Not yet checked against
    /// [`MIN_CAPITAL`].
    pub capital: Option<f64>,
    pub seed: Option<u64>,
    pub feed_interval_ms: u64,
    pub decision_interval_ms: u64,
    pub report_interval_ms: u64,
    pub warmup_ms: u64,
    pub summary_format: SummaryFormat,
    pub exit_rule: ExitRule,
    pub sizing: SizingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("TRADER_CAPITAL must be a number")]
    InvalidCapital,
    #[error("TRADER_SEED must be an unsigned integer")]
    InvalidSeed,
    #[error("{0} must be a positive whole number of milliseconds")]
    InvalidInterval(&'static str),
    #[error("TRADER_WARMUP_MS must be a whole number of milliseconds")]
    InvalidWarmup,
    #[error("TRADER_SUMMARY_FORMAT must be one of: text, json")]
    InvalidSummaryFormat,
    #[error("{0} contains non-unicode data")]
    NonUnicode(&'static str),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("invalid risk settings: {0}")]
    Risk(#[from] StrategyError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapitalError {
    #[error("no capital entered")]
    Missing,
    #[error("'{0}' is not a number")]
    Unparsable(String),
    #[error("capital must be a finite number")]
    NotFinite,
    #[error("Minimum capital is $1,000 (got ${0:.2})")]
    BelowMinimum(f64),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let capital = read_env(ENV_CAPITAL)?
            .map(|value| {
                value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidCapital)
            })
            .transpose()?;

        let seed = read_env(ENV_SEED)?
            .map(|value| value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidSeed))
            .transpose()?;

        let feed_interval_ms = parse_interval_env(ENV_FEED_INTERVAL, DEFAULT_FEED_INTERVAL_MS)?;
        let decision_interval_ms =
            parse_interval_env(ENV_DECISION_INTERVAL, DEFAULT_DECISION_INTERVAL_MS)?;
        let report_interval_ms =
            parse_interval_env(ENV_REPORT_INTERVAL, DEFAULT_REPORT_INTERVAL_MS)?;

        let warmup_ms = match read_env(ENV_WARMUP)? {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidWarmup)?,
            None => DEFAULT_WARMUP_MS,
        };

        let summary_format = match read_env(ENV_SUMMARY_FORMAT)? {
            Some(value) => SummaryFormat::parse(value.trim().to_ascii_lowercase().as_str())
                .ok_or(ConfigError::InvalidSummaryFormat)?,
            None => DEFAULT_SUMMARY_FORMAT,
        };

        let exit_defaults = ExitRule::default();
        let exit_rule = ExitRule::new(
            parse_pct_env(ENV_STOP_LOSS_PCT, exit_defaults.stop_loss_pct())?,
            parse_pct_env(ENV_TAKE_PROFIT_PCT, exit_defaults.take_profit_pct())?,
        )?;

        let sizing_defaults = SizingConfig::default();
        let max_open_positions = match read_env(ENV_MAX_OPEN_POSITIONS)? {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber(ENV_MAX_OPEN_POSITIONS))?,
            None => sizing_defaults.max_open_positions(),
        };
        let sizing = SizingConfig::new(
            parse_pct_env(ENV_POSITION_SIZE_PCT, sizing_defaults.capital_fraction())?,
            max_open_positions,
            parse_f64_env(ENV_MIN_CONFIDENCE, sizing_defaults.min_confidence())?,
        )?;

        Ok(Self {
            capital,
            seed,
            feed_interval_ms,
            decision_interval_ms,
            report_interval_ms,
            warmup_ms,
            summary_format,
            exit_rule,
            sizing,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            seed: self.seed,
            feed_interval: Duration::from_millis(self.feed_interval_ms),
            decision_interval: Duration::from_millis(self.decision_interval_ms),
            report_interval: Duration::from_millis(self.report_interval_ms),
            warmup: Duration::from_millis(self.warmup_ms),
            exit_rule: self.exit_rule,
            sizing: self.sizing,
            ..SessionConfig::default()
        }
    }
}

/// Parses operator input as starting capital.
pub fn parse_capital(input: &str) -> Result<f64, CapitalError> {
    let trimmed = input.trim().trim_start_matches('$').replace(',', "");
    if trimmed.is_empty() {
        return Err(CapitalError::Missing);
    }
    let capital = trimmed
        .parse::<f64>()
        .map_err(|_| CapitalError::Unparsable(input.trim().to_owned()))?;
    validate_capital(capital)
}

pub fn validate_capital(capital: f64) -> Result<f64, CapitalError> {
    if !capital.is_finite() {
        return Err(CapitalError::NotFinite);
    }
    if capital < MIN_CAPITAL {
        return Err(CapitalError::BelowMinimum(capital));
    }
    Ok(capital)
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode(key)),
    }
}

fn parse_f64_env(key: &'static str, default_value: f64) -> Result<f64, ConfigError> {
    match read_env(key)? {
        Some(value) => parse_number(key, &value),
        None => Ok(default_value),
    }
}

/// Reads a percentage such as `1.8` and returns it as a fraction.
fn parse_pct_env(key: &'static str, default_fraction: f64) -> Result<f64, ConfigError> {
    match read_env(key)? {
        Some(value) => Ok(parse_number(key, &value)? / 100.0),
        None => Ok(default_fraction),
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidNumber(key))
}

fn parse_interval_env(key: &'static str, default_value: u64) -> Result<u64, ConfigError> {
    match read_env(key)? {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ConfigError::InvalidInterval(key)),
        },
        None => Ok(default_value),
    }
}
