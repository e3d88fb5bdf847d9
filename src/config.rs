//! Server configuration from the environment

use crate::llm::LlmConfig;
use crate::state_machine::state::DEFAULT_MAX_STEPS;
use crate::time::parse_zone;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MIN_SLOT_MINUTES: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{var}={value:?} is invalid: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `SQLite` file; `None` keeps events in memory
    pub db_path: Option<PathBuf>,
    /// Zone used to interpret dates and render times
    pub tz: Tz,
    pub max_steps: u32,
    pub request_timeout: Duration,
    pub min_slot: chrono::Duration,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            tz: Tz::UTC,
            max_steps: DEFAULT_MAX_STEPS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_slot: chrono::Duration::minutes(DEFAULT_MIN_SLOT_MINUTES),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|var| std::env::var(var).ok())?;
        config.llm = LlmConfig::from_env();
        Ok(config)
    }

    /// Build from any variable source. LLM settings are left at their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let tz = match get("CALENDAR_AGENT_TZ") {
            Some(name) => parse_zone(&name).map_err(|e| ConfigError {
                var: "CALENDAR_AGENT_TZ",
                value: name.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.tz,
        };

        let max_steps: u32 =
            parse_var(&get, "CALENDAR_AGENT_MAX_STEPS")?.unwrap_or(defaults.max_steps);
        if max_steps == 0 {
            return Err(ConfigError {
                var: "CALENDAR_AGENT_MAX_STEPS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs: u64 =
            parse_var(&get, "CALENDAR_AGENT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let min_slot_minutes: i64 =
            parse_var(&get, "CALENDAR_AGENT_MIN_SLOT_MINUTES")?.unwrap_or(DEFAULT_MIN_SLOT_MINUTES);
        let min_slot = chrono::Duration::try_minutes(min_slot_minutes)
            .filter(|d| *d > chrono::Duration::zero())
            .ok_or_else(|| ConfigError {
                var: "CALENDAR_AGENT_MIN_SLOT_MINUTES",
                value: min_slot_minutes.to_string(),
                reason: "must be a positive number of minutes".to_string(),
            })?;

        Ok(Self {
            port: parse_var(&get, "CALENDAR_AGENT_PORT")?.unwrap_or(defaults.port),
            db_path: get("CALENDAR_AGENT_DB_PATH").map(PathBuf::from),
            tz,
            max_steps,
            request_timeout: Duration::from_secs(timeout_secs),
            min_slot,
            llm: defaults.llm,
        })
    }
}

fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
