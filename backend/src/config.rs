//! Runtime configuration read from the process environment.
//!
//! | variable                   | default                       |
//! |----------------------------|-------------------------------|
//! | `HOST`                     | `127.0.0.1`                   |
//! | `PORT`                     | `8000`                        |
//! | `WORKERS`                  | number of CPUs                |
//! | `WAGE_MODEL_PATH`          | `models/best_wage_model.json` |
//! | `WAGE_LOG_TARGET`          | `false`                       |
//! | `WAGE_SCHEMA`              | `extended`                    |
//! | `WAGE_PLACEHOLDER_COLUMNS` | (none)                        |
//! | `WAGE_STRICT_RANGES`       | `false`                       |
//! | `WAGE_MAX_BATCH`           | `100`                         |
//! | `GOOGLE_API_KEY`           | (unset)                       |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::features::FeatureLayout;
use crate::models::Schema;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}` ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
    /// The artifact predicts `ln(wage)`; exponentiate before classifying.
    pub log_target: bool,
    pub schema: Schema,
    pub placeholder_columns: Vec<String>,
    pub strict_ranges: bool,
    pub max_batch: usize,
    /// Key for the generative-text integration. Loaded and reported, never used for scoring.
    pub google_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            workers: num_cpus::get(),
            model_path: PathBuf::from("models/best_wage_model.json"),
            log_target: false,
            schema: Schema::Extended,
            placeholder_columns: Vec::new(),
            strict_ranges: false,
            max_batch: 100,
            google_api_key: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // WORKERS falls back to the CPU count instead of failing.
        let workers = lookup("WORKERS")
            .and_then(|w| w.trim().parse().ok())
            .filter(|w: &usize| *w > 0)
            .unwrap_or(defaults.workers);

        let placeholder_columns: Vec<String> = lookup("WAGE_PLACEHOLDER_COLUMNS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let schema = parse_or(&lookup, "WAGE_SCHEMA", defaults.schema)?;
        FeatureLayout::new(schema, placeholder_columns.clone())
            .check_placeholders()
            .map_err(|reason| ConfigError::Invalid {
                key: "WAGE_PLACEHOLDER_COLUMNS",
                value: placeholder_columns.join(","),
                reason,
            })?;

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            workers,
            model_path: lookup("WAGE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            log_target: parse_flag(&lookup, "WAGE_LOG_TARGET", defaults.log_target)?,
            schema,
            placeholder_columns,
            strict_ranges: parse_flag(&lookup, "WAGE_STRICT_RANGES", defaults.strict_ranges)?,
            max_batch: parse_or(&lookup, "WAGE_MAX_BATCH", defaults.max_batch)?,
            google_api_key: lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: v,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
