//! Startup configuration: environment credentials and the posting plan file.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::message::MessageSet;
use crate::schedule::ScheduleSpec;

/// Environment variable holding the Slack OAuth token.
pub const TOKEN_ENV: &str = "SLACK_USER_TOKEN";

/// Environment variable holding the target channel ID.
pub const CHANNEL_ENV: &str = "CHANNEL_ID";

/// Environment variable overriding the plan file path.
pub const PLAN_PATH_ENV: &str = "ROLLCALL_PLAN";

const DEFAULT_PLAN_PATH: &str = "rollcall.yaml";

/// Errors that can occur when loading configuration. All are startup-fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is unset or empty.
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// Failed to read the plan file.
    #[error("failed to read plan file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the plan file. Covers malformed YAML as well as
    /// invalid values (empty message list, out-of-range time fields).
    #[error("invalid plan file '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Environment-provided configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Slack OAuth token used as the bearer credential.
    pub token: String,
    /// Channel to post into.
    pub channel: String,
    /// Path to the posting plan file.
    pub plan_path: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Token and channel are required; the plan path falls back to
    /// `rollcall.yaml` in the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = required_env(TOKEN_ENV)?;
        let channel = required_env(CHANNEL_ENV)?;
        let plan_path = env::var(PLAN_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PLAN_PATH));

        Ok(Self {
            token,
            channel,
            plan_path,
        })
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

/// What to post and when: a schedule plus an ordered message set.
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    /// Weekly schedule for scheduled mode.
    pub schedule: ScheduleSpec,
    /// Parent message followed by thread replies.
    pub messages: MessageSet,
}

impl Plan {
    /// Load a plan from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A small built-in plan for verifying the pipeline in immediate mode
    /// when no plan file is present.
    pub fn builtin_test() -> Self {
        let schedule = ScheduleSpec::new(chrono::Weekday::Mon, 10, 0)
            .expect("built-in schedule is valid");
        let messages = MessageSet::new(vec![
            "🧪 Weekly update test (parent message)".to_string(),
            "🧪 First reply in thread".to_string(),
            "🧪 Second reply in thread".to_string(),
            "🧪 Final reply in thread".to_string(),
        ])
        .expect("built-in message set is non-empty");

        Self { schedule, messages }
    }
}
