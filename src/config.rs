//! Runtime configuration for the board engine.
//!
//! Values come from `TASKBOARD_*` environment variables or from a JSON
//! document. Every field has a default, so an empty environment yields a
//! working configuration.

use crate::board::domain::PlacementStrategy;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the drop placement strategy.
pub const PLACEMENT_VAR: &str = "TASKBOARD_PLACEMENT";
/// Environment variable toggling the source-list refetch after a move.
pub const REFRESH_SOURCE_VAR: &str = "TASKBOARD_REFRESH_SOURCE";
/// Environment variable toggling per-container mutation serialization.
pub const SERIALIZE_MUTATIONS_VAR: &str = "TASKBOARD_SERIALIZE_MUTATIONS";
/// Environment variable sizing the change-event buffer.
pub const EVENT_CAPACITY_VAR: &str = "TASKBOARD_EVENT_CAPACITY";

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable or field name.
        key: String,
        /// Offending value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The JSON document is malformed.
    #[error("invalid configuration document: {0}")]
    Document(String),
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Tunables of the collection store and reorder coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Where a dropped task lands in its target list.
    pub placement: PlacementStrategy,
    /// Refetch the source list after a cross-list move instead of marking it
    /// stale.
    pub refresh_source_on_move: bool,
    /// Serialize mutations that touch the same container.
    pub serialize_mutations: bool,
    /// Buffered change events per subscriber.
    pub event_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            placement: PlacementStrategy::AppendToTarget,
            refresh_source_on_move: true,
            serialize_mutations: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl BoardConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a set variable cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a present value cannot be
    /// parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(PLACEMENT_VAR) {
            config.placement = parse_placement(PLACEMENT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(REFRESH_SOURCE_VAR) {
            config.refresh_source_on_move = parse_flag(REFRESH_SOURCE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(SERIALIZE_MUTATIONS_VAR) {
            config.serialize_mutations = parse_flag(SERIALIZE_MUTATIONS_VAR, &raw)?;
        }
        if let Some(raw) = lookup(EVENT_CAPACITY_VAR) {
            config.event_capacity = parse_capacity(EVENT_CAPACITY_VAR, &raw)?;
        }
        Ok(config)
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Document`] for malformed JSON or unknown fields
    /// and [`ConfigError::InvalidValue`] for a zero event capacity.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)
            .map_err(|err| ConfigError::Document(err.to_string()))?;
        if config.event_capacity == 0 {
            return Err(ConfigError::invalid(
                "event_capacity",
                "0",
                "must be greater than zero",
            ));
        }
        Ok(config)
    }
}

fn parse_placement(key: &str, raw: &str) -> Result<PlacementStrategy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "append_to_target" | "append" => Ok(PlacementStrategy::AppendToTarget),
        "at_index" | "index" => Ok(PlacementStrategy::AtIndex),
        _ => Err(ConfigError::invalid(
            key,
            raw,
            "expected append_to_target or at_index",
        )),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected a boolean")),
    }
}

fn parse_capacity(key: &str, raw: &str) -> Result<usize, ConfigError> {
    let capacity =
        usize::from_str(raw.trim()).map_err(|err| ConfigError::invalid(key, raw, err.to_string()))?;
    if capacity == 0 {
        return Err(ConfigError::invalid(key, raw, "must be greater than zero"));
    }
    Ok(capacity)
}
