//! Core types for the transform log.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an applied transform.
///
/// The log never looks inside it; equality is all that matters.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformId(pub String);

impl TransformId {
    pub fn new(id: impl Into<String>) -> Self {
        TransformId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformId({})", self.0)
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransformId {
    fn from(id: &str) -> Self {
        TransformId(id.to_string())
    }
}

impl From<String> for TransformId {
    fn from(id: String) -> Self {
        TransformId(id)
    }
}

/// Configuration for a transform log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Label attached to tracing events emitted by this log.
    /// Default: "transform-log"
    pub name: String,

    /// Max buffered events per channel subscription before the
    /// subscriber is dropped.
    /// Default: 1000
    pub subscription_buffer: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            name: "transform-log".to_string(),
            subscription_buffer: 1000,
        }
    }
}

impl LogConfig {
    /// Config with a custom name and default limits.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
