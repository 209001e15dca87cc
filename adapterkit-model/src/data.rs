//! Timestamped data points: metrics and properties.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, used for every data point timestamp.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// A numeric sample in a time series (CPU utilization, bytes received, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    #[serde(rename = "numberValue")]
    pub value: f64,
    pub timestamp: i64,
}

impl Metric {
    /// Creates a metric sample stamped with the current time.
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self::at(key, value, now_millis())
    }

    /// Creates a metric sample with an explicit timestamp.
    pub fn at(key: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            key: key.into(),
            value,
            timestamp,
        }
    }
}

/// The value carried by a [`Property`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    #[serde(rename = "numberValue")]
    Number(f64),
    #[serde(rename = "stringValue")]
    String(String),
}

/// A value that changes rarely, where only the latest sample matters
/// (IP address, software version, core count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    #[serde(flatten)]
    pub value: PropertyValue,
    pub timestamp: i64,
}

impl Property {
    /// Creates a string property stamped with the current time.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::at(key, PropertyValue::String(value.into()), now_millis())
    }

    /// Creates a numeric property stamped with the current time.
    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self::at(key, PropertyValue::Number(value), now_millis())
    }

    pub fn at(key: impl Into<String>, value: PropertyValue, timestamp: i64) -> Self {
        Self {
            key: key.into(),
            value,
            timestamp,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::String(s) => Some(s),
            PropertyValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            PropertyValue::Number(n) => Some(n),
            PropertyValue::String(_) => None,
        }
    }
}
