//! Events raised against a monitored entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an [`Event`]. Serialized as its integer level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Criticality {
    #[default]
    None,
    Info,
    Warning,
    Immediate,
    Critical,
    Automatic,
}

impl From<Criticality> for u8 {
    fn from(value: Criticality) -> Self {
        match value {
            Criticality::None => 0,
            Criticality::Info => 1,
            Criticality::Warning => 2,
            Criticality::Immediate => 3,
            Criticality::Critical => 4,
            Criticality::Automatic => 5,
        }
    }
}

impl TryFrom<u8> for Criticality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::None,
            1 => Self::Info,
            2 => Self::Warning,
            3 => Self::Immediate,
            4 => Self::Critical,
            5 => Self::Automatic,
            other => return Err(format!("unknown criticality level {other}")),
        })
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Immediate => "IMMEDIATE",
            Self::Critical => "CRITICAL",
            Self::Automatic => "AUTOMATIC",
        };
        f.write_str(name)
    }
}

/// An event on an entity.
///
/// `auto_cancel` asks the host to cancel the event once it stops being
/// reported; otherwise the adapter sends it again with a `cancel_date`.
/// `watch_wait_cycle` is how many collections the event must be present in
/// before it surfaces, `cancel_wait_cycle` how many it must be absent from
/// before an auto-cancelled event is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub message: String,
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_key: Option<String>,
    #[serde(default = "default_auto_cancel")]
    pub auto_cancel: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_date: Option<i64>,
    #[serde(default = "default_watch_wait_cycle")]
    pub watch_wait_cycle: u32,
    #[serde(default = "default_cancel_wait_cycle")]
    pub cancel_wait_cycle: u32,
}

fn default_auto_cancel() -> bool {
    true
}

fn default_watch_wait_cycle() -> u32 {
    1
}

fn default_cancel_wait_cycle() -> u32 {
    3
}

impl Event {
    /// Creates an event with default settings.
    pub fn new(message: impl Into<String>, criticality: Criticality) -> Self {
        Self {
            message: message.into(),
            criticality,
            fault_key: None,
            auto_cancel: default_auto_cancel(),
            start_date: None,
            update_date: None,
            cancel_date: None,
            watch_wait_cycle: default_watch_wait_cycle(),
            cancel_wait_cycle: default_cancel_wait_cycle(),
        }
    }

    /// Relates the event to a metric or property key.
    #[must_use]
    pub fn with_fault_key(mut self, fault_key: impl Into<String>) -> Self {
        self.fault_key = Some(fault_key.into());
        self
    }

    /// Hands cancellation over to the adapter.
    #[must_use]
    pub fn with_manual_cancel(mut self, cancel_date: Option<i64>) -> Self {
        self.auto_cancel = false;
        self.cancel_date = cancel_date;
        self
    }

    #[must_use]
    pub fn with_start_date(mut self, start_date: i64) -> Self {
        self.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub fn with_update_date(mut self, update_date: i64) -> Self {
        self.update_date = Some(update_date);
        self
    }

    #[must_use]
    pub fn with_wait_cycles(mut self, watch: u32, cancel: u32) -> Self {
        self.watch_wait_cycle = watch;
        self.cancel_wait_cycle = cancel;
        self
    }
}
