//! JSON payloads exchanged with the host.
//!
//! Field names here are the host's contract and must not change.

use crate::data::{Metric, Property};
use crate::event::Event;
use crate::key::Key;
use serde::{Deserialize, Serialize};

/// The document written for a `collect` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectPayload {
    pub result: CollectBody,
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectBody {
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

/// One object on the wire.
///
/// `parents`/`children` are omitted when the result's relationship mode says
/// this object's relationships should be left as the host has them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub key: Key,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<Key>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Key>>,
}
