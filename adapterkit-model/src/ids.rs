//! Instance identifiers for in-memory objects.
//!
//! Uses UUID v7 so ids sort in creation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one in-memory [`Object`](crate::Object) instance.
///
/// Two objects can share an equal [`Key`](crate::Key) yet be distinct
/// instances; a `CollectResult` uses this id to tell a harmless re-registration
/// of the same object apart from a conflicting second object.
/// Clones of an object keep its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Creates a new instance id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
