//! Structural identity of monitored entities.
//!
//! A [`Key`] names an entity by adapter kind, object kind, display name and a
//! list of [`Identifier`]s. Two keys refer to the same entity when their
//! [`KeyIdentity`] values are equal; the identity is computed explicitly so
//! that the matching rules stay visible at every call site.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A key/value pair that identifies an entity.
///
/// When `is_part_of_uniqueness` is false the value may change over time
/// without creating a new entity (typically a human-readable label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub key: String,
    pub value: String,
    #[serde(default = "default_uniqueness")]
    pub is_part_of_uniqueness: bool,
}

fn default_uniqueness() -> bool {
    true
}

impl Identifier {
    /// Creates an identifier that takes part in uniqueness.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_part_of_uniqueness: true,
        }
    }

    /// Creates an identifier that is informational only.
    pub fn non_unique(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_part_of_uniqueness: false,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_part_of_uniqueness { "*" } else { "" };
        write!(f, "{}{}:{}", self.key, marker, self.value)
    }
}

/// What distinguishes two entities of the same adapter and object kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discriminator {
    /// Sorted `(key, value)` pairs of the uniqueness identifiers.
    Identifiers(Vec<(String, String)>),
    /// The display name, used only when no identifier is part of uniqueness.
    Name(String),
}

/// The comparison key derived from a [`Key`].
///
/// This is the only notion of equality used for entity deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyIdentity {
    pub adapter_kind: String,
    pub object_kind: String,
    pub discriminator: Discriminator,
}

/// Identifies a monitored entity.
///
/// `Key` deliberately does not implement `PartialEq`/`Hash`; compare keys with
/// [`Key::is_same_entity`] or by their [`Key::identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    adapter_kind: String,
    object_kind: String,
    name: String,
    #[serde(default)]
    identifiers: Vec<Identifier>,
}

impl Key {
    /// Creates a key. If no identifier is part of uniqueness, `name` becomes
    /// the distinguishing value and should be unique within the object kind.
    pub fn new(
        adapter_kind: impl Into<String>,
        object_kind: impl Into<String>,
        name: impl Into<String>,
        identifiers: Vec<Identifier>,
    ) -> Self {
        Self {
            adapter_kind: adapter_kind.into(),
            object_kind: object_kind.into(),
            name: name.into(),
            identifiers,
        }
    }

    /// Creates a key with no identifiers.
    pub fn named(
        adapter_kind: impl Into<String>,
        object_kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(adapter_kind, object_kind, name, Vec::new())
    }

    pub fn adapter_kind(&self) -> &str {
        &self.adapter_kind
    }

    pub fn object_kind(&self) -> &str {
        &self.object_kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Returns the value of the identifier with the given key.
    ///
    /// A missing or blank value yields `default` when one is given; a blank
    /// value without a default is returned as-is.
    pub fn identifier<'a>(&'a self, key: &str, default: Option<&'a str>) -> Option<&'a str> {
        let value = self
            .identifiers
            .iter()
            .rev()
            .find(|identifier| identifier.key == key)
            .map(|identifier| identifier.value.as_str());
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            other => default.or(other),
        }
    }

    /// Computes the comparison key for this entity.
    pub fn identity(&self) -> KeyIdentity {
        // A later identifier with the same key overrides an earlier one.
        let mut unique = BTreeMap::new();
        for identifier in &self.identifiers {
            if identifier.is_part_of_uniqueness {
                unique.insert(identifier.key.clone(), identifier.value.clone());
            } else {
                unique.remove(&identifier.key);
            }
        }

        let discriminator = if unique.is_empty() {
            Discriminator::Name(self.name.clone())
        } else {
            Discriminator::Identifiers(unique.into_iter().collect())
        };

        KeyIdentity {
            adapter_kind: self.adapter_kind.clone(),
            object_kind: self.object_kind.clone(),
            discriminator,
        }
    }

    /// Returns true if both keys resolve to the same entity.
    pub fn is_same_entity(&self, other: &Key) -> bool {
        self.identity() == other.identity()
    }

    /// Returns true if this key has the given adapter and object kind.
    pub fn is_kind(&self, adapter_kind: &str, object_kind: &str) -> bool {
        self.adapter_kind == adapter_kind && self.object_kind == object_kind
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:[", self.adapter_kind, self.object_kind)?;
        for (i, identifier) in self.identifiers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{identifier}")?;
        }
        f.write_str("]")
    }
}

/// A set of keys under entity-identity semantics.
///
/// The first key inserted for an identity is the one retained.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: BTreeMap<KeyIdentity, Key>,
}

impl KeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key. Returns false if an equal key was already present.
    pub fn insert(&mut self, key: Key) -> bool {
        let identity = key.identity();
        if self.keys.contains_key(&identity) {
            return false;
        }
        self.keys.insert(identity, key);
        true
    }

    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains_key(&key.identity())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    /// Identities of every key in the set, in sorted order.
    pub fn identities(&self) -> impl Iterator<Item = &KeyIdentity> {
        self.keys.keys()
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a Key;
    type IntoIter = std::collections::btree_map::Values<'a, KeyIdentity, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.values()
    }
}
