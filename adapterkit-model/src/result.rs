//! Results returned to the host, one per method invocation.

use crate::error::{ModelError, ModelResult};
use crate::key::{Key, KeyIdentity, KeySet};
use crate::object::Object;
use crate::wire::{CollectBody, CollectPayload, ObjectRecord};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Controls which objects carry relationships in a collect payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipUpdateMode {
    /// Every object sends its relationships; relationships missing from the
    /// result are removed on the host.
    #[default]
    All,
    /// No relationships are sent; the host keeps what it has.
    None,
    /// Behaves like `All` if any object has new children, otherwise `None`.
    Auto,
    /// Only objects whose children were set during this cycle send
    /// relationships. Calling `add_children` with nothing clears an object's
    /// children.
    PerObject,
}

/// The outcome of one collection cycle.
///
/// Holds at most one [`Object`] per entity identity, in registration order.
/// An error message marks the result failed but keeps every object, so
/// partial output still reaches the host.
#[derive(Debug, Default)]
pub struct CollectResult {
    objects: Vec<Object>,
    index: HashMap<KeyIdentity, usize>,
    error_message: Option<String>,
    relationship_mode: RelationshipUpdateMode,
}

impl CollectResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object for `key`, creating and registering it if absent.
    pub fn get_or_create_object(&mut self, key: Key) -> &mut Object {
        let identity = key.identity();
        let position = match self.index.get(&identity).copied() {
            Some(position) => position,
            None => self.push(identity, Object::new(key)),
        };
        &mut self.objects[position]
    }

    /// Registers `object`.
    ///
    /// Re-registering the same instance (or a clone of it) is a no-op and
    /// returns the registered object. A different instance with an equal key
    /// is rejected with [`ModelError::DuplicateKey`] and the result is unchanged.
    pub fn add_object(&mut self, object: Object) -> ModelResult<&mut Object> {
        let identity = object.key().identity();
        let position = match self.index.get(&identity).copied() {
            Some(position) if self.objects[position].id() == object.id() => position,
            Some(_) => {
                warn!(key = %object.key(), "duplicate object rejected");
                return Err(ModelError::DuplicateKey {
                    keys: vec![object.key().to_string()],
                });
            }
            None => self.push(identity, object),
        };
        Ok(&mut self.objects[position])
    }

    /// Registers every object, then reports all conflicts at once.
    ///
    /// Objects that did not conflict stay registered even when the call
    /// returns an error; the error lists every conflicting key in input order.
    pub fn add_objects(&mut self, objects: impl IntoIterator<Item = Object>) -> ModelResult<()> {
        let mut rejected = Vec::new();
        for object in objects {
            if let Err(ModelError::DuplicateKey { keys }) = self.add_object(object) {
                rejected.extend(keys);
            }
        }
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(ModelError::DuplicateKey { keys: rejected })
        }
    }

    pub fn get_object(&self, key: &Key) -> Option<&Object> {
        self.index
            .get(&key.identity())
            .map(|&position| &self.objects[position])
    }

    pub fn get_object_mut(&mut self, key: &Key) -> Option<&mut Object> {
        let position = *self.index.get(&key.identity())?;
        Some(&mut self.objects[position])
    }

    /// All objects in registration order.
    pub fn get_objects(&self) -> &[Object] {
        &self.objects
    }

    /// Objects of the given adapter and object kind, in registration order.
    pub fn get_objects_by_type(&self, adapter_kind: &str, object_kind: &str) -> Vec<&Object> {
        self.objects
            .iter()
            .filter(|object| object.key().is_kind(adapter_kind, object_kind))
            .collect()
    }

    /// The first object of the given adapter and object kind.
    pub fn get_object_by_type(&self, adapter_kind: &str, object_kind: &str) -> Option<&Object> {
        self.objects
            .iter()
            .find(|object| object.key().is_kind(adapter_kind, object_kind))
    }

    /// Objects of the given adapter kind, in registration order.
    pub fn get_objects_by_adapter_type(&self, adapter_kind: &str) -> Vec<&Object> {
        self.objects
            .iter()
            .filter(|object| object.adapter_kind() == adapter_kind)
            .collect()
    }

    /// Links two registered objects as parent and child.
    ///
    /// Both keys are checked before either object changes.
    pub fn link(&mut self, parent: &Key, child: &Key) -> ModelResult<()> {
        let parent_position = *self
            .index
            .get(&parent.identity())
            .ok_or_else(|| ModelError::UnknownObject(parent.to_string()))?;
        let child_position = *self
            .index
            .get(&child.identity())
            .ok_or_else(|| ModelError::UnknownObject(child.to_string()))?;

        let parent_key = self.objects[parent_position].key().clone();
        let child_key = self.objects[child_position].key().clone();
        self.objects[parent_position].insert_child_key(child_key);
        self.objects[child_position].insert_parent_key(parent_key);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Marks the result failed. Only the most recent message is kept.
    pub fn with_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn relationship_mode(&self) -> RelationshipUpdateMode {
        self.relationship_mode
    }

    pub fn set_relationship_mode(&mut self, mode: RelationshipUpdateMode) -> &mut Self {
        self.relationship_mode = mode;
        self
    }

    /// Builds the wire payload.
    pub fn to_payload(&self) -> CollectPayload {
        let any_new_children = self.objects.iter().any(Object::has_new_children);
        let sends_relationships = |object: &Object| match self.relationship_mode {
            RelationshipUpdateMode::All => true,
            RelationshipUpdateMode::None => false,
            RelationshipUpdateMode::Auto => any_new_children,
            RelationshipUpdateMode::PerObject => object.has_new_children(),
        };

        let objects = self
            .objects
            .iter()
            .map(|object| {
                let relationships = sends_relationships(object);
                ObjectRecord {
                    key: object.key().clone(),
                    metrics: object.metrics().cloned().collect(),
                    properties: object.properties().cloned().collect(),
                    events: object.events().to_vec(),
                    parents: relationships.then(|| object.parents().iter().cloned().collect()),
                    children: relationships.then(|| object.children().iter().cloned().collect()),
                }
            })
            .collect();

        debug!(objects = self.objects.len(), "built collect payload");
        CollectPayload {
            result: CollectBody { objects },
            error_message: self.error_message.clone(),
        }
    }

    /// Rebuilds a result from a collect payload.
    pub fn from_payload(payload: CollectPayload) -> ModelResult<Self> {
        let mut result = Self::new();
        let objects = payload.result.objects.into_iter().map(|record| {
            Object::from_parts(
                record.key,
                record.metrics,
                record.properties,
                record.events,
                record.parents.unwrap_or_default().into_iter().collect::<KeySet>(),
                record.children.unwrap_or_default().into_iter().collect::<KeySet>(),
            )
        });
        result.add_objects(objects)?;
        result.error_message = payload.error_message;
        Ok(result)
    }

    /// Parses a collect payload from JSON.
    pub fn from_json(value: serde_json::Value) -> ModelResult<Self> {
        Self::from_payload(serde_json::from_value(value)?)
    }

    fn push(&mut self, identity: KeyIdentity, object: Object) -> usize {
        let position = self.objects.len();
        self.objects.push(object);
        self.index.insert(identity, position);
        position
    }
}

impl Serialize for CollectResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

/// Result of a connection test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(
        rename = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    error_message: Option<String>,
}

impl TestResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the test failed. Only the most recent message is kept.
    pub fn with_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// URLs the adapter will connect to; the host checks each one's certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointResult {
    #[serde(rename = "endpointUrls", default)]
    endpoint_urls: Vec<String>,
}

impl EndpointResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint; adding the same URL twice has no effect.
    pub fn with_endpoint(&mut self, url: impl Into<String>) -> &mut Self {
        let url = url.into();
        if !self.endpoint_urls.contains(&url) {
            self.endpoint_urls.push(url);
        }
        self
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoint_urls
    }
}
