//! Monitored entity with its data points and relationships.

use crate::data::{Metric, Property, PropertyValue};
use crate::event::{Criticality, Event};
use crate::ids::ObjectId;
use crate::key::{Key, KeySet};
use std::collections::BTreeMap;

/// One monitored entity: its [`Key`], metrics, properties, events and
/// parent/child edges.
///
/// Relationships are stored as key sets on both ends, never as references,
/// so two independently built graphs still agree on who is related to whom.
#[derive(Debug, Clone)]
pub struct Object {
    id: ObjectId,
    key: Key,
    metrics: BTreeMap<String, Vec<Metric>>,
    properties: BTreeMap<String, Vec<Property>>,
    events: Vec<Event>,
    parents: KeySet,
    children: KeySet,
    has_new_children: bool,
}

impl Object {
    /// Creates an empty object for the given key.
    pub fn new(key: Key) -> Self {
        Self {
            id: ObjectId::new(),
            key,
            metrics: BTreeMap::new(),
            properties: BTreeMap::new(),
            events: Vec::new(),
            parents: KeySet::new(),
            children: KeySet::new(),
            has_new_children: false,
        }
    }

    /// The instance id; distinct for every `Object::new`, shared by clones.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn adapter_kind(&self) -> &str {
        self.key.adapter_kind()
    }

    pub fn object_kind(&self) -> &str {
        self.key.object_kind()
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// See [`Key::identifier`].
    pub fn identifier_value<'a>(&'a self, key: &str, default: Option<&'a str>) -> Option<&'a str> {
        self.key.identifier(key, default)
    }

    // ── Metrics ──────────────────────────────────────────────────

    pub fn add_metric(&mut self, metric: Metric) {
        self.metrics.entry(metric.key.clone()).or_default().push(metric);
    }

    pub fn add_metrics(&mut self, metrics: impl IntoIterator<Item = Metric>) {
        for metric in metrics {
            self.add_metric(metric);
        }
    }

    /// Adds a metric sample stamped with the current time.
    pub fn with_metric(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.add_metric(Metric::new(key, value));
        self
    }

    /// All samples for a metric key, in insertion order.
    pub fn metric(&self, key: &str) -> &[Metric] {
        self.metrics.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Metric values for a key in chronological order.
    pub fn metric_values(&self, key: &str) -> Vec<f64> {
        let mut samples: Vec<&Metric> = self.metric(key).iter().collect();
        samples.sort_by_key(|m| m.timestamp);
        samples.into_iter().map(|m| m.value).collect()
    }

    pub fn last_metric_value(&self, key: &str) -> Option<f64> {
        self.metric_values(key).last().copied()
    }

    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.values().flatten()
    }

    // ── Properties ───────────────────────────────────────────────

    pub fn add_property(&mut self, property: Property) {
        self.properties
            .entry(property.key.clone())
            .or_default()
            .push(property);
    }

    pub fn add_properties(&mut self, properties: impl IntoIterator<Item = Property>) {
        for property in properties {
            self.add_property(property);
        }
    }

    /// Adds a numeric property stamped with the current time.
    pub fn with_property(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.add_property(Property::number(key, value));
        self
    }

    /// Adds a string property stamped with the current time.
    pub fn with_string_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.add_property(Property::string(key, value));
        self
    }

    pub fn property(&self, key: &str) -> &[Property] {
        self.properties.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    fn chronological_properties(&self, key: &str) -> Vec<&Property> {
        let mut samples: Vec<&Property> = self.property(key).iter().collect();
        samples.sort_by_key(|p| p.timestamp);
        samples
    }

    /// Numeric values for a property key in chronological order; string
    /// samples are skipped.
    pub fn numeric_property_values(&self, key: &str) -> Vec<f64> {
        self.chronological_properties(key)
            .into_iter()
            .filter_map(Property::as_f64)
            .collect()
    }

    /// String values for a property key in chronological order; numeric
    /// samples are skipped.
    pub fn string_property_values(&self, key: &str) -> Vec<&str> {
        self.chronological_properties(key)
            .into_iter()
            .filter_map(|p| match &p.value {
                PropertyValue::String(s) => Some(s.as_str()),
                PropertyValue::Number(_) => None,
            })
            .collect()
    }

    pub fn last_numeric_property_value(&self, key: &str) -> Option<f64> {
        self.numeric_property_values(key).last().copied()
    }

    pub fn last_string_property_value(&self, key: &str) -> Option<&str> {
        self.string_property_values(key).last().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values().flatten()
    }

    // ── Events ───────────────────────────────────────────────────

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn with_event(
        &mut self,
        message: impl Into<String>,
        criticality: Criticality,
    ) -> &mut Self {
        self.add_event(Event::new(message, criticality));
        self
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // ── Relationships ────────────────────────────────────────────

    /// Makes `parent` a parent of this object and this object a child of
    /// `parent`. Does not mark either side as having new children.
    pub fn add_parent(&mut self, parent: &mut Object) {
        self.parents.insert(parent.key.clone());
        parent.children.insert(self.key.clone());
    }

    pub fn add_parents<'a>(&mut self, parents: impl IntoIterator<Item = &'a mut Object>) {
        for parent in parents {
            self.add_parent(parent);
        }
    }

    /// Makes `child` a child of this object and this object a parent of
    /// `child`, and marks this object as having new children.
    pub fn add_child(&mut self, child: &mut Object) {
        self.insert_child_key(child.key.clone());
        child.parents.insert(self.key.clone());
    }

    /// Adds every child and marks this object as having new children, even
    /// when `children` is empty.
    pub fn add_children<'a>(&mut self, children: impl IntoIterator<Item = &'a mut Object>) {
        self.has_new_children = true;
        for child in children {
            self.add_child(child);
        }
    }

    pub fn parents(&self) -> &KeySet {
        &self.parents
    }

    pub fn children(&self) -> &KeySet {
        &self.children
    }

    /// True once a child has been added; never cleared.
    pub fn has_new_children(&self) -> bool {
        self.has_new_children
    }

    /// True if the object carries any metric, property or event.
    pub fn has_content(&self) -> bool {
        !self.metrics.is_empty() || !self.properties.is_empty() || !self.events.is_empty()
    }

    pub(crate) fn insert_child_key(&mut self, key: Key) {
        self.has_new_children = true;
        self.children.insert(key);
    }

    pub(crate) fn insert_parent_key(&mut self, key: Key) {
        self.parents.insert(key);
    }

    /// Rebuilds an object from decoded parts, keeping relationships as given.
    pub(crate) fn from_parts(
        key: Key,
        metrics: Vec<Metric>,
        properties: Vec<Property>,
        events: Vec<Event>,
        parents: KeySet,
        children: KeySet,
    ) -> Self {
        let mut object = Self::new(key);
        object.add_metrics(metrics);
        object.add_properties(properties);
        object.events = events;
        object.parents = parents;
        object.has_new_children = !children.is_empty();
        object.children = children;
        object
    }
}
