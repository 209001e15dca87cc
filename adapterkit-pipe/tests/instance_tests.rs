use adapterkit_model::{Identifier, Key};
use adapterkit_pipe::{AdapterInstance, CollectionWindow, PipeError, PipePair};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn full_descriptor() -> serde_json::Value {
    json!({
        "adapter_key": {
            "adapter_kind": "MyAdapter",
            "object_kind": "MyAdapter Instance",
            "name": "lab",
            "identifiers": [
                {"key": "host", "value": "10.0.0.1", "is_part_of_uniqueness": true},
                {"key": "label", "value": "primary", "is_part_of_uniqueness": false}
            ]
        },
        "credential_config": {
            "credential_key": "basic",
            "credential_fields": [
                {"key": "user", "value": "admin", "is_password": false},
                {"key": "password", "value": "s3cret", "is_password": true}
            ]
        },
        "cluster_connection_info": {
            "host_name": "ops.example.com",
            "user_name": "maintenance",
            "password": "hunter2"
        },
        "certificate_config": {"certificates": ["-----BEGIN CERTIFICATE-----"]},
        "collection_number": 7,
        "collection_window": {"start_time": 1000.0, "end_time": 2000.0}
    })
}

fn parse(value: serde_json::Value) -> AdapterInstance {
    serde_json::from_value(value).unwrap()
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn full_descriptor_parses() {
    let instance = parse(full_descriptor());
    assert_eq!(instance.credential_type(), Some("basic"));
    assert_eq!(instance.credential_value("user"), Some("admin"));
    assert_eq!(instance.credential_value("password"), Some("s3cret"));
    assert_eq!(instance.credential_value("token"), None);
    assert_eq!(instance.certificates().len(), 1);
    assert_eq!(instance.collection_number, 7);
    assert_eq!(
        instance.collection_window,
        Some(CollectionWindow {
            start_time: 1000.0,
            end_time: 2000.0
        })
    );
    let cluster = instance.cluster_connection_info.as_ref().unwrap();
    assert_eq!(cluster.host_name, "ops.example.com");
}

#[test]
fn optional_sections_default() {
    let instance = parse(json!({
        "adapter_key": {"adapter_kind": "A", "object_kind": "I", "name": "x", "identifiers": []},
        "credential_config": null
    }));
    assert_eq!(instance.credential_type(), None);
    assert_eq!(instance.credential_value("user"), None);
    assert!(instance.cluster_connection_info.is_none());
    assert!(instance.certificates().is_empty());
    assert_eq!(instance.collection_number, 0);
    assert!(instance.collection_window.is_none());
}

#[test]
fn legacy_credential_key_spelling_is_accepted() {
    let instance = parse(json!({
        "adapter_key": {"adapter_kind": "A", "object_kind": "I"},
        "credential_config": {"credentialKey": "token", "credential_fields": []}
    }));
    assert_eq!(instance.credential_type(), Some("token"));
}

#[test]
fn missing_adapter_key_is_rejected() {
    assert!(serde_json::from_value::<AdapterInstance>(json!({"collection_number": 1})).is_err());
}

// ── Key ──────────────────────────────────────────────────────────

#[test]
fn key_carries_identifiers_and_uniqueness() {
    let instance = parse(full_descriptor());
    let key = instance.key();
    assert_eq!(key.adapter_kind(), "MyAdapter");
    assert_eq!(key.object_kind(), "MyAdapter Instance");
    assert_eq!(key.name(), "lab");
    assert_eq!(
        key.identifiers(),
        &[
            Identifier::new("host", "10.0.0.1"),
            Identifier::non_unique("label", "primary"),
        ]
    );

    let relabelled = Key::new(
        "MyAdapter",
        "MyAdapter Instance",
        "other",
        vec![Identifier::new("host", "10.0.0.1")],
    );
    assert!(key.is_same_entity(&relabelled));
    assert!(instance.to_object().key().is_same_entity(&relabelled));
}

#[test]
fn identifier_uniqueness_defaults_to_true() {
    let instance = parse(json!({
        "adapter_key": {
            "adapter_kind": "A",
            "object_kind": "I",
            "identifiers": [{"key": "k", "value": "v"}]
        }
    }));
    assert!(instance.key().identifiers()[0].is_part_of_uniqueness);
}

// ── Debug output ─────────────────────────────────────────────────

#[test]
fn debug_output_hides_secrets() {
    let instance = parse(full_descriptor());
    let debug = format!("{instance:?}");
    assert!(!debug.contains("s3cret"));
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("admin"));
}

// ── From pipe ────────────────────────────────────────────────────

#[test]
fn from_input_reads_descriptor() {
    let dir = TempDir::new().unwrap();
    let pair = PipePair::new(dir.path().join("in"), dir.path().join("out"));
    std::fs::write(&pair.input, full_descriptor().to_string()).unwrap();
    let instance = AdapterInstance::from_input(&pair).unwrap();
    assert_eq!(instance.key().name(), "lab");
}

#[test]
fn from_input_rejects_wrong_shape() {
    let dir = TempDir::new().unwrap();
    let pair = PipePair::new(dir.path().join("in"), dir.path().join("out"));
    std::fs::write(&pair.input, "[1, 2, 3]").unwrap();
    assert!(matches!(
        AdapterInstance::from_input(&pair),
        Err(PipeError::Decode { .. })
    ));
}
