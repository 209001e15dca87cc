use adapterkit_model::{Discriminator, Identifier, Key, KeySet};
use proptest::prelude::*;

fn host_key(name: &str, uuid: &str) -> Key {
    Key::new("vcenter", "Host", name, vec![Identifier::new("uuid", uuid)])
}

// ── Identity rules ───────────────────────────────────────────────

#[test]
fn name_does_not_affect_identity() {
    let a = Key::new("a", "o", "n1", vec![Identifier::new("x", "1")]);
    let b = Key::new("a", "o", "n2", vec![Identifier::new("x", "1")]);
    assert!(a.is_same_entity(&b));
    assert_eq!(a.identity(), b.identity());
}

#[test]
fn non_unique_identifiers_do_not_affect_identity() {
    let a = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::non_unique("label", "old")],
    );
    let b = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::non_unique("label", "new")],
    );
    assert!(a.is_same_entity(&b));
}

#[test]
fn identifier_order_does_not_affect_identity() {
    let a = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::new("y", "2")],
    );
    let b = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("y", "2"), Identifier::new("x", "1")],
    );
    assert!(a.is_same_entity(&b));
}

#[test]
fn differing_adapter_kind_is_different_entity() {
    let a = Key::new("a1", "o", "n", vec![Identifier::new("x", "1")]);
    let b = Key::new("a2", "o", "n", vec![Identifier::new("x", "1")]);
    assert!(!a.is_same_entity(&b));
}

#[test]
fn differing_object_kind_is_different_entity() {
    let a = Key::new("a", "o1", "n", vec![Identifier::new("x", "1")]);
    let b = Key::new("a", "o2", "n", vec![Identifier::new("x", "1")]);
    assert!(!a.is_same_entity(&b));
}

#[test]
fn differing_unique_identifier_value_is_different_entity() {
    assert!(!host_key("h", "1").is_same_entity(&host_key("h", "2")));
}

#[test]
fn missing_unique_identifier_is_different_entity() {
    let a = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::new("y", "2")],
    );
    let b = Key::new("a", "o", "n", vec![Identifier::new("x", "1")]);
    assert!(!a.is_same_entity(&b));
}

#[test]
fn name_identifies_when_no_unique_identifiers() {
    let a = Key::named("a", "o", "first");
    let b = Key::named("a", "o", "second");
    let c = Key::new("a", "o", "first", vec![Identifier::non_unique("label", "x")]);
    assert!(!a.is_same_entity(&b));
    assert!(a.is_same_entity(&c));
    assert_eq!(a.identity().discriminator, Discriminator::Name("first".into()));
}

// ── Accessors ────────────────────────────────────────────────────

#[test]
fn identifier_lookup_with_defaults() {
    let key = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::new("blank", "  ")],
    );
    assert_eq!(key.identifier("x", None), Some("1"));
    assert_eq!(key.identifier("x", Some("d")), Some("1"));
    assert_eq!(key.identifier("missing", None), None);
    assert_eq!(key.identifier("missing", Some("d")), Some("d"));
    assert_eq!(key.identifier("blank", Some("d")), Some("d"));
    assert_eq!(key.identifier("blank", None), Some("  "));
}

#[test]
fn display_marks_unique_identifiers() {
    let key = Key::new(
        "a",
        "o",
        "n",
        vec![Identifier::new("x", "1"), Identifier::non_unique("y", "2")],
    );
    assert_eq!(key.to_string(), "a:o:[x*:1, y:2]");
}

// ── KeySet ───────────────────────────────────────────────────────

#[test]
fn key_set_uses_identity() {
    let mut set = KeySet::new();
    assert!(set.insert(host_key("first", "1")));
    assert!(!set.insert(host_key("renamed", "1")));
    assert!(set.insert(host_key("other", "2")));
    assert_eq!(set.len(), 2);
    assert!(set.contains(&host_key("anything", "1")));
    // The first inserted key is the one retained.
    let names: Vec<&str> = set.iter().map(Key::name).collect();
    assert!(names.contains(&"first"));
    assert!(!names.contains(&"renamed"));
}

#[test]
fn key_set_from_iterator_dedups() {
    let set: KeySet = vec![host_key("a", "1"), host_key("b", "1"), host_key("c", "3")]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn key_json_uses_host_field_names() {
    let key = Key::new("a", "o", "n", vec![Identifier::non_unique("x", "1")]);
    let json = serde_json::to_value(&key).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "adapterKind": "a",
            "objectKind": "o",
            "name": "n",
            "identifiers": [{"key": "x", "value": "1", "isPartOfUniqueness": false}]
        })
    );
}

#[test]
fn identifier_uniqueness_defaults_to_true() {
    let identifier: Identifier =
        serde_json::from_value(serde_json::json!({"key": "x", "value": "1"})).unwrap();
    assert!(identifier.is_part_of_uniqueness);
}

// ── Properties ───────────────────────────────────────────────────

fn identifier_strategy() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,6}", "[a-z0-9]{0,6}")
}

proptest! {
    #[test]
    fn renaming_never_changes_identity(
        ids in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 1..5),
        name1 in ".*",
        name2 in ".*",
    ) {
        let identifiers: Vec<Identifier> = ids
            .iter()
            .map(|(k, v)| Identifier::new(k.clone(), v.clone()))
            .collect();
        let a = Key::new("adapter", "kind", name1, identifiers.clone());
        let b = Key::new("adapter", "kind", name2, identifiers);
        prop_assert!(a.is_same_entity(&b));
    }

    #[test]
    fn informational_identifiers_never_change_identity(
        unique in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 1..4),
        extra in proptest::collection::vec(identifier_strategy(), 0..4),
    ) {
        let base: Vec<Identifier> = unique
            .iter()
            .map(|(k, v)| Identifier::new(k.clone(), v.clone()))
            .collect();
        let mut decorated = base.clone();
        decorated.extend(
            extra
                .into_iter()
                .filter(|(k, _)| !unique.contains_key(k))
                .map(|(k, v)| Identifier::non_unique(k, v)),
        );
        let a = Key::new("adapter", "kind", "n", base);
        let b = Key::new("adapter", "kind", "n", decorated);
        prop_assert!(a.is_same_entity(&b));
    }

    #[test]
    fn reordering_identifiers_never_changes_identity(
        ids in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 1..6),
    ) {
        let forward: Vec<Identifier> = ids
            .iter()
            .map(|(k, v)| Identifier::new(k.clone(), v.clone()))
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = Key::new("adapter", "kind", "n", forward);
        let b = Key::new("adapter", "kind", "n", reversed);
        prop_assert_eq!(a.identity(), b.identity());
    }
}
