use entigraph_types::{EntityId, Error, Version};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::str::FromStr;

// ── EntityId ──────────────────────────────────────────────────────

#[test]
fn entity_id_raw_roundtrip() {
    let id = EntityId::new(42);
    assert_eq!(id.get(), 42);
    assert_eq!(EntityId::from(42), id);
}

#[test]
fn entity_id_display_and_parse() {
    let id = EntityId::new(1234);
    let s = id.to_string();
    assert_eq!(s, "1234");
    assert_eq!(EntityId::parse(&s).unwrap(), id);
    assert_eq!(EntityId::from_str(" 1234 ").unwrap(), id);
}

#[test]
fn entity_id_parse_invalid() {
    assert_eq!(
        EntityId::parse("abc"),
        Err(Error::InvalidIdentity("abc".to_string()))
    );
}

#[test]
fn entity_id_hash_distinguishes_values() {
    let mut set = HashSet::new();
    set.insert(EntityId::new(1));
    set.insert(EntityId::new(1));
    set.insert(EntityId::new(2));
    assert_eq!(set.len(), 2);
}

#[test]
fn entity_id_serializes_transparently() {
    let json = serde_json::to_string(&EntityId::new(7)).unwrap();
    assert_eq!(json, "7");
    let back: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, EntityId::new(7));
}

// ── Identity tokens ──────────────────────────────────────────────

#[test]
fn identity_token_null_is_absent() {
    assert_eq!(EntityId::from_token(&json!(null)).unwrap(), None);
}

#[test]
fn identity_token_accepts_integer_and_string() {
    assert_eq!(EntityId::from_token(&json!(5)).unwrap(), Some(EntityId::new(5)));
    assert_eq!(EntityId::from_token(&json!("17")).unwrap(), Some(EntityId::new(17)));
    assert_eq!(EntityId::from_token(&json!(-3)).unwrap(), Some(EntityId::new(-3)));
}

#[test]
fn identity_token_rejects_garbage() {
    assert!(EntityId::from_token(&json!("x1")).is_err());
    assert!(EntityId::from_token(&json!(1.5)).is_err());
    assert!(EntityId::from_token(&json!(true)).is_err());
    assert!(EntityId::from_token(&json!({"id": 1})).is_err());
    assert!(EntityId::from_token(&json!([1])).is_err());
}

// ── Version ──────────────────────────────────────────────────────

#[test]
fn version_next_increments() {
    assert_eq!(Version::INITIAL.next(), Version::new(1));
    assert_eq!(Version::new(9).next().get(), 10);
}

#[test]
fn version_token_parsing() {
    assert_eq!(Version::from_token(&json!(null)).unwrap(), None);
    assert_eq!(Version::from_token(&json!(3)).unwrap(), Some(Version::new(3)));
    assert_eq!(Version::from_token(&json!("4")).unwrap(), Some(Version::new(4)));
    assert_eq!(
        Version::from_token(&json!("v4")),
        Err(Error::InvalidVersion("v4".to_string()))
    );
    assert!(matches!(
        Version::from_token(&json!(false)),
        Err(Error::InvalidVersion(_))
    ));
}

proptest! {
    #[test]
    fn identity_token_roundtrips_any_integer(raw in any::<i64>()) {
        prop_assert_eq!(EntityId::from_token(&json!(raw)).unwrap(), Some(EntityId::new(raw)));
        let parsed = EntityId::from_token(&json!(raw.to_string())).unwrap();
        prop_assert_eq!(parsed, Some(EntityId::new(raw)));
    }

    #[test]
    fn identity_token_rejects_alphabetic_strings(s in "[a-zA-Z]{1,12}") {
        prop_assert!(EntityId::from_token(&json!(s)).is_err());
    }
}
