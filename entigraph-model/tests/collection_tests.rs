use entigraph_model::{CollectionKind, CollectionRef, EntityRef};
use entigraph_types::EntityId;

fn persisted(id: i64) -> EntityRef {
    let e = EntityRef::new("Line");
    e.assign_id(EntityId::new(id));
    e
}

// ── Set vs list semantics ────────────────────────────────────────

#[test]
fn set_drops_duplicates() {
    let a = persisted(1);
    let c = CollectionRef::set();
    assert!(c.add(a.clone()));
    assert!(!c.add(a.clone()));
    assert!(!c.add(persisted(1)));
    assert_eq!(c.len(), 1);
}

#[test]
fn list_keeps_duplicates_in_order() {
    let a = persisted(1);
    let b = persisted(2);
    let c = CollectionRef::from_items(CollectionKind::List, [a.clone(), b.clone(), a.clone()]);
    let items = c.items();
    assert_eq!(items.len(), 3);
    assert!(items[0].ptr_eq(&a));
    assert!(items[1].ptr_eq(&b));
    assert!(items[2].ptr_eq(&a));
}

// ── In-place replacement ─────────────────────────────────────────

#[test]
fn replace_all_keeps_container_identity() {
    let c = CollectionRef::from_items(CollectionKind::Set, [persisted(1)]);
    let alias = c.clone();
    c.replace_all([persisted(2), persisted(3)]);
    assert!(alias.ptr_eq(&c));
    assert_eq!(alias.len(), 2);
    assert!(alias.contains(&persisted(3)));
    assert!(!alias.contains(&persisted(1)));
}

#[test]
fn differs_from_detects_size_and_membership() {
    let current = CollectionRef::from_items(CollectionKind::List, [persisted(1), persisted(2)]);
    let same = CollectionRef::from_items(CollectionKind::List, [persisted(2), persisted(1)]);
    let shorter = CollectionRef::from_items(CollectionKind::List, [persisted(1)]);
    let other = CollectionRef::from_items(CollectionKind::List, [persisted(1), persisted(9)]);

    assert!(!current.differs_from(&same));
    assert!(current.differs_from(&shorter));
    assert!(current.differs_from(&other));
}

// ── Lazy loading ─────────────────────────────────────────────────

#[test]
fn lazy_collection_loads_on_access() {
    let c = CollectionRef::lazy(CollectionKind::List, vec![persisted(1)]);
    assert!(!c.is_loaded());
    assert_eq!(c.kind(), CollectionKind::List);
    assert!(!c.is_set());
    assert!(format!("{c:?}").contains("loaded: false"));

    assert_eq!(c.items().len(), 1);
    assert!(c.is_loaded());
}

#[test]
fn explicit_load_marks_loaded() {
    let c = CollectionRef::lazy(CollectionKind::Set, Vec::new());
    c.load();
    assert!(c.is_loaded());
    assert!(c.is_empty());
}

#[test]
fn load_releases_its_lock() {
    let item = persisted(1);
    let c = CollectionRef::lazy(CollectionKind::List, vec![item.clone()]);
    c.load();
    c.load();
    assert!(c.add(persisted(2)));
    assert!(c.is_loaded());
    assert_eq!(c.len(), 2);
    assert!(c.contains(&item));
}
