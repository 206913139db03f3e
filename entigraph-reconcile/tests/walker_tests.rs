use entigraph_model::EntityRef;
use entigraph_reconcile::walker::{GraphWalker, Identity, Instance, Visit};
use entigraph_types::EntityId;

#[test]
fn walk_runs_visitor_once_per_key() {
    let mut walker = GraphWalker::new();
    let mut runs = 0;

    for key in [1, 2, 1, 3, 2] {
        let _ = walker.walk(key, |_| -> Result<(), ()> {
            runs += 1;
            Ok(())
        });
    }

    assert_eq!(runs, 3);
    assert_eq!(walker.len(), 3);
}

#[test]
fn key_is_recorded_before_visitor_runs() {
    let mut walker = GraphWalker::new();
    let outcome = walker
        .walk("root", |walker| walker.walk("root", |_| Ok::<_, ()>(())))
        .unwrap();
    assert_eq!(outcome, Visit::Visited(Visit::AlreadyVisited));
}

#[test]
fn visitor_error_keeps_key_marked() {
    let mut walker = GraphWalker::new();
    let result: Result<Visit<()>, &str> = walker.walk(7, |_| Err("boom"));
    assert_eq!(result, Err("boom"));
    assert!(walker.is_visited(&7));
}

#[test]
fn mark_reports_first_insertion() {
    let mut walker = GraphWalker::new();
    assert!(walker.is_empty());
    assert!(walker.mark('a'));
    assert!(!walker.mark('a'));
}

#[test]
fn into_option_drops_already_visited() {
    assert_eq!(Visit::Visited(5).into_option(), Some(5));
    assert_eq!(Visit::<i32>::AlreadyVisited.into_option(), None);
}

#[test]
fn instance_keys_compare_by_handle() {
    let a = EntityRef::new("Node");
    let b = EntityRef::new("Node");
    let mut walker = GraphWalker::new();

    assert!(walker.mark(Instance(a.clone())));
    assert!(!walker.mark(Instance(a)));
    assert!(walker.mark(Instance(b)));
}

#[test]
fn identity_keys_merge_instances_of_one_persisted_entity() {
    let loaded = EntityRef::new("Node");
    loaded.assign_id(EntityId::new(4));
    let proxy = EntityRef::proxy("Node", EntityId::new(4));
    let other_type = EntityRef::proxy("Line", EntityId::new(4));

    assert_eq!(Identity::of(&loaded), Identity::of(&proxy));
    assert_ne!(Identity::of(&loaded), Identity::of(&other_type));
}

#[test]
fn identity_keys_keep_unsaved_instances_apart() {
    let a = EntityRef::new("Node");
    let b = EntityRef::new("Node");

    assert_ne!(Identity::of(&a), Identity::of(&b));
    assert_eq!(Identity::of(&a), Identity::of(&a.clone()));
}
