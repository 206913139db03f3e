mod common;

use common::*;
use entigraph_storage::{MemoryStore, PersistenceContext};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn reconciling_twice_leaves_nothing_dirty(label in "[a-zA-Z ]{0,12}", qty in any::<i64>()) {
        let store = MemoryStore::new();
        let line = entity("Line", vec![("label", text("seed"))]);
        let id = store.insert(&line).unwrap();
        let values = map(json!({"id": id.get(), "label": label, "qty": qty}));
        let graph = graph();

        graph.reconcile(&store, "Line", Some(&values)).unwrap();
        store.flush().unwrap();
        graph.reconcile(&store, "Line", Some(&values)).unwrap();

        prop_assert!(!line.is_dirty());
        let stored = line.get("label");
        prop_assert_eq!(stored.as_str(), Some(label.as_str()));
    }

    #[test]
    fn list_follows_input_order(picks in prop::collection::vec(0usize..5, 0..8)) {
        let store = MemoryStore::new();
        let nodes: Vec<_> = (0..5)
            .map(|i| entity("Node", vec![("name", text(&format!("n{i}")))]))
            .collect();
        for node in &nodes {
            store.insert(node).unwrap();
        }
        let root = entity("Node", vec![("name", text("root"))]);
        let root_id = store.insert(&root).unwrap();

        let ids: Vec<i64> = picks.iter().map(|&i| id_of(&nodes[i])).collect();
        let values = map(json!({"id": root_id.get(), "children": ids}));
        graph().reconcile(&store, "Node", Some(&values)).unwrap();

        let children: Vec<i64> = root
            .get("children")
            .as_collection()
            .unwrap()
            .items()
            .iter()
            .map(id_of)
            .collect();
        prop_assert_eq!(children, ids);
    }
}
