use std::collections::HashSet;

use gpui_checklist_core::{
    ChecklistDoc, ContainerId, Node, NodeId, SectionFilter, SectionNode, subtree_contains_container,
};
use serde_json::json;

const SAMPLE: &str = r##"{
  "name": "Groceries",
  "bgColor": "#fff3d6",
  "items": [
    {"type": "item", "text": "Milk", "checked": true},
    {"type": "item", "text": "Bread"},
    {
      "type": "section",
      "title": "Produce",
      "collapsed": false,
      "filter": "unchecked",
      "bgColor": "#d6f5d6",
      "items": [
        {"type": "item", "text": "Apples", "checked": false},
        {
          "type": "section",
          "title": "Herbs",
          "collapsed": true,
          "items": [{"type": "item", "text": "Basil"}]
        }
      ]
    }
  ]
}"##;

fn collect_ids(items: &[Node], out: &mut Vec<NodeId>) {
    for node in items {
        out.push(node.id());
        if let Node::Section(section) = node {
            collect_ids(&section.items, out);
        }
    }
}

#[test]
fn loads_the_persisted_layout() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();

    assert_eq!(doc.name, "Groceries");
    assert_eq!(doc.bg_color.as_deref(), Some("#fff3d6"));
    assert_eq!(doc.items.len(), 3);

    let Node::Item(milk) = &doc.items[0] else {
        panic!("expected an item");
    };
    assert_eq!(milk.text, "Milk");
    assert!(milk.checked);

    let Node::Item(bread) = &doc.items[1] else {
        panic!("expected an item");
    };
    assert!(!bread.checked, "missing checked defaults to false");

    let Node::Section(produce) = &doc.items[2] else {
        panic!("expected a section");
    };
    assert_eq!(produce.title, "Produce");
    assert_eq!(produce.filter, Some(SectionFilter::Unchecked));
    assert_eq!(produce.bg_color.as_deref(), Some("#d6f5d6"));
    assert_eq!(produce.items.len(), 2);

    let Node::Section(herbs) = &produce.items[1] else {
        panic!("expected a nested section");
    };
    assert!(herbs.collapsed);
    assert_eq!(herbs.filter, None, "missing filter defaults to none");
    assert_eq!(herbs.bg_color, None);
}

#[test]
fn filter_all_reads_as_no_filter() {
    let doc: ChecklistDoc = serde_json::from_str(
        r#"{"name": "L", "items": [
            {"type": "section", "title": "S", "filter": "all", "items": []},
            {"type": "section", "title": "T", "filter": null, "items": []}
        ]}"#,
    )
    .unwrap();

    let Node::Section(s) = &doc.items[0] else {
        panic!("expected a section");
    };
    assert_eq!(s.filter, None);
    let Node::Section(t) = &doc.items[1] else {
        panic!("expected a section");
    };
    assert_eq!(t.filter, None);

    // Writing back drops the key instead of materializing "all".
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["items"][0].get("filter"), None);

    // Anything else is still a parse error.
    assert!(
        serde_json::from_str::<ChecklistDoc>(
            r#"{"name": "L", "items": [{"type": "section", "title": "S", "filter": "done", "items": []}]}"#
        )
        .is_err()
    );
}

#[test]
fn ids_are_fresh_and_unique_on_load() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();
    let again: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();

    let mut ids = Vec::new();
    collect_ids(&doc.items, &mut ids);
    let mut again_ids = Vec::new();
    collect_ids(&again.items, &mut again_ids);

    let unique: HashSet<_> = ids.iter().chain(again_ids.iter()).collect();
    assert_eq!(unique.len(), ids.len() + again_ids.len());
}

#[test]
fn serializes_without_runtime_ids_or_empty_options() {
    let doc = ChecklistDoc {
        name: "List".to_string(),
        bg_color: None,
        items: vec![
            Node::item("A"),
            SectionNode::new("S").child(Node::item("B")).into(),
        ],
    };

    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "List",
            "items": [
                {"type": "item", "text": "A", "checked": false},
                {
                    "type": "section",
                    "title": "S",
                    "collapsed": false,
                    "items": [{"type": "item", "text": "B", "checked": false}]
                }
            ]
        })
    );
}

#[test]
fn round_trip_is_stable() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();
    let first = serde_json::to_value(&doc).unwrap();
    let reloaded: ChecklistDoc = serde_json::from_value(first.clone()).unwrap();
    let second = serde_json::to_value(&reloaded).unwrap();
    assert_eq!(first, second);

    // Defaulted fields come back materialized, everything else survives.
    assert_eq!(first["items"][1], json!({"type": "item", "text": "Bread", "checked": false}));
    assert_eq!(first["items"][2]["filter"], json!("unchecked"));
    assert_eq!(first["items"][2]["bgColor"], json!("#d6f5d6"));
}

#[test]
fn container_lookup_resolves_root_and_sections() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();

    let root = doc.container(ContainerId::Root).unwrap();
    assert_eq!(root.len(), 3);

    let produce_id = doc.items[2].id();
    let produce_items = doc.container(ContainerId::Items(produce_id)).unwrap();
    assert_eq!(produce_items.len(), 2);

    // Items never act as containers.
    let milk_id = doc.items[0].id();
    assert!(doc.container(ContainerId::Items(milk_id)).is_none());
}

#[test]
fn locate_and_position_agree() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();

    let produce_id = doc.items[2].id();
    let Node::Section(produce) = &doc.items[2] else {
        panic!("expected a section");
    };
    let apples_id = produce.items[0].id();

    assert_eq!(
        doc.locate(apples_id),
        Some((ContainerId::Items(produce_id), 0))
    );
    assert_eq!(
        doc.position_in(ContainerId::Items(produce_id), apples_id),
        Some(0)
    );
    assert_eq!(doc.position_in(ContainerId::Root, apples_id), None);
    assert_eq!(doc.locate(produce_id), Some((ContainerId::Root, 2)));
}

#[test]
fn subtree_containment_sees_nested_sections() {
    let doc: ChecklistDoc = serde_json::from_str(SAMPLE).unwrap();

    let produce = &doc.items[2];
    let produce_id = produce.id();
    let herbs_id = produce.as_section().unwrap().items[1].id();

    assert!(subtree_contains_container(
        produce,
        ContainerId::Items(produce_id)
    ));
    assert!(subtree_contains_container(
        produce,
        ContainerId::Items(herbs_id)
    ));
    assert!(!subtree_contains_container(produce, ContainerId::Root));

    let milk = &doc.items[0];
    assert!(!subtree_contains_container(
        milk,
        ContainerId::Items(produce_id)
    ));
}
