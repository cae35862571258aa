use gpui_checklist_core::{ChecklistDoc, ItemNode, Node, NodeId, SectionFilter, SectionNode};

struct SampleIds {
    milk: NodeId,
    produce: NodeId,
    herbs: NodeId,
}

fn sample() -> (ChecklistDoc, SampleIds) {
    let milk = Node::item("Milk");
    let milk_id = milk.id();
    let herbs = SectionNode::new("Herbs")
        .collapsed(true)
        .child(Node::item("Basil"));
    let herbs_id = herbs.id;
    let produce = SectionNode::new("Produce")
        .filter(SectionFilter::Unchecked)
        .child(ItemNode::new("Apples").checked(true).into())
        .child(herbs.into());
    let produce_id = produce.id;

    let mut doc = ChecklistDoc::new("Groceries");
    doc.items = vec![milk, produce.into()];
    (
        doc,
        SampleIds {
            milk: milk_id,
            produce: produce_id,
            herbs: herbs_id,
        },
    )
}

fn section_of(doc: &ChecklistDoc, id: NodeId) -> &SectionNode {
    doc.find(id).and_then(Node::as_section).unwrap()
}

#[test]
fn toggle_checked_flips_items_only() {
    let (mut doc, ids) = sample();

    assert!(doc.toggle_checked(ids.milk));
    let Node::Item(milk) = &doc.items[0] else {
        panic!("expected an item");
    };
    assert!(milk.checked);

    assert!(doc.toggle_checked(ids.milk));
    let Node::Item(milk) = &doc.items[0] else {
        panic!("expected an item");
    };
    assert!(!milk.checked);

    // Sections and unknown ids are refused.
    assert!(!doc.toggle_checked(ids.produce));
    assert!(!doc.toggle_checked(NodeId::next()));
}

#[test]
fn collapse_ops_touch_sections_only() {
    let (mut doc, ids) = sample();

    assert!(doc.set_collapsed(ids.produce, true));
    assert!(section_of(&doc, ids.produce).collapsed);

    assert!(doc.toggle_collapsed(ids.produce));
    assert!(!section_of(&doc, ids.produce).collapsed);

    assert!(!doc.set_collapsed(ids.milk, true));
    assert!(!doc.toggle_collapsed(ids.milk));
}

#[test]
fn set_all_collapsed_reaches_nested_sections() {
    let (mut doc, ids) = sample();

    doc.set_all_collapsed(true);
    assert!(section_of(&doc, ids.produce).collapsed);
    assert!(section_of(&doc, ids.herbs).collapsed);

    doc.set_all_collapsed(false);
    assert!(!section_of(&doc, ids.produce).collapsed);
    assert!(!section_of(&doc, ids.herbs).collapsed);
}

#[test]
fn cycle_filter_walks_all_three_states() {
    let (mut doc, ids) = sample();

    assert_eq!(section_of(&doc, ids.herbs).filter, None);
    assert!(doc.cycle_filter(ids.herbs));
    assert_eq!(
        section_of(&doc, ids.herbs).filter,
        Some(SectionFilter::Checked)
    );
    assert!(doc.cycle_filter(ids.herbs));
    assert_eq!(
        section_of(&doc, ids.herbs).filter,
        Some(SectionFilter::Unchecked)
    );
    assert!(doc.cycle_filter(ids.herbs));
    assert_eq!(section_of(&doc, ids.herbs).filter, None);

    assert!(!doc.cycle_filter(ids.milk));
}

#[test]
fn clear_all_filters_reports_whether_any_were_set() {
    let (mut doc, ids) = sample();

    // The sample starts with one filter on Produce; add one on nested Herbs.
    assert!(doc.cycle_filter(ids.herbs));

    assert!(doc.clear_all_filters());
    assert_eq!(section_of(&doc, ids.produce).filter, None);
    assert_eq!(section_of(&doc, ids.herbs).filter, None);

    assert!(!doc.clear_all_filters());
}

#[test]
fn filters_keep_matching_items_and_never_hide_sections() {
    let checked: Node = ItemNode::new("done").checked(true).into();
    let unchecked = Node::item("todo");
    let section: Node = SectionNode::new("S").into();

    // The checked filter shows checked items and hides the rest.
    assert!(!SectionFilter::Checked.hides(&checked));
    assert!(SectionFilter::Checked.hides(&unchecked));
    assert!(SectionFilter::Unchecked.hides(&checked));
    assert!(!SectionFilter::Unchecked.hides(&unchecked));
    assert!(!SectionFilter::Checked.hides(&section));
    assert!(!SectionFilter::Unchecked.hides(&section));
}
