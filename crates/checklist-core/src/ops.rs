use crate::core::{
    ChecklistDoc, ContainerId, Node, NodeId, SectionFilter, SectionNode, subtree_contains_container,
};

/// The data half of an in-flight drag: which node is being moved, and where
/// it was when the drag started. The index is advisory; the drop re-derives
/// the node's position by identity before mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSource {
    pub node: NodeId,
    pub container: ContainerId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The node was removed from `from` and inserted at `to`. `to.1` is the
    /// final index after the same-container adjustment.
    Moved {
        from: (ContainerId, usize),
        to: (ContainerId, usize),
    },
    /// Same container and the target index would not change the order.
    NoOp,
    /// The target container lives inside the dragged node's own subtree.
    SelfContainment,
    /// The dragged node is no longer where the drag said it was.
    InvalidSource,
    /// The target container no longer resolves.
    InvalidTarget,
}

impl DropOutcome {
    pub fn mutated(&self) -> bool {
        matches!(self, DropOutcome::Moved { .. })
    }
}

/// Apply a drop to the document: remove the dragged node from its current
/// container and insert it into `target` at `target_index` (an insertion gap
/// in `0..=len`). Rejections leave the document untouched.
pub fn apply_drop(
    doc: &mut ChecklistDoc,
    source: &DragSource,
    target: ContainerId,
    target_index: usize,
) -> DropOutcome {
    let Some(dragged) = doc.find(source.node) else {
        return DropOutcome::InvalidSource;
    };
    if subtree_contains_container(dragged, target) {
        return DropOutcome::SelfContainment;
    }
    if doc.container(target).is_none() {
        return DropOutcome::InvalidTarget;
    }

    let Some(from_ix) = doc.position_in(source.container, source.node) else {
        return DropOutcome::InvalidSource;
    };

    if target == source.container && (target_index == from_ix || target_index == from_ix + 1) {
        return DropOutcome::NoOp;
    }

    let node = match doc.container_mut(source.container) {
        Some(items) => items.remove(from_ix),
        None => return DropOutcome::InvalidSource,
    };

    // Removing the node shifted later siblings left; a downward move within
    // the same container must account for that to keep "insert after this
    // sibling" meaning what the user saw.
    let mut to_ix = target_index;
    if target == source.container && from_ix < to_ix {
        to_ix -= 1;
    }

    // The self-containment check above guarantees the target container
    // survived the removal.
    let Some(items) = doc.container_mut(target) else {
        return DropOutcome::InvalidTarget;
    };
    let to_ix = to_ix.min(items.len());
    items.insert(to_ix, node);

    DropOutcome::Moved {
        from: (source.container, from_ix),
        to: (target, to_ix),
    }
}

impl ChecklistDoc {
    /// Flip an item's checked flag. Returns false if the id is missing or
    /// names a section.
    pub fn toggle_checked(&mut self, id: NodeId) -> bool {
        match self.find_mut(id) {
            Some(Node::Item(item)) => {
                item.checked = !item.checked;
                true
            }
            _ => false,
        }
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> bool {
        match self.find_mut(id) {
            Some(Node::Section(section)) => {
                section.collapsed = collapsed;
                true
            }
            _ => false,
        }
    }

    pub fn toggle_collapsed(&mut self, id: NodeId) -> bool {
        match self.find_mut(id) {
            Some(Node::Section(section)) => {
                section.collapsed = !section.collapsed;
                true
            }
            _ => false,
        }
    }

    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        for_each_section_mut(&mut self.items, &mut |section| {
            section.collapsed = collapsed;
        });
    }

    /// Advance a section's filter: show all -> checked only -> unchecked
    /// only -> show all.
    pub fn cycle_filter(&mut self, id: NodeId) -> bool {
        match self.find_mut(id) {
            Some(Node::Section(section)) => {
                section.filter = match section.filter {
                    None => Some(SectionFilter::Checked),
                    Some(SectionFilter::Checked) => Some(SectionFilter::Unchecked),
                    Some(SectionFilter::Unchecked) => None,
                };
                true
            }
            _ => false,
        }
    }

    /// Reset every section's filter. Returns true if any filter was set.
    pub fn clear_all_filters(&mut self) -> bool {
        let mut cleared = false;
        for_each_section_mut(&mut self.items, &mut |section| {
            cleared |= section.filter.take().is_some();
        });
        cleared
    }
}

fn for_each_section_mut(items: &mut [Node], f: &mut impl FnMut(&mut SectionNode)) {
    for node in items.iter_mut() {
        if let Node::Section(section) = node {
            f(section);
            for_each_section_mut(&mut section.items, f);
        }
    }
}
