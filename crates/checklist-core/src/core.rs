use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Runtime identity of a node. Never persisted: every node gets a fresh id
/// when constructed or deserialized, so ids stay unique within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::next()
    }
}

/// A checklist document: a named root container of items and sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Item(ItemNode),
    Section(SectionNode),
}

impl Node {
    pub fn item(text: impl Into<String>) -> Self {
        Node::Item(ItemNode::new(text))
    }

    pub fn section(title: impl Into<String>) -> Self {
        Node::Section(SectionNode::new(title))
    }

    pub fn id(&self) -> NodeId {
        match self {
            Node::Item(item) => item.id,
            Node::Section(section) => section.id,
        }
    }

    /// The user-visible text of this node (item text or section title).
    pub fn label(&self) -> &str {
        match self {
            Node::Item(item) => &item.text,
            Node::Section(section) => &section.title,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Node::Section(_))
    }

    pub fn as_section(&self) -> Option<&SectionNode> {
        match self {
            Node::Section(section) => Some(section),
            Node::Item(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemNode {
    #[serde(skip)]
    pub id: NodeId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

impl ItemNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            text: text.into(),
            checked: false,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionNode {
    #[serde(skip)]
    pub id: NodeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter: Option<SectionFilter>,
    #[serde(default, rename = "bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub items: Vec<Node>,
}

impl SectionNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            title: title.into(),
            collapsed: false,
            filter: None,
            bg_color: None,
            items: Vec::new(),
        }
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn filter(mut self, filter: SectionFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.items.push(child);
        self
    }

    pub fn children(mut self, children: impl Into<Vec<Node>>) -> Self {
        self.items.extend(children.into());
        self
    }
}

impl From<ItemNode> for Node {
    fn from(item: ItemNode) -> Self {
        Node::Item(item)
    }
}

impl From<SectionNode> for Node {
    fn from(section: SectionNode) -> Self {
        Node::Section(section)
    }
}

/// Per-section display filter for direct child items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionFilter {
    Checked,
    Unchecked,
}

impl SectionFilter {
    /// Whether this filter hides the given direct child. `Checked` keeps only
    /// checked items, `Unchecked` only unchecked ones. Sub-sections are never
    /// hidden, only items.
    pub fn hides(&self, node: &Node) -> bool {
        match node {
            Node::Item(item) => match self {
                SectionFilter::Checked => !item.checked,
                SectionFilter::Unchecked => item.checked,
            },
            Node::Section(_) => false,
        }
    }
}

/// Persisted documents may carry `"filter": "all"` on a section with no
/// filtering; read it as `None`, like an absent or `null` filter.
fn deserialize_filter<'de, D>(deserializer: D) -> Result<Option<SectionFilter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => match value.as_str() {
            "all" => Ok(None),
            "checked" => Ok(Some(SectionFilter::Checked)),
            "unchecked" => Ok(Some(SectionFilter::Unchecked)),
            other => Err(serde::de::Error::custom(format!(
                "unknown section filter: {other}"
            ))),
        },
    }
}

/// Names an ordered container in the document without borrowing it: either
/// the document root or the `items` of the section with the given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerId {
    Root,
    Items(NodeId),
}

impl ChecklistDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bg_color: None,
            items: Vec::new(),
        }
    }

    pub fn container(&self, id: ContainerId) -> Option<&Vec<Node>> {
        match id {
            ContainerId::Root => Some(&self.items),
            ContainerId::Items(section_id) => match find_node(&self.items, section_id)? {
                Node::Section(section) => Some(&section.items),
                Node::Item(_) => None,
            },
        }
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Vec<Node>> {
        match id {
            ContainerId::Root => Some(&mut self.items),
            ContainerId::Items(section_id) => match find_node_mut(&mut self.items, section_id)? {
                Node::Section(section) => Some(&mut section.items),
                Node::Item(_) => None,
            },
        }
    }

    /// Identity lookup of a node's current position within a container.
    pub fn position_in(&self, container: ContainerId, node: NodeId) -> Option<usize> {
        self.container(container)?
            .iter()
            .position(|child| child.id() == node)
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        find_node(&self.items, id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        find_node_mut(&mut self.items, id)
    }

    /// The container currently holding the node, and its index in it.
    pub fn locate(&self, id: NodeId) -> Option<(ContainerId, usize)> {
        locate_in(&self.items, id, ContainerId::Root)
    }
}

pub fn find_node(items: &[Node], id: NodeId) -> Option<&Node> {
    for node in items {
        if node.id() == id {
            return Some(node);
        }
        if let Node::Section(section) = node {
            if let Some(found) = find_node(&section.items, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_node_mut(items: &mut [Node], id: NodeId) -> Option<&mut Node> {
    for node in items.iter_mut() {
        if node.id() == id {
            return Some(node);
        }
        if let Node::Section(section) = node {
            if let Some(found) = find_node_mut(&mut section.items, id) {
                return Some(found);
            }
        }
    }
    None
}

fn locate_in(items: &[Node], id: NodeId, parent: ContainerId) -> Option<(ContainerId, usize)> {
    for (index, node) in items.iter().enumerate() {
        if node.id() == id {
            return Some((parent, index));
        }
        if let Node::Section(section) = node {
            if let Some(found) = locate_in(&section.items, id, ContainerId::Items(section.id)) {
                return Some(found);
            }
        }
    }
    None
}

/// Whether the given container lives inside this node's subtree. True for a
/// section's own `items` and for the `items` of any descendant section, so a
/// move into any such container would make the node contain itself.
pub fn subtree_contains_container(node: &Node, container: ContainerId) -> bool {
    let Node::Section(section) = node else {
        return false;
    };
    if container == ContainerId::Items(section.id) {
        return true;
    }
    section
        .items
        .iter()
        .any(|child| subtree_contains_container(child, container))
}
