//! In-memory document for the mock driver.
//!
//! Elements are declared as owned [`MockElement`] trees and appended into an
//! arena ([`MockDocument`]). Arena ids never get reused, so a removed element
//! keeps its id but is detached, which is how stale handles are detected.

use crate::tree::MoveDirection;
use std::collections::BTreeMap;

/// Arena index of a node
pub type NodeId = usize;

/// What clicking an element does to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickBehavior {
    /// Swap the enclosing `.item` with its neighbour
    MoveItem(MoveDirection),
    /// Remove the enclosing `.item`
    RemoveItem,
    /// Append a copy of `prototype` to the element with id `container_id`,
    /// replacing `__name__` with the new item's index
    AppendPrototype {
        /// Id of the collection container
        container_id: String,
        /// Element to copy
        prototype: Box<MockElement>,
    },
}

/// Declarative element tree, appended into a [`MockDocument`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Tag name, lowercase
    pub tag: String,
    /// Attributes, including `id` and `class`
    pub attrs: BTreeMap<String, String>,
    /// Own text
    pub text: String,
    /// Form control value
    pub value: String,
    /// Click behaviour
    pub on_click: Option<ClickBehavior>,
    /// Child elements
    pub children: Vec<MockElement>,
}

impl MockElement {
    /// Create an element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the id attribute
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Set the class attribute (space separated)
    #[must_use]
    pub fn class(self, classes: impl Into<String>) -> Self {
        self.attr("class", classes)
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the control value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the click behaviour
    #[must_use]
    pub fn on_click(mut self, behavior: ClickBehavior) -> Self {
        self.on_click = Some(behavior);
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Copy with `placeholder` replaced in every attribute and text
    #[must_use]
    pub fn instantiate(&self, placeholder: &str, replacement: &str) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.replace(placeholder, replacement)))
                .collect(),
            text: self.text.replace(placeholder, replacement),
            value: self.value.clone(),
            on_click: self.on_click.clone(),
            children: self
                .children
                .iter()
                .map(|c| c.instantiate(placeholder, replacement))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    on_click: Option<ClickBehavior>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document; node 0 is the `html` root
#[derive(Debug, Clone)]
pub struct MockDocument {
    nodes: Vec<Node>,
}

impl MockDocument {
    /// Create a document whose root holds `body`
    #[must_use]
    pub fn new(body: MockElement) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                tag: "html".to_string(),
                attrs: BTreeMap::new(),
                text: String::new(),
                value: String::new(),
                on_click: None,
                parent: None,
                children: Vec::new(),
            }],
        };
        let _ = doc.append(Self::ROOT, body);
        doc
    }

    /// Root node id
    pub const ROOT: NodeId = 0;

    /// Append an element tree under `parent`
    pub fn append(&mut self, parent: NodeId, element: MockElement) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: element.tag,
            attrs: element.attrs,
            text: element.text,
            value: element.value,
            on_click: element.on_click,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        for child in element.children {
            let _ = self.append(id, child);
        }
        id
    }

    /// Whether `id` names a node ever created in this document
    #[must_use]
    pub fn exists(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    /// Whether the node is reachable from the root
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == Self::ROOT {
                return true;
            }
            current = self.nodes.get(n).and_then(|node| node.parent);
        }
        false
    }

    /// Tag name
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("", |n| n.tag.as_str())
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(id)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// Parent node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Direct children
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Ancestors, nearest first
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(n) = current {
            out.push(n);
            current = self.parent(n);
        }
        out
    }

    /// Descendants in document order, excluding `id`
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// Nearest inclusive ancestor satisfying `predicate`
    #[must_use]
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| predicate(self, n))
    }

    /// First attached node with the given id attribute
    #[must_use]
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(element_id))
    }

    /// Own text followed by the text of all descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|n| self.nodes.get(n))
            .map(|n| n.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Form control value
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("", |n| n.value.as_str())
    }

    /// Set the form control value
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.value = value.into();
        }
    }

    /// Click behaviour
    #[must_use]
    pub fn on_click(&self, id: NodeId) -> Option<&ClickBehavior> {
        self.nodes.get(id).and_then(|n| n.on_click.as_ref())
    }

    /// Whether the class attribute lists `class`
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Add a class if missing
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        if let Some(n) = self.nodes.get_mut(id) {
            let classes = n.attrs.entry("class".to_string()).or_default();
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }

    /// Remove a class
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(classes) = self.nodes.get_mut(id).and_then(|n| n.attrs.get_mut("class")) {
            *classes = classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    /// Detach a node from its parent
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(n) = self.nodes.get_mut(id) {
            n.parent = None;
        }
    }

    /// Swap `id` with the nearest sibling in `direction` that satisfies
    /// `is_peer`. Returns `false` when `id` is already at that end.
    pub fn swap_with_sibling(
        &mut self,
        id: NodeId,
        direction: MoveDirection,
        is_peer: impl Fn(&Self, NodeId) -> bool,
    ) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let siblings = self.children(parent).to_vec();
        let Some(pos) = siblings.iter().position(|&c| c == id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up => siblings[..pos]
                .iter()
                .rposition(|&c| is_peer(self, c)),
            MoveDirection::Down => siblings[pos + 1..]
                .iter()
                .position(|&c| is_peer(self, c))
                .map(|offset| pos + 1 + offset),
        };
        match (target, self.nodes.get_mut(parent)) {
            (Some(target), Some(p)) => {
                p.children.swap(pos, target);
                true
            }
            _ => false,
        }
    }
}
