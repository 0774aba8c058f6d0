//! Read-only projection of a rendered tree.
//!
//! A [`TreeSnapshot`] is taken fresh for every query; nothing here is cached
//! between calls because the page can re-render at any time. Each node keeps
//! the [`ElementHandle`] of its label so follow-up actions target the element
//! that was read, not whatever carries the same text later.

use crate::driver::ElementHandle;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a reorder action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the start of the parent list
    Up,
    /// Towards the end of the parent list
    Down,
}

impl MoveDirection {
    /// Lowercase name as used in button classes and messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// The direction that undoes this one
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDirection {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(ProbeError::validation(format!(
                "move direction must be one of \"up\", \"down\"; got {other:?}"
            ))),
        }
    }
}

/// A rendered node: its label, the handle of the label element, and its
/// direct children in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Rendered label text
    pub label: String,
    /// Handle of the label element, bound at snapshot time
    pub handle: ElementHandle,
    /// Child nodes (empty for leaves)
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node
    #[must_use]
    pub fn new(label: impl Into<String>, handle: ElementHandle) -> Self {
        Self {
            label: label.into(),
            handle,
            children: Vec::new(),
        }
    }

    /// Add children
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Check if this is a leaf node
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Top-level nodes of a tree as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    roots: Vec<TreeNode>,
}

impl TreeSnapshot {
    /// Wrap top-level nodes
    #[must_use]
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    /// Top-level nodes
    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// All nodes in document order (pre-order)
    #[must_use]
    pub fn flatten(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreeNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Total number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    /// Whether nothing is rendered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First node in document order whose label equals `label`
    #[must_use]
    pub fn find_first(&self, label: &str) -> Option<&TreeNode> {
        self.flatten().into_iter().find(|node| node.label == label)
    }

    /// Number of nodes whose label contains `needle`
    #[must_use]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.flatten()
            .into_iter()
            .filter(|node| node.label.contains(needle))
            .count()
    }

    /// Labels in document order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.flatten()
            .into_iter()
            .map(|node| node.label.as_str())
            .collect()
    }
}
