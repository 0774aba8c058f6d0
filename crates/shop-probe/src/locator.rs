//! Selectors for page elements.
//!
//! Page objects name their elements once (see
//! [`ElementMap`](crate::page_object::ElementMap)) and resolve them through
//! the driver by CSS. [`TreeSelectors`] describes how a hierarchical list is
//! rendered so the tree locator can read it back.

use crate::tree::MoveDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements.
///
/// In YAML the variant is written as a tag: `!css .ui.list` or
/// `!id sylius_taxon_code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., ".ui.list")
    Css(String),
    /// Element id (rendered as `#id`)
    Id(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// CSS form of the selector, as handed to the driver
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::Id(id) => format!("#{id}"),
        }
    }

    /// Whether the selector is blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Css(s) | Self::Id(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// How a rendered tree maps onto the DOM.
///
/// `item`, `label` and `sublist` are evaluated relative to their parent
/// element and start with `:scope >` so they only look one level down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSelectors {
    /// Root list of the tree
    pub tree: String,
    /// Items of a list, relative to the list
    pub item: String,
    /// Label element of an item, relative to the item
    pub label: String,
    /// Nested list of an item, relative to the item
    pub sublist: String,
    /// Move button class prefix; the direction is appended
    pub move_button_prefix: String,
    /// Delete button, relative to the label's parent
    pub delete_button: String,
    /// Class carried by a button while its request is in flight
    pub settle_marker: String,
}

impl Default for TreeSelectors {
    fn default() -> Self {
        Self {
            tree: ".ui.list".to_string(),
            item: ":scope > .item".to_string(),
            label: ":scope > .content > .header > a".to_string(),
            sublist: ":scope > .content > .list".to_string(),
            move_button_prefix: ".sylius-taxon-move-".to_string(),
            delete_button: ".ui.red.button".to_string(),
            settle_marker: "loading".to_string(),
        }
    }
}

impl TreeSelectors {
    /// Move button selector for a direction
    #[must_use]
    pub fn move_button(&self, direction: MoveDirection) -> String {
        format!("{}{}", self.move_button_prefix, direction.as_str())
    }

    /// Names of blank fields, used by config validation
    #[must_use]
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("tree", &self.tree),
            ("item", &self.item),
            ("label", &self.label),
            ("sublist", &self.sublist),
            ("move_button_prefix", &self.move_button_prefix),
            ("delete_button", &self.delete_button),
            ("settle_marker", &self.settle_marker),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
