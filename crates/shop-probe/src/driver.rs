//! PageDriver - Abstract Browser Automation Trait
//!
//! Page objects never talk to a browser directly. They go through
//! [`PageDriver`], which exposes the handful of DOM capabilities acceptance
//! steps need: scoped CSS queries, reading text and values, clicking, filling
//! form fields, selecting options and attaching files.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐   ┌──────────────────────────────┐ │
//! │  │  Browser session    │   │  MockDriver                  │ │
//! │  │  (WebDriver / CDP,  │   │  (in-memory DOM, unit and    │ │
//! │  │   supplied by host) │   │   BDD tests)                 │ │
//! │  └─────────────────────┘   └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handles are bound when an element is found. Acting on a handle whose
//! element has since been removed from the document fails with
//! [`ProbeError::StaleElement`](crate::ProbeError::StaleElement) instead of
//! silently acting on whatever re-rendered in its place.

use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque handle to a DOM element, bound at query time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-specific identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.tag_name, self.id)
    }
}

/// Abstract driver trait for browser automation.
///
/// `scope` arguments restrict a query to the descendants of an element;
/// `None` queries the whole document. Selectors are CSS.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Query all matching elements in document order
    async fn find_all(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> ProbeResult<Vec<ElementHandle>>;

    /// Query the first matching element
    async fn find(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> ProbeResult<Option<ElementHandle>> {
        Ok(self.find_all(scope, selector).await?.into_iter().next())
    }

    /// Parent element, `None` for the document root
    async fn parent(&self, element: &ElementHandle) -> ProbeResult<Option<ElementHandle>>;

    /// Visible text of the element, trimmed
    async fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Current value of a form control
    async fn value(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Whether the element currently carries a CSS class
    async fn has_class(&self, element: &ElementHandle, class: &str) -> ProbeResult<bool>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Fill a form field located by id, name, label text or placeholder
    async fn fill_field(
        &self,
        scope: Option<&ElementHandle>,
        field: &str,
        value: &str,
    ) -> ProbeResult<()>;

    /// Select the option of a `<select>` whose text or value matches
    async fn select_option(&self, element: &ElementHandle, option: &str) -> ProbeResult<()>;

    /// Attach a local file to a file input
    async fn attach_file(&self, element: &ElementHandle, path: &Path) -> ProbeResult<()>;

    /// Whether the page runs JavaScript (asynchronous UI behaviour only
    /// happens when it does)
    fn supports_javascript(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new("btn-1", "button");
            assert_eq!(elem.id, "btn-1");
            assert_eq!(elem.tag_name, "button");
        }

        #[test]
        fn test_element_handle_display() {
            let elem = ElementHandle::new("mock-4", "a");
            assert_eq!(elem.to_string(), "<a#mock-4>");
        }

        #[test]
        fn test_element_handle_equality() {
            assert_eq!(ElementHandle::new("x", "div"), ElementHandle::new("x", "div"));
            assert_ne!(ElementHandle::new("x", "div"), ElementHandle::new("y", "div"));
        }
    }
}
