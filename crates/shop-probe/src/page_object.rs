//! Page Object Model Support
//!
//! A page object names the elements of one admin page and exposes the
//! operations a scenario performs on it. The named elements live in an
//! [`ElementMap`]; pages resolve them through the driver on every call so
//! nothing stale is kept between steps.

use crate::driver::{ElementHandle, PageDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use std::collections::BTreeMap;

/// Trait for page objects representing a page of the UI.
pub trait PageObject {
    /// URL pattern that matches this page (e.g., "/admin/taxons/new",
    /// "/admin/taxons/:id/edit")
    fn url_pattern(&self) -> &str;

    /// Named elements of the page
    fn elements(&self) -> &ElementMap;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Named selectors of a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMap {
    elements: BTreeMap<String, Selector>,
}

impl ElementMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named element
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, selector: Selector) -> Self {
        let _ = self.elements.insert(name.into(), selector);
        self
    }

    /// Merge another map on top of this one; later definitions win
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.elements.extend(other.elements);
        self
    }

    /// Look up a named element
    pub fn get(&self, name: &str) -> ProbeResult<&Selector> {
        self.elements
            .get(name)
            .ok_or_else(|| ProbeError::not_found(format!("defined element {name:?}")))
    }

    /// Names of all defined elements
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.elements.keys().map(String::as_str).collect()
    }

    /// Resolve a named element on the page
    pub async fn resolve<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        name: &str,
    ) -> ProbeResult<ElementHandle> {
        let selector = self.get(name)?;
        driver
            .find(None, &selector.to_css())
            .await?
            .ok_or_else(|| ProbeError::element_not_found(format!("Element {name:?} ({selector})")))
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/admin/taxons/new`
    /// - Wildcards: `/admin/taxons/*`
    /// - Named parameters: `/admin/taxons/:id/edit`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Path part of a URL: scheme, host, query and fragment removed
    fn path_of(url: &str) -> &str {
        let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let path = if url.contains("://") {
            without_scheme
                .find('/')
                .map_or("", |i| &without_scheme[i..])
        } else {
            without_scheme
        };
        path.split(['?', '#']).next().unwrap_or_default()
    }

    /// Check if a URL (absolute or path-only) matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = Self::path_of(url)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        // wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract parameters from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> BTreeMap<String, String> {
        let url_segments: Vec<&str> = Self::path_of(url)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        self.segments
            .iter()
            .zip(url_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod element_map_tests {
        use super::*;

        #[test]
        fn test_get_defined_element() {
            let map = ElementMap::new().with("tree", Selector::css(".ui.list"));
            assert_eq!(map.get("tree").unwrap(), &Selector::css(".ui.list"));
        }

        #[test]
        fn test_get_undefined_element() {
            let err = ElementMap::new().get("nope").unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }));
            assert!(err.to_string().contains("nope"));
        }

        #[test]
        fn test_merge_overrides() {
            let base = ElementMap::new()
                .with("form", Selector::css("form"))
                .with("name", Selector::id("old"));
            let page = base.merged(ElementMap::new().with("name", Selector::id("new")));
            assert_eq!(page.get("name").unwrap(), &Selector::id("new"));
            assert_eq!(page.names(), vec!["form", "name"]);
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/admin/taxons/new");
            assert!(matcher.matches("/admin/taxons/new"));
            assert!(!matcher.matches("/admin/taxons"));
            assert!(!matcher.matches("/admin/taxons/new/extra"));
        }

        #[test]
        fn test_absolute_url_match() {
            let matcher = UrlMatcher::new("/admin/taxons/new");
            assert!(matcher.matches("http://localhost:8080/admin/taxons/new"));
            assert!(matcher.matches("https://shop.test/admin/taxons/new?locale=en_US#top"));
            assert!(!matcher.matches("https://shop.test/"));
        }

        #[test]
        fn test_wildcard_match() {
            let matcher = UrlMatcher::new("/admin/taxons/*");
            assert!(matcher.matches("/admin/taxons/123"));
            assert!(!matcher.matches("/admin/taxons"));
        }

        #[test]
        fn test_extract_params() {
            let matcher = UrlMatcher::new("/admin/taxons/:id/edit");
            let params = matcher.extract_params("http://shop.test/admin/taxons/42/edit");
            assert_eq!(params.get("id"), Some(&"42".to_string()));
        }

        #[test]
        fn test_pattern_getter() {
            let matcher = UrlMatcher::new("/admin/taxons/new");
            assert_eq!(matcher.pattern(), "/admin/taxons/new");
        }
    }
}
