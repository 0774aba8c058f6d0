//! Shop Probe: Page Objects for E-Commerce Admin Acceptance Tests
//!
//! Acceptance-test glue for the admin taxon pages of an online shop: page
//! objects that drive an abstract browser driver, setup fixtures that seed
//! scenario state directly, and an in-memory driver to run both without a
//! browser.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   SHOP PROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ BDD step   │    │ Page       │    │ PageDriver │            │
//! │   │ (cucumber) │───►│ objects +  │───►│ (browser   │            │
//! │   │            │    │ tree loc.  │    │  or mock)  │            │
//! │   └─────┬──────┘    └────────────┘    └────────────┘            │
//! │         │           ┌────────────┐    ┌────────────┐            │
//! │         └──────────►│ Fixtures   │───►│ Disk +     │            │
//! │                     │ (themes)   │    │ channels   │            │
//! │                     └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_probe::prelude::*;
//!
//! let driver = MockDriver::new(render_taxon_create_page(&taxons, &["en_US"]));
//! let page = TaxonCreatePage::new(&driver, &ProbeConfig::default());
//! page.open().await?;
//! page.move_up("Jeans").await?;
//! assert_eq!(page.first_leaf_name(Some("Clothes")).await?, "Jeans");
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod config;
pub mod driver;
pub mod fixture;
pub mod hierarchy;
pub mod locator;
pub mod logging;
#[cfg(feature = "mock")]
pub mod mock;
pub mod page_object;
pub mod pages;
mod result;
pub mod tree;
pub mod wait;

pub use config::ProbeConfig;
pub use driver::{ElementHandle, PageDriver};
pub use hierarchy::HierarchicalElementLocator;
pub use page_object::{ElementMap, PageObject, UrlMatcher};
pub use pages::TaxonCreatePage;
pub use result::{ProbeError, ProbeResult};
pub use tree::{MoveDirection, TreeNode, TreeSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::hierarchy::*;
    pub use super::locator::*;
    #[cfg(feature = "mock")]
    pub use super::mock::{render_taxon_create_page, render_taxon_tree, MockDriver, MockTaxon};
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::tree::*;
    pub use super::wait::*;
}
