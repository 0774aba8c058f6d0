//! Scenario Fixtures
//!
//! Setup steps that seed scenario state directly instead of clicking through
//! the UI. Steps share what they created through [`SharedStorage`].

pub mod storage;
pub mod theme;

pub use storage::SharedStorage;
pub use theme::{
    Channel, ChannelManager, InMemoryChannelManager, Theme, ThemeContext, HOMEPAGE_TEMPLATE,
};
