//! Hierarchical element locator.
//!
//! Reads a rendered tree of labeled nodes back from the page and performs
//! label-addressed actions on it. Every call follows the same two phases:
//!
//! 1. **read**: snapshot the live tree through the driver;
//! 2. **act**: act on the element handle bound in that snapshot.
//!
//! Labels match by exact equality, first occurrence in document order.
//! Duplicate labels are not disambiguated.
//!
//! Moves are asynchronous on the page: the move button carries a settle
//! marker class while the request is in flight. [`move_node`] clicks and then
//! polls the same button until the marker is gone or the settle timeout
//! passes.
//!
//! [`move_node`]: HierarchicalElementLocator::move_node

use crate::driver::{ElementHandle, PageDriver};
use crate::locator::TreeSelectors;
use crate::result::{ProbeError, ProbeResult};
use crate::tree::{MoveDirection, TreeNode, TreeSnapshot};
use crate::wait::{wait_for, WaitOptions};
use futures::future::BoxFuture;
use tracing::{debug, info};

/// Locates nodes of a rendered tree and performs label-addressed actions
#[derive(Debug)]
pub struct HierarchicalElementLocator<'d, D: PageDriver + ?Sized> {
    driver: &'d D,
    selectors: TreeSelectors,
    settle: WaitOptions,
}

impl<'d, D: PageDriver + ?Sized> HierarchicalElementLocator<'d, D> {
    /// Create a locator over `driver`
    pub fn new(driver: &'d D, selectors: TreeSelectors, settle: WaitOptions) -> Self {
        Self {
            driver,
            selectors,
            settle,
        }
    }

    /// Selectors in use
    pub fn selectors(&self) -> &TreeSelectors {
        &self.selectors
    }

    /// Read the current tree from the page
    pub async fn snapshot(&self) -> ProbeResult<TreeSnapshot> {
        let root = self
            .driver
            .find(None, &self.selectors.tree)
            .await?
            .ok_or_else(|| ProbeError::not_found(format!("tree ({})", self.selectors.tree)))?;
        let roots = self.read_level(root).await?;
        Ok(TreeSnapshot::new(roots))
    }

    fn read_level(&self, list: ElementHandle) -> BoxFuture<'_, ProbeResult<Vec<TreeNode>>> {
        Box::pin(async move {
            let items = self.driver.find_all(Some(&list), &self.selectors.item).await?;
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                // items without a label are placeholders (e.g. an empty-list notice)
                let Some(label) = self.driver.find(Some(&item), &self.selectors.label).await?
                else {
                    continue;
                };
                let text = self.driver.text(&label).await?;
                let children = match self.driver.find(Some(&item), &self.selectors.sublist).await? {
                    Some(sublist) => self.read_level(sublist).await?,
                    None => Vec::new(),
                };
                nodes.push(TreeNode::new(text, label).with_children(children));
            }
            Ok(nodes)
        })
    }

    /// Number of nodes currently rendered, at any depth
    pub async fn count_all(&self) -> ProbeResult<usize> {
        Ok(self.snapshot().await?.len())
    }

    /// Number of nodes whose label contains `needle`; `""` matches all
    pub async fn count_by_label_substring(&self, needle: &str) -> ProbeResult<usize> {
        Ok(self.snapshot().await?.count_containing(needle))
    }

    /// Nodes in scope.
    ///
    /// Without a parent: every node in document order. With a parent: the
    /// direct children of the first node labelled `parent`.
    ///
    /// # Errors
    ///
    /// [`ProbeError::NotFound`] when `parent` is given but not rendered.
    pub async fn scope(&self, parent: Option<&str>) -> ProbeResult<Vec<TreeNode>> {
        let snapshot = self.snapshot().await?;
        match parent {
            None => Ok(snapshot.flatten().into_iter().cloned().collect()),
            Some(parent) => snapshot
                .find_first(parent)
                .map(|node| node.children.clone())
                .ok_or_else(|| ProbeError::not_found(format!("parent node {parent:?}"))),
        }
    }

    /// Nodes in scope labelled exactly `label`, in document order.
    ///
    /// The first element is the node label-addressed actions resolve to.
    /// An absent label yields an empty list.
    ///
    /// # Errors
    ///
    /// [`ProbeError::NotFound`] when `parent` is given but not rendered.
    pub async fn find_by_label(
        &self,
        label: &str,
        parent: Option<&str>,
    ) -> ProbeResult<Vec<TreeNode>> {
        let mut nodes = self.scope(parent).await?;
        nodes.retain(|node| node.label == label);
        Ok(nodes)
    }

    /// Label of the first node in scope.
    ///
    /// # Errors
    ///
    /// [`ProbeError::NotFound`] when the scope is empty or the parent is
    /// missing.
    pub async fn first_label(&self, parent: Option<&str>) -> ProbeResult<String> {
        self.scope(parent)
            .await?
            .into_iter()
            .next()
            .map(|node| node.label)
            .ok_or_else(|| match parent {
                Some(parent) => ProbeError::not_found(format!("children of {parent:?}")),
                None => ProbeError::not_found("any node in the tree"),
            })
    }

    /// Move the first node labelled `label` one position in `direction` and
    /// wait for the page to settle.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::ElementNotFound`] when the node or its move button is
    ///   missing; nothing is clicked in that case.
    /// - [`ProbeError::Timeout`] when the settle marker does not clear.
    pub async fn move_node(&self, label: &str, direction: MoveDirection) -> ProbeResult<()> {
        let missing =
            || ProbeError::element_not_found(format!("Move {direction} button for {label} taxon"));

        let snapshot = self.snapshot().await?;
        let node = snapshot.find_first(label).ok_or_else(missing)?;
        let button = self
            .action_button(&node.handle, &self.selectors.move_button(direction))
            .await?
            .ok_or_else(missing)?;

        debug!(label, %direction, button = %button, "clicking move button");
        self.driver.click(&button).await?;

        let driver = self.driver;
        let marker = self.selectors.settle_marker.as_str();
        let button = &button;
        let waited_for = format!("move {direction} of {label:?} to settle");
        let settled = wait_for(
            move || async move {
                let busy = driver.has_class(button, marker).await?;
                Ok::<_, ProbeError>(!busy)
            },
            &self.settle,
            &waited_for,
        )
        .await?;

        info!(label, %direction, polls = settled.polls, "moved node");
        Ok(())
    }

    /// Click the delete button of the first node labelled `label`.
    ///
    /// # Errors
    ///
    /// [`ProbeError::ElementNotFound`] when no such node or button exists.
    pub async fn delete_by_label(&self, label: &str) -> ProbeResult<()> {
        let missing = || ProbeError::element_not_found("Delete button");

        let snapshot = self.snapshot().await?;
        let node = snapshot.find_first(label).ok_or_else(missing)?;
        let button = self
            .action_button(&node.handle, &self.selectors.delete_button)
            .await?
            .ok_or_else(missing)?;

        self.driver.click(&button).await?;
        info!(label, "deleted node");
        Ok(())
    }

    /// Buttons sit next to the label, inside the label's parent
    async fn action_button(
        &self,
        label: &ElementHandle,
        selector: &str,
    ) -> ProbeResult<Option<ElementHandle>> {
        match self.driver.parent(label).await? {
            Some(container) => self.driver.find(Some(&container), selector).await,
            None => Ok(None),
        }
    }
}
