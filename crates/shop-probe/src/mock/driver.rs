//! [`PageDriver`] over an in-memory [`MockDocument`].
//!
//! Asynchronous page behaviour is simulated with deferred effects: a move
//! click puts the settle class on the clicked button and removes it after a
//! configurable number of polls, and typing a name schedules the generated
//! slug the same way. Polls are `value()` and `has_class()` calls.

use super::css::SelectorList;
use super::dom::{ClickBehavior, MockDocument, MockElement, NodeId};
use crate::driver::{ElementHandle, PageDriver};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Class a move button carries while its move is in flight
pub const SETTLE_CLASS: &str = "loading";

/// Attribute on a name input naming the id of the slug input it feeds
pub const SLUG_TARGET_ATTR: &str = "data-slug-target";

const HANDLE_PREFIX: &str = "mock-";

/// Lowercase, with runs of anything but letters and digits collapsed to `-`
#[must_use]
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone)]
enum Effect {
    RemoveClass(&'static str),
    SetValue(String),
}

#[derive(Debug, Clone)]
struct Deferred {
    remaining: u32,
    node: NodeId,
    effect: Effect,
}

#[derive(Debug)]
struct MockState {
    doc: MockDocument,
    url: String,
    history: Vec<String>,
    deferred: Vec<Deferred>,
    clicks: usize,
    class_checks: usize,
}

impl MockState {
    fn node(&self, handle: &ElementHandle) -> ProbeResult<NodeId> {
        let id = handle
            .id
            .strip_prefix(HANDLE_PREFIX)
            .and_then(|n| n.parse::<NodeId>().ok())
            .filter(|&n| self.doc.exists(n))
            .ok_or_else(|| ProbeError::driver(format!("unknown element handle {handle}")))?;
        if !self.doc.is_attached(id) {
            return Err(ProbeError::StaleElement {
                id: handle.id.clone(),
            });
        }
        Ok(id)
    }

    fn handle(&self, node: NodeId) -> ElementHandle {
        ElementHandle::new(format!("{HANDLE_PREFIX}{node}"), self.doc.tag(node))
    }

    fn defer(&mut self, remaining: u32, node: NodeId, effect: Effect) {
        if remaining == 0 {
            self.apply(node, effect);
        } else {
            self.deferred.push(Deferred {
                remaining,
                node,
                effect,
            });
        }
    }

    fn apply(&mut self, node: NodeId, effect: Effect) {
        match effect {
            Effect::RemoveClass(class) => self.doc.remove_class(node, class),
            Effect::SetValue(value) => self.doc.set_value(node, value),
        }
    }

    /// Advance deferred effects by one poll
    fn tick(&mut self) {
        let mut due = Vec::new();
        self.deferred.retain_mut(|d| {
            d.remaining = d.remaining.saturating_sub(1);
            if d.remaining == 0 {
                due.push((d.node, d.effect.clone()));
                false
            } else {
                true
            }
        });
        for (node, effect) in due {
            trace!(node, ?effect, "applying deferred effect");
            self.apply(node, effect);
        }
    }

    fn is_control(&self, node: NodeId) -> bool {
        matches!(self.doc.tag(node), "input" | "textarea" | "select")
    }

    /// Form control named by id, name or placeholder, else by the text of
    /// its label
    fn locate_field(&self, scope: NodeId, field: &str) -> Option<NodeId> {
        let descendants = self.doc.descendants(scope);
        let by_attr = descendants.iter().copied().find(|&n| {
            self.is_control(n)
                && ["id", "name", "placeholder"]
                    .iter()
                    .any(|attr| self.doc.attr(n, attr) == Some(field))
        });
        if by_attr.is_some() {
            return by_attr;
        }

        let label = descendants
            .iter()
            .copied()
            .find(|&n| self.doc.tag(n) == "label" && self.doc.text_content(n).trim() == field)?;
        match self.doc.attr(label, "for") {
            Some(target) => self.doc.element_by_id(target),
            None => self
                .doc
                .descendants(label)
                .into_iter()
                .find(|&n| self.is_control(n)),
        }
    }
}

/// In-memory driver for page objects
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
    javascript: bool,
    settle_after: Option<u32>,
    slug_after: u32,
}

impl MockDriver {
    /// Driver over a document holding `body`.
    ///
    /// JavaScript is on, moves settle on the first poll and slugs appear on
    /// the first poll.
    #[must_use]
    pub fn new(body: MockElement) -> Self {
        Self {
            state: Mutex::new(MockState {
                doc: MockDocument::new(body),
                url: "about:blank".to_string(),
                history: Vec::new(),
                deferred: Vec::new(),
                clicks: 0,
                class_checks: 0,
            }),
            javascript: true,
            settle_after: Some(1),
            slug_after: 1,
        }
    }

    /// Polls until a move settles; `Some(0)` sets no marker at all, `None`
    /// never clears it
    #[must_use]
    pub const fn with_settle_after(mut self, polls: Option<u32>) -> Self {
        self.settle_after = polls;
        self
    }

    /// Polls until a typed name shows up as a slug
    #[must_use]
    pub const fn with_slug_after(mut self, polls: u32) -> Self {
        self.slug_after = polls;
        self
    }

    /// Turn JavaScript behaviour on or off
    #[must_use]
    pub const fn with_javascript(mut self, enabled: bool) -> Self {
        self.javascript = enabled;
        self
    }

    fn state(&self) -> ProbeResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::driver("mock document lock poisoned"))
    }

    /// Calls made so far, e.g. `navigate:http://shop.test/admin`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Check if a call with the given prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(prefix))
    }

    /// Number of clicks performed
    #[must_use]
    pub fn clicks(&self) -> usize {
        self.state.lock().map(|s| s.clicks).unwrap_or_default()
    }

    /// Number of `has_class` polls performed
    #[must_use]
    pub fn class_checks(&self) -> usize {
        self.state.lock().map(|s| s.class_checks).unwrap_or_default()
    }

    /// Value of the first element matching `selector`, without counting as
    /// a poll
    pub fn field_value(&self, selector: &str) -> ProbeResult<Option<String>> {
        let selector = SelectorList::parse(selector)?;
        let state = self.state()?;
        Ok(selector
            .select(&state.doc, None)
            .first()
            .map(|&n| state.doc.value(n).to_string()))
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.state()?;
        state.history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state()?.url.clone())
    }

    async fn find_all(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> ProbeResult<Vec<ElementHandle>> {
        let parsed = SelectorList::parse(selector)?;
        let state = self.state()?;
        let scope = scope.map(|s| state.node(s)).transpose()?;
        Ok(parsed
            .select(&state.doc, scope)
            .into_iter()
            .map(|n| state.handle(n))
            .collect())
    }

    async fn parent(&self, element: &ElementHandle) -> ProbeResult<Option<ElementHandle>> {
        let state = self.state()?;
        let node = state.node(element)?;
        Ok(state.doc.parent(node).map(|p| state.handle(p)))
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        let state = self.state()?;
        let node = state.node(element)?;
        Ok(state.doc.text_content(node).trim().to_string())
    }

    async fn value(&self, element: &ElementHandle) -> ProbeResult<String> {
        let mut state = self.state()?;
        let node = state.node(element)?;
        state.tick();
        Ok(state.doc.value(node).to_string())
    }

    async fn has_class(&self, element: &ElementHandle, class: &str) -> ProbeResult<bool> {
        let mut state = self.state()?;
        let node = state.node(element)?;
        state.class_checks += 1;
        state.tick();
        Ok(state.doc.has_class(node, class))
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state()?;
        let node = state.node(element)?;
        state.clicks += 1;
        state.history.push(format!("click:{element}"));

        let Some(behavior) = state.doc.on_click(node).cloned() else {
            return Ok(());
        };
        let is_item = |doc: &MockDocument, n: NodeId| doc.has_class(n, "item");
        match behavior {
            ClickBehavior::MoveItem(direction) => {
                if let Some(item) = state.doc.closest(node, is_item) {
                    let _ = state.doc.swap_with_sibling(item, direction, is_item);
                }
                match self.settle_after {
                    Some(0) => {}
                    Some(polls) => {
                        state.doc.add_class(node, SETTLE_CLASS);
                        state.defer(polls, node, Effect::RemoveClass(SETTLE_CLASS));
                    }
                    None => state.doc.add_class(node, SETTLE_CLASS),
                }
            }
            ClickBehavior::RemoveItem => {
                if let Some(item) = state.doc.closest(node, is_item) {
                    state.doc.detach(item);
                }
            }
            ClickBehavior::AppendPrototype {
                container_id,
                prototype,
            } => {
                let container = state.doc.element_by_id(&container_id).ok_or_else(|| {
                    ProbeError::driver(format!("collection container #{container_id} is gone"))
                })?;
                let index = state.doc.children(container).len().to_string();
                let _ = state
                    .doc
                    .append(container, prototype.instantiate("__name__", &index));
            }
        }
        Ok(())
    }

    async fn fill_field(
        &self,
        scope: Option<&ElementHandle>,
        field: &str,
        value: &str,
    ) -> ProbeResult<()> {
        let mut state = self.state()?;
        let scope = match scope {
            Some(s) => state.node(s)?,
            None => MockDocument::ROOT,
        };
        let node = state
            .locate_field(scope, field)
            .ok_or_else(|| ProbeError::element_not_found(format!("Form field {field:?}")))?;
        state.history.push(format!("fill:{field}={value}"));
        state.doc.set_value(node, value);

        if self.javascript {
            let target = state
                .doc
                .attr(node, SLUG_TARGET_ATTR)
                .and_then(|id| state.doc.element_by_id(id));
            if let Some(target) = target {
                state.defer(self.slug_after, target, Effect::SetValue(slugify(value)));
            }
        }
        Ok(())
    }

    async fn select_option(&self, element: &ElementHandle, option: &str) -> ProbeResult<()> {
        let mut state = self.state()?;
        let node = state.node(element)?;
        if state.doc.tag(node) != "select" {
            return Err(ProbeError::driver(format!("{element} is not a select")));
        }
        let chosen = state
            .doc
            .descendants(node)
            .into_iter()
            .filter(|&n| state.doc.tag(n) == "option")
            .find_map(|n| {
                let text = state.doc.text_content(n);
                let value = state.doc.attr(n, "value").unwrap_or(text.trim());
                (text.trim() == option || value == option).then(|| value.to_string())
            })
            .ok_or_else(|| ProbeError::element_not_found(format!("Option {option:?}")))?;
        state.history.push(format!("select:{option}"));
        state.doc.set_value(node, chosen);
        Ok(())
    }

    async fn attach_file(&self, element: &ElementHandle, path: &Path) -> ProbeResult<()> {
        let mut state = self.state()?;
        let node = state.node(element)?;
        if state.doc.tag(node) != "input" || state.doc.attr(node, "type") != Some("file") {
            return Err(ProbeError::driver(format!("{element} is not a file input")));
        }
        let path = path.display().to_string();
        state.history.push(format!("attach:{path}"));
        state.doc.set_value(node, path);
        Ok(())
    }

    fn supports_javascript(&self) -> bool {
        self.javascript
    }
}
