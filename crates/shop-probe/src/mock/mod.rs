//! Mock DOM Driver
//!
//! An in-memory [`PageDriver`](crate::driver::PageDriver) so page objects can
//! run in unit tests and BDD scenarios without a browser.
//!
//! ```rust,ignore
//! use shop_probe::mock::{render_taxon_create_page, MockDriver, MockTaxon};
//!
//! let driver = MockDriver::new(render_taxon_create_page(
//!     &[MockTaxon::new("Category").with_children(vec![MockTaxon::new("Clothes")])],
//!     &["en_US"],
//! ));
//! ```
//!
//! The renderers produce the markup the admin taxon pages use: a
//! `.ui.list` tree whose items carry move and delete buttons, and the
//! taxon form with per-locale translations and an image collection.

mod css;
mod dom;
mod driver;

pub use css::SelectorList;
pub use dom::{ClickBehavior, MockDocument, MockElement, NodeId};
pub use driver::{slugify, MockDriver, SETTLE_CLASS, SLUG_TARGET_ATTR};

use crate::tree::MoveDirection;

/// Id of the taxon form's image collection
pub const IMAGES_ID: &str = "sylius_taxon_images";

/// A taxon to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTaxon {
    /// Display name
    pub name: String,
    /// Unique code
    pub code: String,
    /// Child taxons
    pub children: Vec<MockTaxon>,
}

impl MockTaxon {
    /// Taxon whose code is derived from its name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: slugify(&name).replace('-', "_"),
            name,
            children: Vec::new(),
        }
    }

    /// Override the code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the children
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    fn flatten<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            child.flatten(out);
        }
    }
}

fn move_button(direction: MoveDirection) -> MockElement {
    MockElement::new("button")
        .class(format!("ui icon button sylius-taxon-move-{direction}"))
        .on_click(ClickBehavior::MoveItem(direction))
}

fn tree_item(taxon: &MockTaxon) -> MockElement {
    let header = MockElement::new("div")
        .class("header")
        .child(
            MockElement::new("a")
                .attr("href", format!("/admin/taxons/{}/edit", taxon.code))
                .text(&taxon.name),
        )
        .child(move_button(MoveDirection::Up))
        .child(move_button(MoveDirection::Down))
        .child(
            MockElement::new("button")
                .class("ui red button")
                .on_click(ClickBehavior::RemoveItem)
                .text("Delete"),
        );

    let mut content = MockElement::new("div").class("content").child(header);
    if !taxon.children.is_empty() {
        content = content.child(
            MockElement::new("div")
                .class("list")
                .children(taxon.children.iter().map(tree_item)),
        );
    }
    MockElement::new("div")
        .class("item")
        .attr("data-code", &taxon.code)
        .child(content)
}

/// Render the taxon tree as the admin sidebar shows it
#[must_use]
pub fn render_taxon_tree(taxons: &[MockTaxon]) -> MockElement {
    let tree = MockElement::new("div").class("ui list");
    if taxons.is_empty() {
        // placeholder row without a label
        return tree.child(
            MockElement::new("div")
                .class("item")
                .child(MockElement::new("div").class("content").text("There are no taxons")),
        );
    }
    tree.children(taxons.iter().map(tree_item))
}

fn labelled(label: &str, control: MockElement) -> [MockElement; 2] {
    let id = control.attrs.get("id").cloned().unwrap_or_default();
    [MockElement::new("label").attr("for", id).text(label), control]
}

fn translation_fields(locale: &str) -> MockElement {
    let prefix = format!("sylius_taxon_translations_{locale}");
    MockElement::new("div")
        .class("locale")
        .attr("data-locale", locale)
        .children(labelled(
            "Name",
            MockElement::new("input")
                .id(format!("{prefix}_name"))
                .attr("name", format!("sylius_taxon[translations][{locale}][name]"))
                .attr(SLUG_TARGET_ATTR, format!("{prefix}_slug")),
        ))
        .children(labelled(
            "Slug",
            MockElement::new("input")
                .id(format!("{prefix}_slug"))
                .attr("name", format!("sylius_taxon[translations][{locale}][slug]")),
        ))
        .children(labelled(
            "Description",
            MockElement::new("textarea")
                .id(format!("{prefix}_description"))
                .attr("name", format!("sylius_taxon[translations][{locale}][description]")),
        ))
}

fn image_collection() -> MockElement {
    let list_id = format!("{IMAGES_ID}_list");
    let prototype = MockElement::new("div")
        .attr("data-form-collection", "item")
        .children(labelled(
            "Code",
            MockElement::new("input")
                .id(format!("{IMAGES_ID}___name___code"))
                .attr("name", "sylius_taxon[images][__name__][code]"),
        ))
        .children(labelled(
            "File",
            MockElement::new("input")
                .id(format!("{IMAGES_ID}___name___file"))
                .attr("type", "file"),
        ));

    MockElement::new("div")
        .id(IMAGES_ID)
        .attr("data-form-type", "collection")
        .child(
            MockElement::new("div")
                .id(&list_id)
                .attr("data-form-collection", "list"),
        )
        .child(
            MockElement::new("a")
                .class("ui labeled icon button")
                .attr("data-form-collection", "add")
                .on_click(ClickBehavior::AppendPrototype {
                    container_id: list_id,
                    prototype: Box::new(prototype),
                })
                .text("Add"),
        )
}

/// Render the "create taxon" admin page: the tree next to the form
#[must_use]
pub fn render_taxon_create_page(taxons: &[MockTaxon], locales: &[&str]) -> MockElement {
    let mut all = Vec::new();
    for taxon in taxons {
        taxon.flatten(&mut all);
    }

    let parent = MockElement::new("select")
        .id("sylius_taxon_parent")
        .attr("name", "sylius_taxon[parent]")
        .child(MockElement::new("option").attr("value", ""))
        .children(
            all.iter()
                .map(|t| MockElement::new("option").attr("value", &t.code).text(&t.name)),
        );

    let form = MockElement::new("form")
        .attr("name", "sylius_taxon")
        .children(labelled(
            "Code",
            MockElement::new("input")
                .id("sylius_taxon_code")
                .attr("name", "sylius_taxon[code]"),
        ))
        .children(labelled("Parent", parent))
        .children(locales.iter().map(|l| translation_fields(l)))
        .child(image_collection())
        .child(MockElement::new("button").attr("type", "submit").text("Create"));

    MockElement::new("body").child(
        MockElement::new("div")
            .class("ui grid")
            .child(MockElement::new("div").class("four wide column").child(render_taxon_tree(taxons)))
            .child(MockElement::new("div").class("twelve wide column").child(form)),
    )
}
