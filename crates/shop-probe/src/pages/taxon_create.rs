//! Admin "create taxon" page.
//!
//! The page shows the taxon tree next to the creation form. Tree queries and
//! moves go through [`HierarchicalElementLocator`]; form operations fill
//! fields by id, name or label text.

use crate::config::ProbeConfig;
use crate::driver::{ElementHandle, PageDriver};
use crate::hierarchy::HierarchicalElementLocator;
use crate::locator::Selector;
use crate::page_object::{ElementMap, PageObject, UrlMatcher};
use crate::result::{ProbeError, ProbeResult};
use crate::tree::{MoveDirection, TreeNode};
use crate::wait::wait_for;
use std::path::Path;
use tracing::{debug, info};

/// Path of the page below the base URL
pub const URL: &str = "/admin/taxons/new";

const ADD_IMAGE_BUTTON: &str = r#"[data-form-collection="add"]"#;
const IMAGE_ITEM: &str = r#"div[data-form-collection="item"]"#;
const FILE_INPUT: &str = r#"input[type="file"]"#;

fn translation_field(locale: &str, field: &str) -> String {
    format!("sylius_taxon_translations_{locale}_{field}")
}

/// Elements of the taxon form, shared by the create and update pages
fn form_elements() -> ElementMap {
    ElementMap::new()
        .with("code", Selector::id("sylius_taxon_code"))
        .with("description", Selector::id(translation_field("en_US", "description")))
        .with("name", Selector::id(translation_field("en_US", "name")))
        .with("parent", Selector::id("sylius_taxon_parent"))
        .with("slug", Selector::id(translation_field("en_US", "slug")))
}

/// The admin taxon creation page
#[derive(Debug)]
pub struct TaxonCreatePage<'d, D: PageDriver + ?Sized> {
    driver: &'d D,
    config: ProbeConfig,
    elements: ElementMap,
    url: UrlMatcher,
}

impl<'d, D: PageDriver + ?Sized> TaxonCreatePage<'d, D> {
    /// Page object over `driver`
    pub fn new(driver: &'d D, config: &ProbeConfig) -> Self {
        let elements = form_elements()
            .with("images", Selector::id("sylius_taxon_images"))
            .with("tree", Selector::css(config.tree.tree.clone()));
        Self {
            driver,
            config: config.clone(),
            elements,
            url: UrlMatcher::new(URL),
        }
    }

    /// Replace or add element definitions
    #[must_use]
    pub fn with_elements(mut self, overrides: ElementMap) -> Self {
        self.elements = self.elements.merged(overrides);
        self
    }

    fn tree(&self) -> HierarchicalElementLocator<'d, D> {
        HierarchicalElementLocator::new(
            self.driver,
            self.config.tree.clone(),
            self.config.move_settle_wait(),
        )
    }

    /// Fill a defined element by its id
    async fn fill_defined(&self, name: &str, value: &str) -> ProbeResult<()> {
        match self.elements.get(name)? {
            Selector::Id(id) => self.driver.fill_field(None, id, value).await,
            Selector::Css(css) => Err(ProbeError::validation(format!(
                "element {name:?} ({css}) is not addressable as a form field"
            ))),
        }
    }

    /// Navigate to the page
    pub async fn open(&self) -> ProbeResult<()> {
        let url = self.config.url(URL);
        info!(%url, "opening taxon creation page");
        self.driver.navigate(&url).await
    }

    /// Whether the browser is on this page
    pub async fn is_open(&self) -> ProbeResult<bool> {
        Ok(self.url.matches(&self.driver.current_url().await?))
    }

    /// Number of taxons in the tree
    pub async fn count_taxons(&self) -> ProbeResult<usize> {
        self.tree().count_all().await
    }

    /// Number of taxons whose name contains `name`
    pub async fn count_taxons_by_name(&self, name: &str) -> ProbeResult<usize> {
        self.tree().count_by_label_substring(name).await
    }

    /// Whether any taxon name in the tree contains `name`
    pub async fn has_taxon_with_name(&self, name: &str) -> ProbeResult<bool> {
        Ok(self.count_taxons_by_name(name).await? != 0)
    }

    /// Select the parent taxon by name
    pub async fn choose_parent(&self, name: &str) -> ProbeResult<()> {
        let parent = self.elements.resolve(self.driver, "parent").await?;
        debug!(name, "choosing parent taxon");
        self.driver.select_option(&parent, name).await
    }

    /// Delete the first taxon named `name` from the tree
    pub async fn delete_taxon_on_page_by_name(&self, name: &str) -> ProbeResult<()> {
        self.tree().delete_by_label(name).await
    }

    /// Fill the description of `locale`
    pub async fn describe_it_as(&self, description: &str, locale: &str) -> ProbeResult<()> {
        self.driver
            .fill_field(None, &translation_field(locale, "description"), description)
            .await
    }

    /// Fill the name of `locale`.
    ///
    /// With JavaScript the page derives the slug from the name
    /// asynchronously; this waits until the slug field of the same locale is
    /// filled.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Timeout`] when no slug shows up within the slug timeout.
    pub async fn name_it(&self, name: &str, locale: &str) -> ProbeResult<()> {
        self.driver
            .fill_field(None, &translation_field(locale, "name"), name)
            .await?;

        if !self.driver.supports_javascript() {
            return Ok(());
        }

        let slug_id = translation_field(locale, "slug");
        let slug = self
            .driver
            .find(None, &Selector::id(slug_id.as_str()).to_css())
            .await?
            .ok_or_else(|| ProbeError::element_not_found(format!("Slug field {slug_id}")))?;

        let driver = self.driver;
        let slug = &slug;
        let generated = wait_for(
            move || async move {
                let value = driver.value(slug).await?;
                Ok::<_, ProbeError>(!value.is_empty())
            },
            &self.config.slug_wait(),
            &format!("slug of {locale} translation"),
        )
        .await?;

        info!(name, locale, polls = generated.polls, "named taxon");
        Ok(())
    }

    /// Fill the slug field
    pub async fn specify_slug(&self, slug: &str) -> ProbeResult<()> {
        self.driver.fill_field(None, "Slug", slug).await
    }

    /// Fill the code field
    pub async fn specify_code(&self, code: &str) -> ProbeResult<()> {
        self.fill_defined("code", code).await
    }

    /// Add an image to the collection and attach `path` (relative to the
    /// configured files path), filling its code when one is given
    ///
    /// # Errors
    ///
    /// [`ProbeError::NotFound`] when adding produced no collection item.
    pub async fn attach_image(&self, path: &str, code: Option<&str>) -> ProbeResult<()> {
        let add = self
            .driver
            .find(None, ADD_IMAGE_BUTTON)
            .await?
            .ok_or_else(|| ProbeError::element_not_found("Add image button"))?;
        self.driver.click(&add).await?;

        let images = self.elements.resolve(self.driver, "images").await?;
        let item: ElementHandle = self
            .driver
            .find_all(Some(&images), IMAGE_ITEM)
            .await?
            .pop()
            .ok_or_else(|| ProbeError::not_found("image collection item"))?;

        if let Some(code) = code {
            self.driver.fill_field(Some(&item), "Code", code).await?;
        }

        let file = self
            .driver
            .find(Some(&item), FILE_INPUT)
            .await?
            .ok_or_else(|| ProbeError::element_not_found("Image file input"))?;
        let full_path = format!("{}{path}", self.config.files_path);
        self.driver.attach_file(&file, Path::new(&full_path)).await?;

        info!(?code, path = %full_path, "attached image");
        Ok(())
    }

    /// Move the first taxon named `name` one place up
    pub async fn move_up(&self, name: &str) -> ProbeResult<()> {
        self.tree().move_node(name, MoveDirection::Up).await
    }

    /// Move the first taxon named `name` one place down
    pub async fn move_down(&self, name: &str) -> ProbeResult<()> {
        self.tree().move_node(name, MoveDirection::Down).await
    }

    /// Name of the first taxon, or of the first child of `parent`
    pub async fn first_leaf_name(&self, parent: Option<&str>) -> ProbeResult<String> {
        self.tree().first_label(parent).await
    }

    /// All taxons in document order, or the children of `parent`
    pub async fn leaves(&self, parent: Option<&str>) -> ProbeResult<Vec<TreeNode>> {
        self.tree().scope(parent).await
    }
}

impl<D: PageDriver + ?Sized> PageObject for TaxonCreatePage<'_, D> {
    fn url_pattern(&self) -> &str {
        self.url.pattern()
    }

    fn elements(&self) -> &ElementMap {
        &self.elements
    }

    fn page_name(&self) -> &str {
        "TaxonCreatePage"
    }
}
