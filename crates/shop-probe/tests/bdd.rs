//! BDD scenarios for the admin taxon pages and theme fixtures, run against
//! the in-memory driver.

use cucumber::{given, then, when, World};
use shop_probe::fixture::{
    Channel, ChannelManager, InMemoryChannelManager, Theme, ThemeContext, HOMEPAGE_TEMPLATE,
};
use shop_probe::fixture::SharedStorage;
use shop_probe::logging::{self, LogFormat};
use shop_probe::mock::{render_taxon_create_page, MockDriver, MockTaxon};
use shop_probe::{ProbeConfig, ProbeError, TaxonCreatePage};
use std::fs;
use tempfile::TempDir;

/// State shared by the steps of one scenario
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct AdminWorld {
    taxons: Vec<MockTaxon>,
    settle_after: Option<u32>,
    driver: Option<MockDriver>,
    config: ProbeConfig,
    themes: ThemeContext<InMemoryChannelManager>,
    last_error: Option<ProbeError>,
    // removed with the world at the end of the scenario
    _cache: TempDir,
}

impl AdminWorld {
    fn new() -> Self {
        let cache = TempDir::new().expect("create cache dir");
        let config = ProbeConfig::default()
            .with_base_url("http://shop.test")
            .with_files_path("tests/fixtures/")
            .with_cache_dir(cache.path())
            .with_move_settle_timeout(1_000)
            .with_slug_timeout(1_000)
            .with_poll_interval(1);
        let themes = ThemeContext::new(SharedStorage::new(), InMemoryChannelManager::new(), &config);
        Self {
            taxons: Vec::new(),
            settle_after: Some(1),
            driver: None,
            config,
            themes,
            last_error: None,
            _cache: cache,
        }
    }

    fn page(&self) -> TaxonCreatePage<'_, MockDriver> {
        let driver = self.driver.as_ref().expect("the taxon page has not been opened");
        TaxonCreatePage::new(driver, &self.config)
    }

    fn driver(&self) -> &MockDriver {
        self.driver.as_ref().expect("the taxon page has not been opened")
    }

    fn this_theme(&self) -> Theme {
        self.themes.storage().get::<Theme>("theme").expect("no theme in this scenario")
    }
}

fn find_taxon<'a>(taxons: &'a mut [MockTaxon], name: &str) -> Option<&'a mut MockTaxon> {
    for taxon in taxons {
        if taxon.name == name {
            return Some(taxon);
        }
        if let Some(found) = find_taxon(&mut taxon.children, name) {
            return Some(found);
        }
    }
    None
}

// =============================================================================
// TAXON TREE
// =============================================================================

#[given(expr = "the store has the {string} taxon")]
fn store_has_taxon(world: &mut AdminWorld, name: String) {
    world.taxons.push(MockTaxon::new(name));
}

#[given(expr = "the {string} taxon has a child {string}")]
fn taxon_has_child(world: &mut AdminWorld, parent: String, child: String) {
    find_taxon(&mut world.taxons, &parent)
        .unwrap_or_else(|| panic!("taxon {parent:?} was never added"))
        .children
        .push(MockTaxon::new(child));
}

#[given(expr = "moves on the page take {int} checks to settle")]
fn moves_take_checks(world: &mut AdminWorld, checks: u32) {
    world.settle_after = Some(checks);
}

#[given("I want to create a new taxon")]
async fn want_to_create_taxon(world: &mut AdminWorld) {
    let driver = MockDriver::new(render_taxon_create_page(&world.taxons, &["en_US", "de_DE"]))
        .with_settle_after(world.settle_after);
    world.driver = Some(driver);
    world.page().open().await.expect("open taxon creation page");
}

#[when(expr = "I move up the {string} taxon")]
async fn move_up(world: &mut AdminWorld, name: String) {
    world.page().move_up(&name).await.expect("move up");
}

#[when(expr = "I move down the {string} taxon")]
async fn move_down(world: &mut AdminWorld, name: String) {
    world.page().move_down(&name).await.expect("move down");
}

#[when(expr = "I try to move up the {string} taxon")]
async fn try_move_up(world: &mut AdminWorld, name: String) {
    world.last_error = world.page().move_up(&name).await.err();
}

#[when(expr = "I delete the {string} taxon on the page")]
async fn delete_on_page(world: &mut AdminWorld, name: String) {
    world
        .page()
        .delete_taxon_on_page_by_name(&name)
        .await
        .expect("delete taxon");
}

#[then("I should be on the taxon creation page")]
async fn on_creation_page(world: &mut AdminWorld) {
    assert!(world.page().is_open().await.expect("read current url"));
}

#[then(expr = "I should see {int} taxons on the list")]
async fn see_taxon_count(world: &mut AdminWorld, count: usize) {
    assert_eq!(world.page().count_taxons().await.expect("count taxons"), count);
}

#[then(expr = "I should see {int} taxon(s) with {string} in the name")]
async fn see_taxons_named(world: &mut AdminWorld, count: usize, part: String) {
    assert_eq!(
        world
            .page()
            .count_taxons_by_name(&part)
            .await
            .expect("count taxons by name"),
        count
    );
}

#[then(expr = "I should see the taxon named {string} in the list")]
async fn see_taxon(world: &mut AdminWorld, name: String) {
    assert!(world.page().has_taxon_with_name(&name).await.expect("read tree"));
}

#[then(expr = "I should not see the taxon named {string} in the list")]
async fn not_see_taxon(world: &mut AdminWorld, name: String) {
    assert!(!world.page().has_taxon_with_name(&name).await.expect("read tree"));
}

#[then(expr = "the first taxon on the list should be {string}")]
async fn first_taxon(world: &mut AdminWorld, name: String) {
    assert_eq!(world.page().first_leaf_name(None).await.expect("first taxon"), name);
}

#[then(expr = "the first taxon under {string} should be {string}")]
async fn first_taxon_under(world: &mut AdminWorld, parent: String, name: String) {
    assert_eq!(
        world
            .page()
            .first_leaf_name(Some(&parent))
            .await
            .expect("first child taxon"),
        name
    );
}

#[then(expr = "the taxons under {string} should be {string}")]
async fn taxons_under(world: &mut AdminWorld, parent: String, names: String) {
    let leaves: Vec<String> = world
        .page()
        .leaves(Some(&parent))
        .await
        .expect("child taxons")
        .into_iter()
        .map(|leaf| leaf.label)
        .collect();
    assert_eq!(leaves.join(", "), names);
}

#[then(expr = "I should be told that the {string} is not found")]
fn told_not_found(world: &mut AdminWorld, element: String) {
    let error = world.last_error.as_ref().expect("the last step did not fail");
    assert_eq!(error.to_string(), format!("{element} not found"));
}

// =============================================================================
// TAXON FORM
// =============================================================================

#[when(expr = "I specify its code as {string}")]
async fn specify_code(world: &mut AdminWorld, code: String) {
    world.page().specify_code(&code).await.expect("specify code");
}

#[when(expr = "I name it {string} in {string}")]
async fn name_it(world: &mut AdminWorld, name: String, locale: String) {
    world.page().name_it(&name, &locale).await.expect("name taxon");
}

#[when(expr = "I describe it as {string} in {string}")]
async fn describe_it(world: &mut AdminWorld, description: String, locale: String) {
    world
        .page()
        .describe_it_as(&description, &locale)
        .await
        .expect("describe taxon");
}

#[when(expr = "I set its slug to {string}")]
async fn set_slug(world: &mut AdminWorld, slug: String) {
    world.page().specify_slug(&slug).await.expect("specify slug");
}

#[when(expr = "I choose {string} as its parent taxon")]
async fn choose_parent(world: &mut AdminWorld, parent: String) {
    world.page().choose_parent(&parent).await.expect("choose parent");
}

#[when(expr = "I attach the {string} image with {string} code")]
async fn attach_image(world: &mut AdminWorld, path: String, code: String) {
    world
        .page()
        .attach_image(&path, Some(&code))
        .await
        .expect("attach image");
}

#[when(expr = "I attach the {string} image")]
async fn attach_image_without_code(world: &mut AdminWorld, path: String) {
    world.page().attach_image(&path, None).await.expect("attach image");
}

#[then(expr = "the {string} field should contain {string}")]
fn field_contains(world: &mut AdminWorld, id: String, expected: String) {
    let value = world
        .driver()
        .field_value(&format!("#{id}"))
        .expect("valid selector")
        .unwrap_or_else(|| panic!("no field #{id}"));
    assert_eq!(value, expected);
}

// =============================================================================
// THEMES
// =============================================================================

#[given(expr = "the store operates on a channel {string} with code {string}")]
fn store_operates_on_channel(world: &mut AdminWorld, name: String, code: String) {
    let channels = world.themes.channels();
    channels.persist(&Channel::new(code, name)).expect("persist channel");
    channels.flush().expect("flush channels");
}

#[given(expr = "the store has {string} theme")]
fn store_has_theme(world: &mut AdminWorld, title: String) {
    let _ = world.themes.store_has_theme(&title).expect("seed theme");
}

#[given(expr = "channel {string} uses {string} theme")]
fn channel_uses_theme(world: &mut AdminWorld, code: String, title: String) {
    let theme = world.this_theme();
    assert_eq!(theme.title, title);
    let channel = world.themes.channel(&code).expect("known channel");
    let _ = world
        .themes
        .channel_uses_theme(channel, &theme)
        .expect("assign theme");
}

#[given(expr = "channel {string} does not use any theme")]
fn channel_without_theme(world: &mut AdminWorld, code: String) {
    let channel = world.themes.channel(&code).expect("known channel");
    let _ = world
        .themes
        .channel_does_not_use_any_theme(channel)
        .expect("clear theme");
}

#[given(expr = "this theme changes homepage template contents to {string}")]
fn theme_changes_homepage(world: &mut AdminWorld, contents: String) {
    let theme = world.this_theme();
    let _ = world
        .themes
        .theme_changes_homepage_template_contents(&theme, &contents)
        .expect("write homepage template");
}

#[then(expr = "channel {string} should use the {string} theme")]
fn channel_should_use_theme(world: &mut AdminWorld, code: String, name: String) {
    let channel = world.themes.channel(&code).expect("known channel");
    assert_eq!(channel.theme_name.as_deref(), Some(name.as_str()));
    let stored = world.themes.storage().get::<Channel>("channel").expect("stored channel");
    assert_eq!(stored, channel);
}

#[then(expr = "channel {string} should not use any theme")]
fn channel_should_not_use_theme(world: &mut AdminWorld, code: String) {
    let channel = world.themes.channel(&code).expect("known channel");
    assert_eq!(channel.theme_name, None);
}

#[then(expr = "the theme manifest should name it {string}")]
fn manifest_names(world: &mut AdminWorld, name: String) {
    let theme = world.this_theme();
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(theme.manifest_path()).expect("read manifest"))
            .expect("manifest is json");
    assert_eq!(manifest["name"], name.as_str());
    assert_eq!(manifest["title"], theme.title.as_str());
}

#[then(expr = "the homepage template of this theme should read {string}")]
fn homepage_reads(world: &mut AdminWorld, contents: String) {
    let theme = world.this_theme();
    let written =
        fs::read_to_string(theme.template_path(HOMEPAGE_TEMPLATE)).expect("read homepage template");
    assert_eq!(written, contents);
}

#[tokio::main]
async fn main() {
    let _ = logging::init(LogFormat::Compact);
    AdminWorld::cucumber()
        .run_and_exit(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/features"))
        .await;
}
