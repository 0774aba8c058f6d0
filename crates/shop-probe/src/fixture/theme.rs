//! Theme fixtures.
//!
//! Seeds themes straight onto disk below `<cache_dir>/_themes/` and assigns
//! them to sales channels through a [`ChannelManager`], bypassing the UI.
//! A theme on disk is a directory with a `composer.json` and optional
//! template overrides; resolving templates is the shop's business.

use super::storage::SharedStorage;
use crate::config::ProbeConfig;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Template a theme overrides to change the homepage
pub const HOMEPAGE_TEMPLATE: &str = "SyliusWebBundle/views/Frontend/Homepage/main.html.twig";

/// A theme seeded on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Machine name, e.g. `maverick-meerkat`
    pub name: String,
    /// Human title, e.g. `Maverick Meerkat`
    pub title: String,
    /// Theme directory
    pub path: PathBuf,
}

impl Theme {
    /// Theme titled `title` living below `themes_dir`.
    ///
    /// The name is the lowercased title with spaces replaced by `-`.
    #[must_use]
    pub fn from_title(title: &str, themes_dir: &Path) -> Self {
        let name = title.to_lowercase().replace(' ', "-");
        Self {
            path: themes_dir.join(&name),
            name,
            title: title.to_string(),
        }
    }

    /// Path of the theme manifest
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("composer.json")
    }

    /// Path of a template below the theme
    #[must_use]
    pub fn template_path(&self, template: &str) -> PathBuf {
        self.path.join(template)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ThemeManifest {
    name: String,
    title: String,
}

/// A sales channel, as far as theming is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Name of the theme in use, if any
    pub theme_name: Option<String>,
}

impl Channel {
    /// Channel without a theme
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            theme_name: None,
        }
    }
}

/// Persistence collaborator for channels.
///
/// `persist` stages a channel, `flush` makes staged changes visible to
/// `find_by_code`.
pub trait ChannelManager: Send + Sync {
    /// Stage a channel for saving
    fn persist(&self, channel: &Channel) -> ProbeResult<()>;

    /// Write staged channels
    fn flush(&self) -> ProbeResult<()>;

    /// Look a saved channel up by code
    fn find_by_code(&self, code: &str) -> ProbeResult<Option<Channel>>;
}

/// [`ChannelManager`] keeping channels in memory
#[derive(Debug, Default)]
pub struct InMemoryChannelManager {
    staged: Mutex<Vec<Channel>>,
    saved: Mutex<BTreeMap<String, Channel>>,
}

fn lock<T>(mutex: &Mutex<T>) -> ProbeResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ProbeError::fixture("channel store lock poisoned"))
}

impl InMemoryChannelManager {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with saved channels
    #[must_use]
    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let saved = channels.into_iter().map(|c| (c.code.clone(), c)).collect();
        Self {
            staged: Mutex::default(),
            saved: Mutex::new(saved),
        }
    }

    /// Number of channels staged but not flushed
    #[must_use]
    pub fn pending(&self) -> usize {
        self.staged.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl ChannelManager for InMemoryChannelManager {
    fn persist(&self, channel: &Channel) -> ProbeResult<()> {
        lock(&self.staged)?.push(channel.clone());
        Ok(())
    }

    fn flush(&self) -> ProbeResult<()> {
        let staged = std::mem::take(&mut *lock(&self.staged)?);
        let mut saved = lock(&self.saved)?;
        for channel in staged {
            let _ = saved.insert(channel.code.clone(), channel);
        }
        Ok(())
    }

    fn find_by_code(&self, code: &str) -> ProbeResult<Option<Channel>> {
        Ok(lock(&self.saved)?.get(code).cloned())
    }
}

/// Step helpers seeding themes and theme assignments
#[derive(Debug)]
pub struct ThemeContext<M: ChannelManager> {
    storage: SharedStorage,
    channels: M,
    themes_dir: PathBuf,
}

impl<M: ChannelManager> ThemeContext<M> {
    /// Context writing themes below `config.cache_dir`
    pub fn new(storage: SharedStorage, channels: M, config: &ProbeConfig) -> Self {
        Self {
            storage,
            channels,
            themes_dir: config.cache_dir.join("_themes"),
        }
    }

    /// Scenario storage the context writes to
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Channel persistence collaborator
    pub fn channels(&self) -> &M {
        &self.channels
    }

    /// Directory themes are seeded in
    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    /// Saved channel with `code`
    ///
    /// # Errors
    ///
    /// [`ProbeError::NotFound`] when no such channel is saved.
    pub fn channel(&self, code: &str) -> ProbeResult<Channel> {
        self.channels
            .find_by_code(code)?
            .ok_or_else(|| ProbeError::not_found(format!("channel {code:?}")))
    }

    /// Given the store has "<title>" theme
    pub fn store_has_theme(&self, title: &str) -> ProbeResult<Theme> {
        let theme = Theme::from_title(title, &self.themes_dir);
        fs::create_dir_all(&theme.path)?;

        let manifest = ThemeManifest {
            name: theme.name.clone(),
            title: theme.title.clone(),
        };
        fs::write(theme.manifest_path(), serde_json::to_string_pretty(&manifest)?)?;

        info!(name = %theme.name, path = %theme.path.display(), "seeded theme");
        self.storage.set("theme", theme.clone())?;
        Ok(theme)
    }

    /// Given channel "<channel>" uses "<theme>" theme
    pub fn channel_uses_theme(&self, mut channel: Channel, theme: &Theme) -> ProbeResult<Channel> {
        channel.theme_name = Some(theme.name.clone());
        self.channels.persist(&channel)?;
        self.channels.flush()?;

        info!(channel = %channel.code, theme = %theme.name, "channel uses theme");
        self.storage.set("channel", channel.clone())?;
        self.storage.set("theme", theme.clone())?;
        Ok(channel)
    }

    /// Given channel "<channel>" does not use any theme
    pub fn channel_does_not_use_any_theme(&self, mut channel: Channel) -> ProbeResult<Channel> {
        channel.theme_name = None;
        // flush only writes staged channels
        self.channels.persist(&channel)?;
        self.channels.flush()?;

        info!(channel = %channel.code, "channel uses no theme");
        self.storage.set("channel", channel.clone())?;
        Ok(channel)
    }

    /// Given this theme changes homepage template contents to "<contents>"
    pub fn theme_changes_homepage_template_contents(
        &self,
        theme: &Theme,
        contents: &str,
    ) -> ProbeResult<PathBuf> {
        let file = theme.template_path(HOMEPAGE_TEMPLATE);
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&file, contents)?;
        info!(theme = %theme.name, file = %file.display(), "overrode homepage template");
        Ok(file)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> ThemeContext<InMemoryChannelManager> {
        ThemeContext::new(
            SharedStorage::new(),
            InMemoryChannelManager::with_channels([Channel::new("WEB", "Web Store")]),
            &ProbeConfig::default().with_cache_dir(dir.path()),
        )
    }

    mod theme_tests {
        use super::*;

        #[test]
        fn test_name_from_title() {
            let theme = Theme::from_title("Maverick Meerkat Dark", Path::new("/cache/_themes"));
            assert_eq!(theme.name, "maverick-meerkat-dark");
            assert_eq!(theme.path, PathBuf::from("/cache/_themes/maverick-meerkat-dark"));
        }

        #[test]
        fn test_store_has_theme_writes_manifest() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            let theme = ctx.store_has_theme("Maverick Meerkat").unwrap();

            assert_eq!(theme.path, dir.path().join("_themes/maverick-meerkat"));
            let manifest: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(theme.manifest_path()).unwrap()).unwrap();
            assert_eq!(manifest["name"], "maverick-meerkat");
            assert_eq!(manifest["title"], "Maverick Meerkat");
            assert_eq!(ctx.storage().get::<Theme>("theme").unwrap(), theme);
        }

        #[test]
        fn test_seeding_twice_overwrites() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            let _ = ctx.store_has_theme("Plain").unwrap();
            let theme = ctx.store_has_theme("Plain").unwrap();
            assert!(theme.manifest_path().is_file());
        }

        #[test]
        fn test_homepage_override() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            let theme = ctx.store_has_theme("Maverick Meerkat").unwrap();
            let file = ctx
                .theme_changes_homepage_template_contents(&theme, "Hello from the theme")
                .unwrap();
            assert!(file.ends_with("Frontend/Homepage/main.html.twig"));
            assert_eq!(fs::read_to_string(file).unwrap(), "Hello from the theme");
        }
    }

    mod channel_tests {
        use super::*;

        #[test]
        fn test_channel_uses_theme_is_saved_and_stored() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            let theme = ctx.store_has_theme("Maverick Meerkat").unwrap();
            let channel = ctx.channel("WEB").unwrap();

            let _ = ctx.channel_uses_theme(channel, &theme).unwrap();

            let saved = ctx.channel("WEB").unwrap();
            assert_eq!(saved.theme_name.as_deref(), Some("maverick-meerkat"));
            assert_eq!(ctx.storage().get::<Channel>("channel").unwrap(), saved);
            assert_eq!(ctx.channels().pending(), 0);
        }

        #[test]
        fn test_channel_does_not_use_any_theme() {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir);
            let theme = ctx.store_has_theme("Maverick Meerkat").unwrap();
            let channel = ctx.channel_uses_theme(ctx.channel("WEB").unwrap(), &theme).unwrap();

            let _ = ctx.channel_does_not_use_any_theme(channel).unwrap();

            assert_eq!(ctx.channel("WEB").unwrap().theme_name, None);
            assert_eq!(
                ctx.storage().get::<Channel>("channel").unwrap().theme_name,
                None
            );
        }

        #[test]
        fn test_unknown_channel() {
            let dir = TempDir::new().unwrap();
            let err = context(&dir).channel("MOBILE").unwrap_err();
            assert!(matches!(err, ProbeError::NotFound { .. }));
        }

        #[test]
        fn test_persist_is_invisible_until_flush() {
            let manager = InMemoryChannelManager::new();
            manager.persist(&Channel::new("WEB", "Web")).unwrap();
            assert_eq!(manager.pending(), 1);
            assert!(manager.find_by_code("WEB").unwrap().is_none());
            manager.flush().unwrap();
            assert!(manager.find_by_code("WEB").unwrap().is_some());
        }
    }
}
