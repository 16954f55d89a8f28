use crate::config::DemoConfig;
use crate::demo::{demo_banner_config, DemoBannerConfig};
use crate::error::Error;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Key remembering that the demo banner was dismissed.
pub const BANNER_DISMISSED_KEY: &str = "demo_banner_dismissed";

const PREFERENCES_FILE: &str = "preferences.json";

/// Small string key/value store for UI preferences.
pub trait BannerStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub struct MemoryBannerStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl BannerStore for MemoryBannerStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object persisted as `preferences.json` under a data directory.
#[derive(Debug, Clone)]
pub struct FileBannerStore {
    path: PathBuf,
}

impl FileBannerStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(PREFERENCES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, Error> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl BannerStore for FileBannerStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        debug!(path = %self.path.display(), key, "Preference stored");
        Ok(())
    }
}

/// Dismissible demo-mode notice. Only ever visible in demo mode.
pub struct DemoBanner<S> {
    config: DemoBannerConfig,
    visible: bool,
    store: S,
}

impl<S: BannerStore> DemoBanner<S> {
    pub fn new(demo: &DemoConfig, store: S) -> Result<Self, Error> {
        let config = demo_banner_config(demo);
        let dismissed = store.get(BANNER_DISMISSED_KEY)?.as_deref() == Some("true");
        Ok(Self {
            visible: config.show && !dismissed,
            config,
            store,
        })
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn config(&self) -> &DemoBannerConfig {
        &self.config
    }

    pub fn message(&self) -> &str {
        &self.config.message
    }

    /// Hides the banner and remembers the choice.
    pub fn dismiss(&mut self) -> Result<(), Error> {
        self.visible = false;
        self.store.set(BANNER_DISMISSED_KEY, "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_outside_demo_mode() {
        let banner = DemoBanner::new(&DemoConfig::default(), MemoryBannerStore::default()).unwrap();
        assert!(!banner.visible());
        assert!(banner.message().is_empty());
    }

    #[test]
    fn test_dismiss_hides_banner() {
        let mut banner = DemoBanner::new(&DemoConfig::demo(), MemoryBannerStore::default()).unwrap();
        assert!(banner.visible());
        assert!(banner.config().dismissible);

        banner.dismiss().unwrap();
        assert!(!banner.visible());
    }

    #[test]
    fn test_dismissal_persists_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();

        let mut banner = DemoBanner::new(&DemoConfig::demo(), FileBannerStore::new(dir.path())).unwrap();
        assert!(banner.visible());
        banner.dismiss().unwrap();

        let store = FileBannerStore::new(dir.path());
        assert_eq!(store.get(BANNER_DISMISSED_KEY).unwrap().as_deref(), Some("true"));
        let reopened = DemoBanner::new(&DemoConfig::demo(), store).unwrap();
        assert!(!reopened.visible());
    }

    #[test]
    fn test_corrupt_preferences_surface_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBannerStore::new(dir.path());
        fs::write(store.path(), b"not json").unwrap();
        assert!(matches!(
            DemoBanner::new(&DemoConfig::demo(), store),
            Err(Error::Serialization(_))
        ));
    }
}
