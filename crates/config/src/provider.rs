use std::sync::Arc;

use parking_lot::RwLock;

use crate::Settings;

/// Synchronous source of the current settings.
///
/// The core never persists configuration; it reads a fresh snapshot whenever it
/// needs one.
pub trait ConfigProvider: Send + Sync {
    /// Current settings snapshot.
    fn snapshot(&self) -> Settings;
}

/// In-memory provider that can be updated while the service runs.
#[derive(Clone, Debug, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    /// Wrap an initial settings value.
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Replace the current settings wholesale.
    pub fn replace(&self, settings: Settings) {
        *self.inner.write() = settings;
    }

    /// Mutate the current settings in place.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.inner.write());
    }
}

impl ConfigProvider for SharedSettings {
    fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }
}
