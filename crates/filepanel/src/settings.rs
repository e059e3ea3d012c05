//! Shared, observable tree settings
//!
//! One `SettingsStore` exists per panel. Every live tree node holds its own
//! receiver from [`SettingsStore::subscribe`]; dropping the node drops the
//! receiver, so released nodes stop observing changes without any explicit
//! bookkeeping.

use filepanel_core::{ConfigError, TreeSettings};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct SettingsStore {
    sender: Arc<watch::Sender<TreeSettings>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(TreeSettings::default())
    }
}

impl SettingsStore {
    pub fn new(settings: TreeSettings) -> Self {
        let (sender, _) = watch::channel(settings);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Load and validate settings from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(TreeSettings::load_from_file(path)?))
    }

    /// Snapshot of the current values
    pub fn current(&self) -> TreeSettings {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TreeSettings> {
        self.sender.subscribe()
    }

    /// Apply `f` and notify subscribers if anything actually changed
    pub fn update(&self, f: impl FnOnce(&mut TreeSettings)) -> bool {
        self.sender.send_if_modified(|settings| {
            let before = settings.clone();
            f(settings);
            *settings != before
        })
    }

    /// Replace all values, notifying subscribers unconditionally
    pub fn replace(&self, settings: TreeSettings) {
        self.sender.send_replace(settings);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
