// Load translations from the crate's locales directory
rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod services;
pub mod settings;
pub mod view;

pub use app::{FileTreePanel, PanelServices};
pub use settings::SettingsStore;
pub use view::file_tree::FileTree;
