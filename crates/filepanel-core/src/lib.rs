//! Types shared between the filepanel engine and the hosts embedding it.

pub mod config;
pub mod menu;
pub mod panel;

pub use config::{ConfigError, ToolbarCommand, TreeSettings};
pub use menu::{MenuItem, NodeAction};
pub use panel::PanelDescriptor;
