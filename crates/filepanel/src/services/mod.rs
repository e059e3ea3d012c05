//! Collaborators the panel consumes: filesystem, dialogs, uploads, content
//! viewer, context menu host and the optional-capability registry.

pub mod content;
pub mod context_menu;
pub mod dialogs;
pub mod fs;
pub mod registry;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
pub mod upload;
