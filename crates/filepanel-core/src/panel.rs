use serde::{Deserialize, Serialize};

/// Where and how a host mounts the files panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDescriptor {
    /// Display title (already localized)
    pub title: String,
    /// Icon identifier understood by the host
    pub icon: String,
    /// Side panel section the panel belongs to
    pub section: String,
    /// Position within the section, lower sorts first
    pub position: u32,
}

impl PanelDescriptor {
    pub const ICON: &'static str = "file-directory";
    pub const SECTION: &'static str = "files";

    /// Descriptor for the files tree, first in the `files` section
    pub fn files(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: Self::ICON.to_string(),
            section: Self::SECTION.to_string(),
            position: 0,
        }
    }
}
