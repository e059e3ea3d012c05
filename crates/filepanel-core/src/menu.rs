use serde::{Deserialize, Serialize};

/// Operation a context-menu entry triggers on the node it was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    Rename,
    NewFile,
    NewFolder,
    UploadFiles,
    UploadFolder,
    Refresh,
    Delete,
    RunAsProject,
}

/// A context-menu item (action, divider, or submenu)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItem {
    /// A divider line
    Divider,
    /// A clickable entry
    Action { label: String, action: NodeAction },
    /// A nested menu
    Submenu { label: String, items: Vec<MenuItem> },
}

impl MenuItem {
    pub fn action(label: impl Into<String>, action: NodeAction) -> Self {
        MenuItem::Action {
            label: label.into(),
            action,
        }
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        MenuItem::Submenu {
            label: label.into(),
            items,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, MenuItem::Divider)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuItem::Divider => None,
            MenuItem::Action { label, .. } | MenuItem::Submenu { label, .. } => Some(label),
        }
    }
}

/// Find the action bound to `label`, searching submenus depth-first
pub fn find_action(items: &[MenuItem], label: &str) -> Option<NodeAction> {
    items.iter().find_map(|item| match item {
        MenuItem::Action { label: l, action } if l == label => Some(*action),
        MenuItem::Submenu { items, .. } => find_action(items, label),
        _ => None,
    })
}

/// Flatten every action in menu order, including those inside submenus
pub fn actions(items: &[MenuItem]) -> Vec<NodeAction> {
    let mut out = Vec::new();
    for item in items {
        match item {
            MenuItem::Action { action, .. } => out.push(*action),
            MenuItem::Submenu { items, .. } => out.extend(actions(items)),
            MenuItem::Divider => {}
        }
    }
    out
}
