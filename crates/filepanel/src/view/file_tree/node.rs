use super::directory::DirId;
use super::visibility::is_visible;
use crate::services::fs::FsEntry;
use filepanel_core::TreeSettings;
use std::fmt;
use std::path::Path;
use tokio::sync::watch;

/// Unique identifier for a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Expand indicator shown in front of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    /// Files have no caret
    None,
    Closed,
    Open,
}

/// One entry of a directory listing
///
/// A node owns at most one child [`DirectoryTree`](super::DirectoryTree),
/// built the first time the node is activated and kept until the node is
/// released. Collapsing only hides it.
#[derive(Debug)]
pub struct TreeNode {
    pub id: NodeId,
    pub entry: FsEntry,
    /// Directory listing this node belongs to
    pub parent: DirId,
    /// Depth used for padding, at least 1
    pub indentation: usize,
    /// Child listing, once built
    pub subtree: Option<DirId>,
    /// Whether the child listing is currently displayed
    pub expanded: bool,
    visible: bool,
    settings: watch::Receiver<TreeSettings>,
}

impl TreeNode {
    pub fn new(
        id: NodeId,
        entry: FsEntry,
        parent: DirId,
        indentation: usize,
        settings: watch::Receiver<TreeSettings>,
    ) -> Self {
        let mut node = Self {
            id,
            entry,
            parent,
            indentation,
            subtree: None,
            expanded: false,
            visible: true,
            settings,
        };
        node.render();
        node
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }

    pub fn is_file(&self) -> bool {
        !self.entry.is_dir()
    }

    /// Visibility as of the last render
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Recompute visibility from the current settings
    pub fn render(&mut self) -> bool {
        self.visible = is_visible(&self.entry.name, &self.settings.borrow_and_update());
        self.visible
    }

    /// Re-render if the settings changed since this node last looked;
    /// returns whether visibility flipped
    pub fn settings_changed(&mut self) -> bool {
        if !self.settings.has_changed().unwrap_or(false) {
            return false;
        }
        let before = self.visible;
        self.render() != before
    }

    pub fn caret(&self) -> Caret {
        match (self.is_dir(), self.expanded) {
            (false, _) => Caret::None,
            (true, false) => Caret::Closed,
            (true, true) => Caret::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fs::FsEntryType;
    use crate::settings::SettingsStore;
    use std::path::PathBuf;

    fn entry(path: &str, entry_type: FsEntryType) -> FsEntry {
        FsEntry::from_path(PathBuf::from(path), entry_type)
    }

    #[test]
    fn test_file_node() {
        let store = SettingsStore::default();
        let node = TreeNode::new(
            NodeId(3),
            entry("/proj/readme.md", FsEntryType::File),
            DirId(0),
            1,
            store.subscribe(),
        );

        assert!(node.is_file());
        assert!(node.is_visible());
        assert_eq!(node.caret(), Caret::None);
        assert_eq!(node.name(), "readme.md");
        assert_eq!(node.id.to_string(), "Node(3)");
    }

    #[test]
    fn test_directory_caret() {
        let store = SettingsStore::default();
        let mut node = TreeNode::new(
            NodeId(1),
            entry("/proj/src", FsEntryType::Directory),
            DirId(0),
            1,
            store.subscribe(),
        );
        assert_eq!(node.caret(), Caret::Closed);

        node.expanded = true;
        assert_eq!(node.caret(), Caret::Open);
    }

    #[test]
    fn test_settings_changed_recomputes_visibility() {
        let store = SettingsStore::default();
        let mut node = TreeNode::new(
            NodeId(1),
            entry("/proj/.git", FsEntryType::Directory),
            DirId(0),
            1,
            store.subscribe(),
        );
        assert!(!node.is_visible());
        assert!(!node.settings_changed());

        store.update(|s| s.show_dot_git = true);
        assert!(node.settings_changed());
        assert!(node.is_visible());

        // Seen already
        assert!(!node.settings_changed());
    }

    #[test]
    fn test_dropping_node_unsubscribes() {
        let store = SettingsStore::default();
        let node = TreeNode::new(
            NodeId(1),
            entry("/proj/a", FsEntryType::File),
            DirId(0),
            1,
            store.subscribe(),
        );
        assert_eq!(store.subscriber_count(), 1);
        drop(node);
        assert_eq!(store.subscriber_count(), 0);
    }
}
