use crate::view::file_tree::NodeId;
use std::path::Path;

/// Host widget that shows a contextual menu on a tree row
///
/// The tree attaches an anchor for every live node and detaches it when the
/// node is released. When the menu opens, the host asks the panel for the
/// items with `FileTreePanel::context_menu(anchor)`, so the list reflects the
/// services registered at that moment.
pub trait ContextMenuService: Send + Sync {
    fn attach(&self, anchor: NodeId, path: &Path);

    fn detach(&self, anchor: NodeId);
}
