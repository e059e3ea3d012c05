use super::node::{Caret, NodeId, TreeNode};
use crate::services::fs::FsEntry;
use std::fmt;
use std::path::PathBuf;

/// Horizontal padding per indentation level, in pixels
pub const INDENT_PX: usize = 12;

/// Unique identifier for a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirId(pub usize);

impl fmt::Display for DirId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dir({})", self.0)
    }
}

/// Where a listing stands with respect to the filesystem service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    Unloaded,
    /// A refresh is in flight; children were discarded
    Loading,
    Loaded,
    /// Last refresh failed (with error message); children stay empty
    Error(String),
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: NodeId,
    /// Entry path, used as the row anchor
    pub path: PathBuf,
    pub name: String,
    pub indentation: usize,
    pub caret: Caret,
    /// Nested listing drawn below this row, when displayed
    pub subtree: Option<DirId>,
}

impl TreeRow {
    pub(crate) fn from_node(node: &TreeNode) -> Self {
        Self {
            node: node.id,
            path: node.entry.path.clone(),
            name: node.entry.name.clone(),
            indentation: node.indentation,
            caret: node.caret(),
            subtree: node.subtree.filter(|_| node.expanded),
        }
    }

    pub fn padding_left(&self) -> usize {
        self.indentation * INDENT_PX
    }
}

/// Ordered listing of one directory
///
/// Children are kept in the order the listing returned, with entries
/// admitted by creation events appended at the end.
#[derive(Debug)]
pub struct DirectoryTree {
    pub id: DirId,
    /// The directory being listed
    pub entry: FsEntry,
    /// Node that owns this listing (None for the root)
    pub owner: Option<NodeId>,
    /// Indentation given to every child
    pub indentation: usize,
    pub children: Vec<NodeId>,
    /// Collapsed listings keep their children but are not drawn
    pub displayed: bool,
    pub state: ListingState,
    /// Bumped when a refresh starts
    pub(crate) generation: u64,
    /// Bumped when a refresh starts and when a listing is applied
    pub(crate) revision: u64,
    pub(crate) rows: Vec<TreeRow>,
}

impl DirectoryTree {
    pub fn new(id: DirId, entry: FsEntry, owner: Option<NodeId>, indentation: usize) -> Self {
        Self {
            id,
            entry,
            owner,
            indentation,
            children: Vec::new(),
            displayed: true,
            state: ListingState::Unloaded,
            generation: 0,
            revision: 0,
            rows: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Rows as of the last render
    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ListingState::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.state == ListingState::Loading
    }

    /// Whether created entries may be appended: the listing has settled,
    /// successfully or not
    pub fn accepts_created(&self) -> bool {
        matches!(self.state, ListingState::Loaded | ListingState::Error(_))
    }
}
