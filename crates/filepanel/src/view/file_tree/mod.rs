// File tree module for lazily listed directory hierarchies
//
// A `FileTree` owns every node and every directory listing in flat maps keyed
// by id. A directory node owns at most one nested listing, built the first
// time the node is activated.

pub mod directory;
pub mod node;
pub mod tree;
pub mod visibility;

pub use directory::{DirId, DirectoryTree, ListingState, TreeRow, INDENT_PX};
pub use node::{Caret, NodeId, TreeNode};
pub use tree::{Activation, FileTree, ListRequest, PendingIo, StatRequest};
pub use visibility::{classify, is_visible, EntryClass};
