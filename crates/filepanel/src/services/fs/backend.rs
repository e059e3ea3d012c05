use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Represents a file or directory entry
#[derive(Debug, Clone, PartialEq)]
pub struct FsEntry {
    pub path: PathBuf,
    pub name: String,
    pub entry_type: FsEntryType,
    pub metadata: Option<FsMetadata>,
}

impl FsEntry {
    pub fn new(path: PathBuf, name: String, entry_type: FsEntryType) -> Self {
        Self {
            path,
            name,
            entry_type,
            metadata: None,
        }
    }

    /// Build an entry whose name is the last segment of `path`
    pub fn from_path(path: PathBuf, entry_type: FsEntryType) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(path, name, entry_type)
    }

    pub fn with_metadata(mut self, metadata: FsMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == FsEntryType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == FsEntryType::File
    }

    pub fn is_symlink(&self) -> bool {
        self.entry_type == FsEntryType::Symlink
    }

    /// Directory containing this entry
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsEntryType {
    File,
    Directory,
    Symlink,
}

/// Metadata about a filesystem entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FsMetadata {
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
    pub is_readonly: bool,
}

impl FsMetadata {
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.is_readonly = readonly;
        self
    }
}

/// Async filesystem service the tree is built on
///
/// Every operation may suspend; callers must not assume anything about the
/// relative completion order of concurrent calls.
#[async_trait]
pub trait FsBackend: Send + Sync {
    /// List entries in a directory (non-recursive), in the order the tree
    /// should display them
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read (permission denied,
    /// doesn't exist, not a directory, etc.)
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>>;

    /// Get a single entry with metadata
    async fn stat(&self, path: &Path) -> io::Result<FsEntry>;

    /// Rename `path` within its directory, returning the renamed entry
    async fn rename(&self, path: &Path, new_name: &str) -> io::Result<FsEntry>;

    /// Create an empty file `name` inside `dir`
    async fn create_file(&self, dir: &Path, name: &str) -> io::Result<FsEntry>;

    /// Create a directory `name` inside `dir`
    async fn create_dir(&self, dir: &Path, name: &str) -> io::Result<FsEntry>;

    /// Remove a file, or a directory with everything below it
    async fn remove(&self, path: &Path) -> io::Result<()>;
}
