use super::backend::FsEntry;
use std::path::{Path, PathBuf};

/// Change notification published by the filesystem service
#[derive(Debug, Clone, PartialEq)]
pub enum FsEvent {
    /// A new entry appeared directly under `parent`
    Created { parent: PathBuf, path: PathBuf },
    /// The entry at `path` (and everything below it) is gone
    Destroyed { path: PathBuf },
    /// The entry at `from` now lives at `entry.path`
    Renamed { from: PathBuf, entry: FsEntry },
}

impl FsEvent {
    /// The path the event is primarily about
    pub fn path(&self) -> &Path {
        match self {
            FsEvent::Created { path, .. } | FsEvent::Destroyed { path } => path,
            FsEvent::Renamed { from, .. } => from,
        }
    }
}
