// Filesystem abstraction layer for async, pluggable file system access
//
// The tree only ever talks to `FsManager`; backends are swappable (local
// disk, remote RPC service, the slow test decorator).

pub mod backend;
pub mod events;
pub mod local;
pub mod manager;
pub mod slow;

pub use backend::{FsBackend, FsEntry, FsEntryType, FsMetadata};
pub use events::FsEvent;
pub use local::LocalFsBackend;
pub use manager::{validate_name, FsManager};
pub use slow::{BackendMetrics, SlowFsBackend, SlowFsConfig};
