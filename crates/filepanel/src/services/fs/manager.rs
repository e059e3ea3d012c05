use super::backend::{FsBackend, FsEntry};
use super::events::FsEvent;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, Mutex};

/// Type alias for pending directory requests map
type PendingDirRequests =
    Arc<Mutex<HashMap<PathBuf, Vec<oneshot::Sender<io::Result<Vec<FsEntry>>>>>>>;

/// Capacity of the change notification channel
const EVENT_CAPACITY: usize = 256;

/// Reject names that are not a single path segment
pub fn validate_name(name: &str) -> io::Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR)
        || name.contains('\0');

    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid name: {:?}", name),
        ));
    }
    Ok(())
}

/// Filesystem service the tree talks to
///
/// The FsManager sits between the tree and the backend:
/// - Concurrent listings of the same directory share one backend call
/// - Names are validated before they reach the backend
/// - Every successful mutation is published as an [`FsEvent`]
#[derive(Clone)]
pub struct FsManager {
    backend: Arc<dyn FsBackend>,
    /// Map of path -> list of channels waiting for the result
    pending_dir_requests: PendingDirRequests,
    events: broadcast::Sender<FsEvent>,
}

impl fmt::Debug for FsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsManager")
            .field("backend", &"<dyn FsBackend>")
            .field("pending_dir_requests", &"<mutex>")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl FsManager {
    /// Create a new filesystem manager with the given backend
    pub fn new(backend: Arc<dyn FsBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            pending_dir_requests: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<FsEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: FsEvent) {
        tracing::trace!("fs event: {:?}", event);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// List directory contents with request deduplication
    ///
    /// If multiple requests for the same directory are made concurrently,
    /// only one filesystem operation will be performed and all requesters
    /// will receive the same result.
    pub async fn list_dir(&self, path: PathBuf) -> io::Result<Vec<FsEntry>> {
        let (rx, should_execute) = {
            let mut pending = self.pending_dir_requests.lock().await;

            let (tx, rx) = oneshot::channel();
            if let Some(senders) = pending.get_mut(&path) {
                senders.push(tx);
                (rx, false)
            } else {
                pending.insert(path.clone(), vec![tx]);
                (rx, true)
            }
        };

        if should_execute {
            let result = self.backend.read_dir(&path).await;

            let mut pending = self.pending_dir_requests.lock().await;
            if let Some(senders) = pending.remove(&path) {
                for sender in senders {
                    let _ = sender.send(
                        result
                            .as_ref()
                            .map(|v| v.clone())
                            .map_err(|e| io::Error::new(e.kind(), e.to_string())),
                    );
                }
            }

            result
        } else {
            rx.await
                .unwrap_or_else(|_| Err(io::Error::other("Request cancelled")))
        }
    }

    /// Fetch a single entry
    pub async fn stat(&self, path: &Path) -> io::Result<FsEntry> {
        self.backend.stat(path).await
    }

    /// Rename an entry within its directory
    pub async fn rename(&self, path: &Path, new_name: &str) -> io::Result<FsEntry> {
        validate_name(new_name)?;
        let entry = self.backend.rename(path, new_name).await?;
        self.publish(FsEvent::Renamed {
            from: path.to_path_buf(),
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Create an empty file inside `dir`
    pub async fn create_file(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        validate_name(name)?;
        let entry = self.backend.create_file(dir, name).await?;
        self.notify_created(dir, &entry.path);
        Ok(entry)
    }

    /// Create a directory inside `dir`
    pub async fn create_dir(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        validate_name(name)?;
        let entry = self.backend.create_dir(dir, name).await?;
        self.notify_created(dir, &entry.path);
        Ok(entry)
    }

    /// Remove an entry; subscribers see `Destroyed` only on success
    pub async fn remove(&self, path: &Path) -> io::Result<()> {
        self.backend.remove(path).await?;
        self.publish(FsEvent::Destroyed {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Announce an entry created outside this manager (uploads, watchers)
    pub fn notify_created(&self, parent: &Path, path: &Path) {
        self.publish(FsEvent::Created {
            parent: parent.to_path_buf(),
            path: path.to_path_buf(),
        });
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &Arc<dyn FsBackend> {
        &self.backend
    }
}
