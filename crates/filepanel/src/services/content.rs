use crate::services::fs::FsEntry;
use async_trait::async_trait;
use std::io;

/// Opens files and URLs outside the tree (editor tabs, preview, browser)
#[async_trait]
pub trait ContentViewer: Send + Sync {
    /// Open a file entry
    async fn open(&self, entry: &FsEntry) -> io::Result<()>;

    /// Open a URL, e.g. the address a project runner returned
    async fn open_url(&self, url: &str) -> io::Result<()>;
}

/// Viewer that only records what would be opened in the log
#[derive(Debug, Default, Clone)]
pub struct LoggingViewer;

#[async_trait]
impl ContentViewer for LoggingViewer {
    async fn open(&self, entry: &FsEntry) -> io::Result<()> {
        tracing::info!("open {:?}", entry.path);
        Ok(())
    }

    async fn open_url(&self, url: &str) -> io::Result<()> {
        tracing::info!("open url {}", url);
        Ok(())
    }
}
