use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Endpoint the host's upload transport posts to
pub const UPLOAD_URL: &str = "/rpc/fs/upload";

/// One upload of files, or of a whole folder, into `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub target_url: String,
    pub destination: PathBuf,
    pub is_directory: bool,
}

impl UploadRequest {
    pub fn files(destination: impl Into<PathBuf>) -> Self {
        Self {
            target_url: UPLOAD_URL.to_string(),
            destination: destination.into(),
            is_directory: false,
        }
    }

    pub fn folder(destination: impl Into<PathBuf>) -> Self {
        Self {
            is_directory: true,
            ..Self::files(destination)
        }
    }
}

/// Bytes transferred so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub transferred: u64,
    pub total: Option<u64>,
}

impl UploadProgress {
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(0) => Some(100),
            Some(total) => Some((self.transferred.min(total) * 100 / total) as u8),
            None => None,
        }
    }
}

/// Upload transport provided by the host
#[async_trait]
pub trait UploadService: Send + Sync {
    /// Run the upload, publishing progress on `progress`; returns the paths
    /// that now exist on the server
    async fn upload(
        &self,
        request: UploadRequest,
        progress: watch::Sender<UploadProgress>,
    ) -> io::Result<Vec<PathBuf>>;
}

/// Upload service for hosts without an upload transport
#[derive(Debug, Default, Clone)]
pub struct UnsupportedUploads;

#[async_trait]
impl UploadService for UnsupportedUploads {
    async fn upload(
        &self,
        _request: UploadRequest,
        _progress: watch::Sender<UploadProgress>,
    ) -> io::Result<Vec<PathBuf>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Uploads are not available",
        ))
    }
}

/// Direct children of `destination` touched by an upload, in first-seen order
///
/// A folder upload reports nested paths; only the top-level entry is new
/// from the point of view of the destination listing.
pub fn top_level_entries(destination: &Path, uploaded: &[PathBuf]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for path in uploaded {
        let Ok(relative) = path.strip_prefix(destination) else {
            continue;
        };
        let Some(first) = relative.components().next() else {
            continue;
        };
        let child = destination.join(first.as_os_str());
        if !out.contains(&child) {
            out.push(child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests() {
        let files = UploadRequest::files("/proj/src");
        assert_eq!(files.target_url, "/rpc/fs/upload");
        assert!(!files.is_directory);

        let folder = UploadRequest::folder("/proj/src");
        assert!(folder.is_directory);
        assert_eq!(folder.destination, PathBuf::from("/proj/src"));
    }

    #[test]
    fn test_progress_percent() {
        let p = UploadProgress {
            transferred: 50,
            total: Some(200),
        };
        assert_eq!(p.percent(), Some(25));
        assert_eq!(UploadProgress::default().percent(), None);
        assert_eq!(
            UploadProgress {
                transferred: 0,
                total: Some(0)
            }
            .percent(),
            Some(100)
        );
    }

    #[test]
    fn test_top_level_entries() {
        let dest = Path::new("/proj");
        let uploaded = vec![
            PathBuf::from("/proj/assets/a.png"),
            PathBuf::from("/proj/assets/b.png"),
            PathBuf::from("/proj/readme.md"),
            PathBuf::from("/elsewhere/x"),
        ];
        assert_eq!(
            top_level_entries(dest, &uploaded),
            vec![PathBuf::from("/proj/assets"), PathBuf::from("/proj/readme.md")]
        );
    }

    #[tokio::test]
    async fn test_unsupported_uploads_fail() {
        let (tx, _rx) = watch::channel(UploadProgress::default());
        let err = UnsupportedUploads
            .upload(UploadRequest::files("/proj"), tx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
