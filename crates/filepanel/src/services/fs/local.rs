use super::backend::{FsBackend, FsEntry, FsEntryType, FsMetadata};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::io;
use std::path::Path;

/// Local disk backend built on `tokio::fs`
///
/// Listings come back directories first, then by case-insensitive name. The
/// tree itself never reorders what a backend returns.
#[derive(Debug, Default, Clone)]
pub struct LocalFsBackend;

impl LocalFsBackend {
    pub fn new() -> Self {
        Self
    }
}

fn sort_entries(entries: &mut [FsEntry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

fn metadata_of(meta: &std::fs::Metadata) -> FsMetadata {
    let mut out = FsMetadata::default().with_readonly(meta.permissions().readonly());
    if meta.is_file() {
        out = out.with_size(meta.len());
    }
    if let Ok(modified) = meta.modified() {
        out = out.with_modified(modified);
    }
    out
}

async fn entry_type_of(path: &Path, file_type: std::fs::FileType) -> FsEntryType {
    if file_type.is_dir() {
        FsEntryType::Directory
    } else if file_type.is_symlink() {
        // Links to directories behave like directories in the tree
        match tokio::fs::metadata(path).await {
            Ok(target) if target.is_dir() => FsEntryType::Directory,
            _ => FsEntryType::Symlink,
        }
    } else {
        FsEntryType::File
    }
}

#[async_trait]
impl FsBackend for LocalFsBackend {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(item) = dir.next_entry().await? {
            let item_path = item.path();
            // Entries can vanish between readdir and the type lookup
            let Ok(file_type) = item.file_type().await else {
                continue;
            };
            let entry_type = entry_type_of(&item_path, file_type).await;
            let name = item.file_name().to_string_lossy().into_owned();
            entries.push(FsEntry::new(item_path, name, entry_type));
        }

        sort_entries(&mut entries);
        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<FsEntry> {
        let link_meta = tokio::fs::symlink_metadata(path).await?;
        let entry_type = entry_type_of(path, link_meta.file_type()).await;
        let meta = match entry_type {
            FsEntryType::Symlink => link_meta,
            _ => tokio::fs::metadata(path).await?,
        };

        Ok(FsEntry::from_path(path.to_path_buf(), entry_type).with_metadata(metadata_of(&meta)))
    }

    async fn rename(&self, path: &Path, new_name: &str) -> io::Result<FsEntry> {
        let parent = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Cannot rename a root path")
        })?;
        let new_path = parent.join(new_name);

        if tokio::fs::try_exists(&new_path).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path already exists: {:?}", new_path),
            ));
        }

        tokio::fs::rename(path, &new_path).await?;
        self.stat(&new_path).await
    }

    async fn create_file(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        let path = dir.join(name);
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        self.stat(&path).await
    }

    async fn create_dir(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        let path = dir.join(name);
        tokio::fs::create_dir(&path).await?;
        self.stat(&path).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = tokio::fs::symlink_metadata(path).await?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_dir_orders_directories_first() {
        let temp_dir = TempDir::new().unwrap();
        let temp_path = temp_dir.path();

        std_fs::write(temp_path.join("b.txt"), "b").unwrap();
        std_fs::write(temp_path.join("A.txt"), "a").unwrap();
        std_fs::create_dir(temp_path.join("zdir")).unwrap();
        std_fs::create_dir(temp_path.join("adir")).unwrap();

        let entries = LocalFsBackend::new().read_dir(temp_path).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["adir", "zdir", "A.txt", "b.txt"]);
        assert!(entries[0].is_dir());
        assert!(entries[2].is_file());
    }

    #[tokio::test]
    async fn test_stat_reports_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        std_fs::write(&file_path, "test content").unwrap();

        let entry = LocalFsBackend::new().stat(&file_path).await.unwrap();
        assert_eq!(entry.name, "test.txt");
        assert_eq!(entry.entry_type, FsEntryType::File);
        assert_eq!(entry.metadata.unwrap().size, Some(12));
    }

    #[tokio::test]
    async fn test_stat_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = LocalFsBackend::new()
            .stat(&temp_dir.path().join("nope"))
            .await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_rename_remove() {
        let temp_dir = TempDir::new().unwrap();
        let temp_path = temp_dir.path();
        let backend = LocalFsBackend::new();

        let file = backend.create_file(temp_path, "new.txt").await.unwrap();
        assert!(file.is_file());
        assert!(temp_path.join("new.txt").exists());

        let err = backend.create_file(temp_path, "new.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let dir = backend.create_dir(temp_path, "sub").await.unwrap();
        assert!(dir.is_dir());

        let renamed = backend.rename(&file.path, "renamed.txt").await.unwrap();
        assert_eq!(renamed.name, "renamed.txt");
        assert!(!temp_path.join("new.txt").exists());

        let err = backend.rename(&renamed.path, "sub").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        std_fs::write(temp_path.join("sub/inner.txt"), "x").unwrap();
        backend.remove(&dir.path).await.unwrap();
        backend.remove(&renamed.path).await.unwrap();
        assert!(backend.read_dir(temp_path).await.unwrap().is_empty());
    }
}
