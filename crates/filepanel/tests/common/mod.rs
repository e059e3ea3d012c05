// Common test utilities: recording fakes for the host services and a
// project fixture on disk.

#![allow(dead_code)]

use async_trait::async_trait;
use filepanel::services::content::ContentViewer;
use filepanel::services::context_menu::ContextMenuService;
use filepanel::services::dialogs::DialogService;
use filepanel::services::fs::{FsEntry, FsManager, LocalFsBackend, SlowFsBackend, SlowFsConfig};
use filepanel::services::registry::{ProjectRunner, ServiceRegistry};
use filepanel::services::upload::{UploadProgress, UploadRequest, UploadService};
use filepanel::view::file_tree::NodeId;
use filepanel::{FileTreePanel, PanelServices, SettingsStore};
use filepanel_core::TreeSettings;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

/// Dialogs answering from queues; an empty queue dismisses the dialog
#[derive(Default)]
pub struct RecordingDialogs {
    prompt_answers: Mutex<VecDeque<Option<String>>>,
    confirm_answers: Mutex<VecDeque<bool>>,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub confirms: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl RecordingDialogs {
    pub fn answer_prompt(&self, answer: Option<&str>) {
        self.prompt_answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answers.lock().unwrap().push_back(answer);
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DialogService for RecordingDialogs {
    async fn prompt(&self, message: &str, default_value: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((message.to_string(), default_value.to_string()));
        self.prompt_answers.lock().unwrap().pop_front().flatten()
    }

    async fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().unwrap().push(message.to_string());
        self.confirm_answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Upload transport that writes a fixed set of files into the destination
#[derive(Default)]
pub struct FakeUploads {
    /// Paths relative to the destination
    files: Vec<PathBuf>,
    fail: bool,
    pub requests: Mutex<Vec<UploadRequest>>,
}

impl FakeUploads {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadService for FakeUploads {
    async fn upload(
        &self,
        request: UploadRequest,
        progress: watch::Sender<UploadProgress>,
    ) -> io::Result<Vec<PathBuf>> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ));
        }

        let total = self.files.len() as u64;
        let mut uploaded = Vec::new();
        for (i, relative) in self.files.iter().enumerate() {
            let path = request.destination.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "uploaded")?;
            uploaded.push(path);
            let _ = progress.send(UploadProgress {
                transferred: i as u64 + 1,
                total: Some(total),
            });
        }
        Ok(uploaded)
    }
}

#[derive(Default)]
pub struct RecordingViewer {
    pub opened: Mutex<Vec<PathBuf>>,
    pub urls: Mutex<Vec<String>>,
}

impl RecordingViewer {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentViewer for RecordingViewer {
    async fn open(&self, entry: &FsEntry) -> io::Result<()> {
        self.opened.lock().unwrap().push(entry.path.clone());
        Ok(())
    }

    async fn open_url(&self, url: &str) -> io::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct FakeRunner {
    url: String,
    pub runs: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> Vec<PathBuf> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectRunner for FakeRunner {
    async fn run(&self, dir: &Path) -> io::Result<String> {
        self.runs.lock().unwrap().push(dir.to_path_buf());
        Ok(self.url.clone())
    }
}

/// Context-menu host tracking live anchors
#[derive(Default)]
pub struct RecordingContextMenu {
    pub attached: Mutex<HashMap<NodeId, PathBuf>>,
    pub detached: Mutex<Vec<NodeId>>,
}

impl RecordingContextMenu {
    pub fn attached_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.attached.lock().unwrap().values().cloned().collect();
        paths.sort();
        paths
    }

    pub fn detached(&self) -> Vec<NodeId> {
        self.detached.lock().unwrap().clone()
    }
}

impl ContextMenuService for RecordingContextMenu {
    fn attach(&self, anchor: NodeId, path: &Path) {
        self.attached
            .lock()
            .unwrap()
            .insert(anchor, path.to_path_buf());
    }

    fn detach(&self, anchor: NodeId) {
        self.attached.lock().unwrap().remove(&anchor);
        self.detached.lock().unwrap().push(anchor);
    }
}

/// All fakes wired into one set of panel services
pub struct Harness {
    pub dialogs: Arc<RecordingDialogs>,
    pub uploads: Arc<FakeUploads>,
    pub viewer: Arc<RecordingViewer>,
    pub context_menu: Arc<RecordingContextMenu>,
    pub registry: Arc<ServiceRegistry>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_uploads(FakeUploads::default())
    }

    pub fn with_uploads(uploads: FakeUploads) -> Self {
        Self {
            dialogs: Arc::new(RecordingDialogs::default()),
            uploads: Arc::new(uploads),
            viewer: Arc::new(RecordingViewer::default()),
            context_menu: Arc::new(RecordingContextMenu::default()),
            registry: Arc::new(ServiceRegistry::new()),
        }
    }

    pub fn services(&self) -> PanelServices {
        PanelServices::default()
            .with_dialogs(self.dialogs.clone())
            .with_uploads(self.uploads.clone())
            .with_viewer(self.viewer.clone())
            .with_context_menu(self.context_menu.clone())
            .with_registry(self.registry.clone())
    }
}

/// Project layout used across the panel tests:
///
/// ```text
/// .git/
/// dir1/
/// dir2/subdir/file3.txt
/// .env
/// file4.txt
/// ```
pub fn create_test_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::create_dir(root.join("dir1")).unwrap();
    fs::create_dir_all(root.join("dir2/subdir")).unwrap();
    fs::write(root.join("dir2/subdir/file3.txt"), "3").unwrap();
    fs::write(root.join(".env"), "KEY=1").unwrap();
    fs::write(root.join("file4.txt"), "4").unwrap();
    temp_dir
}

/// Open a panel on `root` over a metered local backend
pub async fn open_panel(
    root: &Path,
    config: SlowFsConfig,
    settings: SettingsStore,
    services: PanelServices,
) -> (FileTreePanel, Arc<SlowFsBackend>) {
    let backend = Arc::new(SlowFsBackend::new(Arc::new(LocalFsBackend::new()), config));
    let fs = FsManager::new(backend.clone());
    let panel = FileTreePanel::open(root.to_path_buf(), fs, settings, services)
        .await
        .unwrap();
    (panel, backend)
}

pub async fn open_default_panel(
    root: &Path,
    harness: &Harness,
) -> (FileTreePanel, Arc<SlowFsBackend>) {
    open_panel(
        root,
        SlowFsConfig::none(),
        SettingsStore::new(TreeSettings::default()),
        harness.services(),
    )
    .await
}

pub fn node_id(panel: &FileTreePanel, path: &Path) -> NodeId {
    panel
        .tree()
        .node_by_path(path)
        .map(|node| node.id)
        .unwrap_or_else(|| panic!("no node for {:?}", path))
}

/// Names of the visible rows, in display order
pub fn row_names(panel: &mut FileTreePanel) -> Vec<String> {
    panel.render().into_iter().map(|row| row.name).collect()
}
