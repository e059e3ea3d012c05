//! The files panel: a [`FileTree`] driven by a single event loop
//!
//! All tree mutation happens on the loop. Listings, stats, dialogs and
//! filesystem mutations run in spawned tasks and report back through
//! [`AsyncMessage`]s; filesystem notifications and settings changes arrive on
//! their own channels.

pub mod actions;
pub mod messages;

pub use actions::ActionOutcome;
pub use messages::AsyncMessage;

use crate::services::content::{ContentViewer, LoggingViewer};
use crate::services::context_menu::ContextMenuService;
use crate::services::dialogs::{DialogService, HeadlessDialogs};
use crate::services::fs::{FsEntry, FsEvent, FsManager};
use crate::services::registry::{ProjectRunner, ServiceRegistry};
use crate::services::upload::{UnsupportedUploads, UploadService};
use crate::settings::SettingsStore;
use crate::view::file_tree::{
    Activation, DirId, FileTree, ListRequest, NodeId, PendingIo, StatRequest, TreeRow,
};
use actions::ActionContext;
use filepanel_core::{MenuItem, NodeAction, PanelDescriptor, TreeSettings};
use rust_i18n::t;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, watch};

/// Host registration for the panel, with a title in the current locale
pub fn panel_descriptor() -> PanelDescriptor {
    PanelDescriptor::files(t!("panel.title"))
}

/// Host registration for the panel, with a title in `locale`
pub fn localized_panel_descriptor(locale: &str) -> PanelDescriptor {
    PanelDescriptor::files(t!("panel.title", locale = locale))
}

/// Host services the panel delegates to
#[derive(Clone)]
pub struct PanelServices {
    pub dialogs: Arc<dyn DialogService>,
    pub uploads: Arc<dyn UploadService>,
    pub viewer: Arc<dyn ContentViewer>,
    pub context_menu: Option<Arc<dyn ContextMenuService>>,
    pub registry: Arc<ServiceRegistry>,
}

impl Default for PanelServices {
    fn default() -> Self {
        Self {
            dialogs: Arc::new(HeadlessDialogs),
            uploads: Arc::new(UnsupportedUploads),
            viewer: Arc::new(LoggingViewer),
            context_menu: None,
            registry: Arc::new(ServiceRegistry::new()),
        }
    }
}

impl PanelServices {
    pub fn with_dialogs(mut self, dialogs: Arc<dyn DialogService>) -> Self {
        self.dialogs = dialogs;
        self
    }

    pub fn with_uploads(mut self, uploads: Arc<dyn UploadService>) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn with_viewer(mut self, viewer: Arc<dyn ContentViewer>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn with_context_menu(mut self, context_menu: Arc<dyn ContextMenuService>) -> Self {
        self.context_menu = Some(context_menu);
        self
    }

    pub fn with_registry(mut self, registry: Arc<ServiceRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

pub struct FileTreePanel {
    tree: FileTree,
    services: PanelServices,
    fs_events: broadcast::Receiver<FsEvent>,
    settings_rx: watch::Receiver<TreeSettings>,
    async_tx: mpsc::UnboundedSender<AsyncMessage>,
    async_rx: mpsc::UnboundedReceiver<AsyncMessage>,
    /// Spawned tasks whose completion message has not been handled yet
    in_flight: usize,
    status_message: Option<String>,
    /// Context-menu anchors handed to the host, by node
    anchors: HashMap<NodeId, PathBuf>,
}

impl FileTreePanel {
    pub fn new(tree: FileTree, services: PanelServices) -> Self {
        let fs_events = tree.fs().subscribe();
        let settings_rx = tree.settings().subscribe();
        let (async_tx, async_rx) = mpsc::unbounded_channel();

        let mut panel = Self {
            tree,
            services,
            fs_events,
            settings_rx,
            async_tx,
            async_rx,
            in_flight: 0,
            status_message: None,
            anchors: HashMap::new(),
        };
        panel.sync_anchors();
        panel
    }

    /// Open a panel on `root`, listing it first
    pub async fn open(
        root: PathBuf,
        fs: FsManager,
        settings: SettingsStore,
        services: PanelServices,
    ) -> io::Result<Self> {
        let tree = FileTree::open(root, fs, settings).await?;
        Ok(Self::new(tree, services))
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FileTree {
        &mut self.tree
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Number of spawned tasks not yet reported back
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Toolbar commands to show, empty when the toolbar is switched off
    pub fn toolbar(&self) -> Vec<String> {
        self.tree
            .settings()
            .current()
            .visible_toolbar()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Re-list the root
    pub fn refresh(&mut self) {
        self.refresh_directory(self.tree.root_id());
    }

    pub fn refresh_directory(&mut self, dir: DirId) {
        if let Some(request) = self.tree.begin_refresh(dir) {
            self.sync_anchors();
            self.spawn_listing(request);
        }
    }

    pub fn render(&mut self) -> Vec<TreeRow> {
        self.tree.render()
    }

    /// Click on a node
    pub fn activate(&mut self, node: NodeId) {
        match self.tree.activate(node) {
            Some(Activation::Expand(request)) => {
                if let Some(name) = self.tree.node(node).map(|n| n.name().to_string()) {
                    self.status_message = Some(t!("status.loading", name = name).to_string());
                }
                self.sync_anchors();
                self.spawn_listing(request);
            }
            Some(Activation::Toggled { displayed }) => {
                tracing::trace!("{} listing displayed: {}", node, displayed);
            }
            Some(Activation::Open(entry)) => {
                let viewer = self.services.viewer.clone();
                let dialogs = self.services.dialogs.clone();
                self.spawn(async move {
                    let result = viewer.open(&entry).await;
                    if let Err(e) = &result {
                        dialogs.alert(&e.to_string()).await;
                    }
                    AsyncMessage::Opened {
                        path: entry.path,
                        result,
                    }
                });
            }
            None => {}
        }
    }

    /// Items for the node's context menu, as of now
    pub fn context_menu(&self, node: NodeId) -> Vec<MenuItem> {
        let Some(node) = self.tree.node(node) else {
            return Vec::new();
        };
        let has_runner = self.services.registry.contains::<dyn ProjectRunner>();
        actions::build_menu(node, has_runner)
    }

    /// Run a context-menu action on a node
    ///
    /// Returns false if the action does not apply to the node.
    pub fn perform(&mut self, node: NodeId, action: NodeAction) -> bool {
        let Some(target) = self.tree.node(node) else {
            return false;
        };
        let entry = target.entry.clone();
        let is_dir = target.is_dir();
        let subtree = target.subtree;

        let needs_dir = !matches!(action, NodeAction::Rename | NodeAction::Delete);
        if needs_dir && !is_dir {
            return false;
        }

        let ctx = ActionContext {
            fs: self.tree.fs().clone(),
            services: self.services.clone(),
            messages: self.async_tx.clone(),
        };

        match action {
            NodeAction::Refresh => {
                if let Some(dir) = subtree {
                    self.status_message =
                        Some(t!("status.refreshing", name = &entry.name).to_string());
                    self.refresh_directory(dir);
                }
                return true;
            }
            NodeAction::RunAsProject => {
                let Some(runner) = self.services.registry.get::<dyn ProjectRunner>() else {
                    return false;
                };
                self.spawn_action(ctx, action, entry, move |ctx, entry| async move {
                    actions::run_project(&ctx, runner, &entry).await
                });
            }
            NodeAction::Rename => {
                self.spawn_action(ctx, action, entry, |ctx, entry| async move {
                    actions::rename(&ctx, &entry).await
                });
            }
            NodeAction::NewFile => {
                self.spawn_action(ctx, action, entry, |ctx, entry| async move {
                    actions::new_file(&ctx, &entry).await
                });
            }
            NodeAction::NewFolder => {
                self.spawn_action(ctx, action, entry, |ctx, entry| async move {
                    actions::new_folder(&ctx, &entry).await
                });
            }
            NodeAction::UploadFiles | NodeAction::UploadFolder => {
                let is_directory = action == NodeAction::UploadFolder;
                self.spawn_action(ctx, action, entry, move |ctx, entry| async move {
                    actions::upload(&ctx, &entry, is_directory).await
                });
            }
            NodeAction::Delete => {
                self.spawn_action(ctx, action, entry, |ctx, entry| async move {
                    actions::delete(&ctx, &entry).await
                });
            }
        }
        true
    }

    /// Wait for and process one message, filesystem event, or settings change
    pub async fn next_event(&mut self) {
        tokio::select! {
            Some(message) = self.async_rx.recv() => self.handle_message(message),
            event = self.fs_events.recv() => match event {
                Ok(event) => self.handle_fs_event(event),
                Err(RecvError::Lagged(missed)) => self.handle_lagged(missed),
                Err(RecvError::Closed) => {}
            },
            Ok(()) = self.settings_rx.changed() => {
                self.tree.on_settings_changed();
            }
        }
    }

    /// Process events until no spawned work is left
    pub async fn settle(&mut self) {
        loop {
            self.drain_ready();
            if self.in_flight == 0 {
                break;
            }
            match self.async_rx.recv().await {
                Some(message) => self.handle_message(message),
                None => break,
            }
        }
    }

    /// Process events until `shutdown` resolves
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.next_event() => {}
            }
        }
    }

    /// Handle everything that is already queued, without waiting
    fn drain_ready(&mut self) {
        loop {
            match self.fs_events.try_recv() {
                Ok(event) => self.handle_fs_event(event),
                Err(TryRecvError::Lagged(missed)) => self.handle_lagged(missed),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        while let Ok(message) = self.async_rx.try_recv() {
            self.handle_message(message);
        }
        if self.settings_rx.has_changed().unwrap_or(false) {
            self.settings_rx.mark_unchanged();
            self.tree.on_settings_changed();
        }
    }

    fn handle_message(&mut self, message: AsyncMessage) {
        if message.completes_work() {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        match message {
            AsyncMessage::Listing { request, result } => {
                let path = request.path.clone();
                match self.tree.finish_refresh(request, result) {
                    Ok(true) => self.status_message = None,
                    Ok(false) => {}
                    Err(e) => {
                        self.status_message = Some(
                            t!(
                                "status.list_failed",
                                path = path.display().to_string(),
                                error = e.to_string()
                            )
                            .to_string(),
                        );
                    }
                }
            }
            AsyncMessage::EntryStat { request, result } => {
                self.tree.finish_entry_created(request, result);
            }
            AsyncMessage::ActionFinished {
                action,
                path,
                result,
            } => match result {
                Ok(ActionOutcome::Completed) => {
                    tracing::debug!("{:?} on {:?} completed", action, path);
                }
                Ok(ActionOutcome::Cancelled) => {
                    self.status_message = Some(t!("status.cancelled").to_string());
                }
                Err(e) => {
                    self.status_message =
                        Some(t!("status.action_failed", error = format!("{:#}", e)).to_string());
                }
            },
            AsyncMessage::Opened { path, result } => {
                if let Err(e) = result {
                    tracing::warn!("Failed to open {:?}: {}", path, e);
                }
            }
            AsyncMessage::Status(text) => self.status_message = Some(text),
        }
        self.sync_anchors();
    }

    fn handle_fs_event(&mut self, event: FsEvent) {
        for work in self.tree.handle_fs_event(&event) {
            match work {
                PendingIo::Stat(request) => self.spawn_stat(request),
                PendingIo::List(request) => self.spawn_listing(request),
            }
        }
        self.sync_anchors();
    }

    fn handle_lagged(&mut self, missed: u64) {
        tracing::warn!("Missed {} filesystem events, re-listing root", missed);
        self.refresh();
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = AsyncMessage> + Send + 'static,
    {
        self.in_flight += 1;
        let sender = self.async_tx.clone();
        tokio::spawn(async move {
            let _ = sender.send(task.await);
        });
    }

    fn spawn_listing(&mut self, request: ListRequest) {
        let fs = self.tree.fs().clone();
        self.spawn(async move {
            let result = fs.list_dir(request.path.clone()).await;
            AsyncMessage::Listing { request, result }
        });
    }

    fn spawn_stat(&mut self, request: StatRequest) {
        let fs = self.tree.fs().clone();
        self.spawn(async move {
            let result = fs.stat(&request.path).await;
            AsyncMessage::EntryStat { request, result }
        });
    }

    /// Spawn an action chain; failures are alerted before the panel hears back
    fn spawn_action<F, Fut>(
        &mut self,
        ctx: ActionContext,
        action: NodeAction,
        entry: FsEntry,
        chain: F,
    ) where
        F: FnOnce(ActionContext, FsEntry) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<ActionOutcome>> + Send + 'static,
    {
        let path = entry.path.clone();
        let dialogs = ctx.services.dialogs.clone();
        self.spawn(async move {
            let result = chain(ctx, entry).await;
            if let Err(e) = &result {
                tracing::warn!("{:?} on {:?} failed: {:#}", action, path, e);
                dialogs.alert(&format!("{:#}", e)).await;
            }
            AsyncMessage::ActionFinished {
                action,
                path,
                result,
            }
        });
    }

    /// Attach menus for new nodes, detach them for released ones
    fn sync_anchors(&mut self) {
        let Some(menu) = self.services.context_menu.clone() else {
            return;
        };

        let stale: Vec<NodeId> = self
            .anchors
            .iter()
            .filter(|(id, path)| {
                self.tree
                    .node(**id)
                    .map_or(true, |node| node.path() != path.as_path())
            })
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            self.anchors.remove(&id);
            menu.detach(id);
        }

        let mut fresh: Vec<(NodeId, PathBuf)> = self
            .tree
            .nodes()
            .filter(|node| !self.anchors.contains_key(&node.id))
            .map(|node| (node.id, node.path().to_path_buf()))
            .collect();
        fresh.sort_by_key(|(id, _)| *id);
        for (id, path) in fresh {
            menu.attach(id, &path);
            self.anchors.insert(id, path);
        }
    }

    /// Path a context-menu anchor was attached with
    pub fn anchor_path(&self, node: NodeId) -> Option<&Path> {
        self.anchors.get(&node).map(PathBuf::as_path)
    }
}
