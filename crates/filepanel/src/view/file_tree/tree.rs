use super::directory::{DirId, DirectoryTree, ListingState, TreeRow};
use super::node::{NodeId, TreeNode};
use crate::services::fs::{FsEntry, FsEntryType, FsEvent, FsManager};
use crate::settings::SettingsStore;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// A listing in flight, handed out by [`FileTree::begin_refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub dir: DirId,
    pub generation: u64,
    pub path: PathBuf,
}

/// A created-entry stat in flight, handed out by [`FileTree::begin_entry_created`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRequest {
    pub dir: DirId,
    pub revision: u64,
    pub path: PathBuf,
}

/// Filesystem work a notification asks the caller to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingIo {
    /// Stat a created entry, then call [`FileTree::finish_entry_created`]
    Stat(StatRequest),
    /// A listing restarted at a new path; finish it with [`FileTree::finish_refresh`]
    List(ListRequest),
}

/// What activating a node asks the caller to do next
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// A child listing was built for the first time and must be fetched
    Expand(ListRequest),
    /// The existing child listing was shown or hidden
    Toggled { displayed: bool },
    /// A file was activated and should be opened
    Open(FsEntry),
}

/// File tree with lazy directory listings
///
/// The tree starts with just the root listing. A directory node gets its own
/// [`DirectoryTree`] the first time it is activated; later activations only
/// show or hide it. Every listing keeps the order the filesystem service
/// returned.
///
/// Async work is split into `begin_*` / `finish_*` pairs so a caller can run
/// the I/O anywhere and hand the result back later. Results that were
/// overtaken by a newer refresh are discarded:
/// - a listing applies only if no other refresh of that directory started
///   after it
/// - a created entry applies only if no refresh started or finished since
///   its stat was issued
#[derive(Debug)]
pub struct FileTree {
    root_path: PathBuf,
    root_id: DirId,
    nodes: HashMap<NodeId, TreeNode>,
    dirs: HashMap<DirId, DirectoryTree>,
    path_to_node: HashMap<PathBuf, NodeId>,
    dir_by_path: HashMap<PathBuf, DirId>,
    next_node_id: usize,
    next_dir_id: usize,
    fs: FsManager,
    settings: SettingsStore,
}

impl FileTree {
    /// Create a tree with an empty, unloaded root listing
    pub fn new(root_path: PathBuf, fs: FsManager, settings: SettingsStore) -> Self {
        let root_id = DirId(0);
        let entry = FsEntry::from_path(root_path.clone(), FsEntryType::Directory);

        let mut dirs = HashMap::new();
        dirs.insert(root_id, DirectoryTree::new(root_id, entry, None, 1));

        let mut dir_by_path = HashMap::new();
        dir_by_path.insert(root_path.clone(), root_id);

        Self {
            root_path,
            root_id,
            nodes: HashMap::new(),
            dirs,
            path_to_node: HashMap::new(),
            dir_by_path,
            next_node_id: 0,
            next_dir_id: 1,
            fs,
            settings,
        }
    }

    /// Create a tree and list its root
    ///
    /// # Errors
    ///
    /// Returns an error if the root path doesn't exist, isn't a directory,
    /// or cannot be listed.
    pub async fn open(
        root_path: PathBuf,
        fs: FsManager,
        settings: SettingsStore,
    ) -> io::Result<Self> {
        let entry = fs.stat(&root_path).await?;
        if !entry.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a directory: {:?}", root_path),
            ));
        }

        let mut tree = Self::new(root_path, fs, settings);
        if let Some(root) = tree.dirs.get_mut(&tree.root_id) {
            root.entry = entry;
        }
        tree.refresh(tree.root_id).await?;
        Ok(tree)
    }

    pub fn root_id(&self) -> DirId {
        self.root_id
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn fs(&self) -> &FsManager {
        &self.fs
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn directory(&self, id: DirId) -> Option<&DirectoryTree> {
        self.dirs.get(&id)
    }

    pub fn node_by_path(&self, path: &Path) -> Option<&TreeNode> {
        self.path_to_node
            .get(path)
            .and_then(|id| self.nodes.get(id))
    }

    /// Listing currently built for `path`, if any
    pub fn directory_by_path(&self, path: &Path) -> Option<&DirectoryTree> {
        self.dir_by_path
            .get(path)
            .and_then(|id| self.dirs.get(id))
    }

    pub fn children(&self, dir: DirId) -> &[NodeId] {
        self.dirs
            .get(&dir)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_names(&self, dir: DirId) -> Vec<String> {
        self.children(dir)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.entry.name.clone())
            .collect()
    }

    /// Every live node, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live listings, the root included
    pub fn directory_count(&self) -> usize {
        self.dirs.len()
    }

    /// Start a refresh: discard the current children and hand out the
    /// listing to fetch
    pub fn begin_refresh(&mut self, dir: DirId) -> Option<ListRequest> {
        let listing = self.dirs.get_mut(&dir)?;
        listing.generation += 1;
        listing.revision += 1;
        listing.state = ListingState::Loading;

        let request = ListRequest {
            dir,
            generation: listing.generation,
            path: listing.entry.path.clone(),
        };

        self.clear_children(dir);
        self.render_directory(dir);
        Some(request)
    }

    /// Apply the outcome of a listing started by [`begin_refresh`]
    ///
    /// Returns `Ok(false)` if the result was stale and dropped. A failed
    /// listing leaves the directory empty and is returned to the caller.
    ///
    /// [`begin_refresh`]: FileTree::begin_refresh
    pub fn finish_refresh(
        &mut self,
        request: ListRequest,
        result: io::Result<Vec<FsEntry>>,
    ) -> io::Result<bool> {
        let Some(listing) = self.dirs.get(&request.dir) else {
            tracing::debug!("discarding listing of released {:?}", request.path);
            return Ok(false);
        };
        if listing.generation != request.generation || listing.entry.path != request.path {
            tracing::debug!(
                "discarding stale listing of {:?} (generation {}, current {})",
                request.path,
                request.generation,
                listing.generation
            );
            return Ok(false);
        }
        let indentation = listing.indentation;

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list {:?}: {}", request.path, e);
                if let Some(listing) = self.dirs.get_mut(&request.dir) {
                    listing.state = ListingState::Error(e.to_string());
                }
                return Err(e);
            }
        };

        // Entries admitted while the listing was in flight do not survive it
        self.clear_children(request.dir);

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.path_to_node.contains_key(&entry.path) {
                tracing::debug!("skipping duplicate entry {:?}", entry.path);
                continue;
            }
            children.push(self.add_node(entry, request.dir, indentation));
        }

        if let Some(listing) = self.dirs.get_mut(&request.dir) {
            listing.children = children;
            listing.state = ListingState::Loaded;
            listing.revision += 1;
        }
        self.render_directory(request.dir);
        Ok(true)
    }

    /// Discard and re-list a directory
    pub async fn refresh(&mut self, dir: DirId) -> io::Result<()> {
        let request = self.begin_refresh(dir).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("Unknown directory {}", dir))
        })?;
        let result = self.fs.list_dir(request.path.clone()).await;
        self.finish_refresh(request, result).map(|_| ())
    }

    /// Start admitting an entry announced as created under `dir`
    ///
    /// Returns `None` if the directory has no settled listing or already
    /// shows the entry. A listing whose last refresh failed counts as settled
    /// with no children.
    pub fn begin_entry_created(&mut self, dir: DirId, path: &Path) -> Option<StatRequest> {
        let listing = self.dirs.get(&dir)?;
        if !listing.accepts_created() {
            tracing::trace!("ignoring created {:?}: listing {:?}", path, listing.state);
            return None;
        }
        if self.path_to_node.contains_key(path) {
            return None;
        }
        Some(StatRequest {
            dir,
            revision: listing.revision,
            path: path.to_path_buf(),
        })
    }

    /// Apply the stat of a created entry; returns the new node
    ///
    /// A failed stat (the entry vanished first) is dropped silently, as is a
    /// result overtaken by a refresh.
    pub fn finish_entry_created(
        &mut self,
        request: StatRequest,
        result: io::Result<FsEntry>,
    ) -> Option<NodeId> {
        let listing = self.dirs.get(&request.dir)?;
        if listing.revision != request.revision || !listing.accepts_created() {
            tracing::debug!("discarding created {:?}: listing was refreshed", request.path);
            return None;
        }
        let indentation = listing.indentation;

        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("created entry {:?} vanished: {}", request.path, e);
                return None;
            }
        };
        if self.path_to_node.contains_key(&entry.path) {
            return None;
        }

        let id = self.add_node(entry, request.dir, indentation);
        if let Some(listing) = self.dirs.get_mut(&request.dir) {
            listing.children.push(id);
        }
        self.render_directory(request.dir);
        Some(id)
    }

    pub async fn on_entry_created(&mut self, dir: DirId, path: &Path) -> Option<NodeId> {
        let request = self.begin_entry_created(dir, path)?;
        let result = self.fs.stat(&request.path).await;
        self.finish_entry_created(request, result)
    }

    /// Click on a node
    pub fn activate(&mut self, id: NodeId) -> Option<Activation> {
        let node = self.nodes.get(&id)?;
        if !node.is_dir() {
            return Some(Activation::Open(node.entry.clone()));
        }
        let parent = node.parent;
        let subtree = node.subtree;

        let activation = match subtree {
            None => {
                let entry = node.entry.clone();
                let indentation = node.indentation + 1;
                let dir = self.add_directory(entry, Some(id), indentation);
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.subtree = Some(dir);
                    node.expanded = true;
                }
                Activation::Expand(self.begin_refresh(dir)?)
            }
            Some(dir) => {
                let listing = self.dirs.get_mut(&dir)?;
                listing.displayed = !listing.displayed;
                let displayed = listing.displayed;
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.expanded = displayed;
                }
                Activation::Toggled { displayed }
            }
        };

        self.render_directory(parent);
        Some(activation)
    }

    /// Make sure a directory node's listing exists and is displayed
    pub async fn expand(&mut self, id: NodeId) -> io::Result<()> {
        let node = self
            .nodes
            .get(&id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Node not found"))?;

        if !node.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot expand a file node",
            ));
        }
        if node.expanded {
            return Ok(());
        }

        match self.activate(id) {
            Some(Activation::Expand(request)) => {
                let result = self.fs.list_dir(request.path.clone()).await;
                self.finish_refresh(request, result).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// Expand every directory along `path` and return its node
    ///
    /// Returns `None` if the path is not under the root, does not exist, or
    /// an intermediate directory cannot be listed.
    pub async fn expand_to_path(&mut self, path: &Path) -> Option<NodeId> {
        let relative = path.strip_prefix(&self.root_path).ok()?.to_path_buf();

        if !self.dirs.get(&self.root_id)?.is_loaded() {
            if let Err(e) = self.refresh(self.root_id).await {
                tracing::warn!("Failed to list root during path traversal: {}", e);
                return None;
            }
        }

        let mut current_dir = self.root_id;
        let mut current_node: Option<NodeId> = None;

        for component in relative.components() {
            let name = component.as_os_str().to_str()?;

            if let Some(node_id) = current_node {
                if let Err(e) = self.expand(node_id).await {
                    tracing::warn!("Failed to expand node during path traversal: {}", e);
                    return None;
                }
                current_dir = self.nodes.get(&node_id)?.subtree?;
            }

            let child = self
                .children(current_dir)
                .iter()
                .copied()
                .find(|id| self.nodes.get(id).is_some_and(|n| n.entry.name == name));

            match child {
                Some(id) => current_node = Some(id),
                None => {
                    tracing::warn!("Component '{}' not found in tree", name);
                    return None;
                }
            }
        }

        current_node
    }

    /// Drop the node at `path` and everything below it
    pub fn remove_entry(&mut self, path: &Path) -> bool {
        let Some(&id) = self.path_to_node.get(path) else {
            return false;
        };
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            return false;
        };

        if let Some(listing) = self.dirs.get_mut(&parent) {
            listing.children.retain(|child| *child != id);
        }
        self.release_node(id);
        self.render_directory(parent);
        true
    }

    /// Update the node at `from` in place; its child listing follows it
    ///
    /// Returns `None` if no node is shown at `from`. Listings that were in
    /// flight below the renamed node are restarted at their new paths and
    /// returned; the old requests will be discarded as stale.
    pub fn rename_entry(&mut self, from: &Path, entry: FsEntry) -> Option<Vec<ListRequest>> {
        let &id = self.path_to_node.get(from)?;
        if entry.path != from {
            // Whatever was shown at the target path has been replaced
            self.remove_entry(&entry.path);
        }

        let node = self.nodes.get_mut(&id)?;
        let parent = node.parent;
        let subtree = node.subtree;
        let new_path = entry.path.clone();
        node.entry = entry;

        self.path_to_node.remove(from);
        self.path_to_node.insert(new_path.clone(), id);
        let mut restarted = Vec::new();
        if let Some(dir) = subtree {
            self.repath_directory(dir, &new_path, &mut restarted);
        }

        self.render_directory(parent);
        Some(restarted)
    }

    /// Apply a filesystem notification
    ///
    /// Created entries need a stat, and a rename may restart listings that
    /// were in flight; the caller runs the returned work.
    pub fn handle_fs_event(&mut self, event: &FsEvent) -> Vec<PendingIo> {
        tracing::trace!("tree event {:?}", event);
        match event {
            FsEvent::Created { parent, path } => self
                .dir_by_path
                .get(parent)
                .copied()
                .and_then(|dir| self.begin_entry_created(dir, path))
                .map(PendingIo::Stat)
                .into_iter()
                .collect(),
            FsEvent::Destroyed { path } => {
                self.remove_entry(path);
                Vec::new()
            }
            FsEvent::Renamed { from, entry } => self
                .rename_entry(from, entry.clone())
                .unwrap_or_default()
                .into_iter()
                .map(PendingIo::List)
                .collect(),
        }
    }

    /// Re-render every listing and return the visible rows
    pub fn render(&mut self) -> Vec<TreeRow> {
        let mut dirs: Vec<DirId> = self.dirs.keys().copied().collect();
        dirs.sort();
        for dir in dirs {
            self.render_directory(dir);
        }
        self.visible_rows()
    }

    /// Rebuild the rows of one listing from its children
    pub fn render_directory(&mut self, dir: DirId) -> &[TreeRow] {
        let Some(listing) = self.dirs.get(&dir) else {
            return &[];
        };
        let children = listing.children.clone();

        let mut rows = Vec::with_capacity(children.len());
        for id in children {
            if let Some(node) = self.nodes.get_mut(&id) {
                if node.render() {
                    rows.push(TreeRow::from_node(node));
                }
            }
        }

        match self.dirs.get_mut(&dir) {
            Some(listing) => {
                listing.rows = rows;
                &listing.rows
            }
            None => &[],
        }
    }

    /// Re-render the listings whose nodes saw a settings change
    pub fn on_settings_changed(&mut self) -> bool {
        let mut dirty = HashSet::new();
        for node in self.nodes.values_mut() {
            if node.settings_changed() {
                dirty.insert(node.parent);
            }
        }

        let changed = !dirty.is_empty();
        for dir in dirty {
            self.render_directory(dir);
        }
        changed
    }

    /// Rows as last rendered, nested listings spliced in below their owner
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.collect_rows(self.root_id, &mut rows);
        rows
    }

    fn collect_rows(&self, dir: DirId, out: &mut Vec<TreeRow>) {
        let Some(listing) = self.dirs.get(&dir) else {
            return;
        };
        for row in &listing.rows {
            out.push(row.clone());
            if let Some(subtree) = row.subtree {
                if self.dirs.get(&subtree).is_some_and(|d| d.displayed) {
                    self.collect_rows(subtree, out);
                }
            }
        }
    }

    fn add_node(&mut self, entry: FsEntry, parent: DirId, indentation: usize) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        self.path_to_node.insert(entry.path.clone(), id);
        let node = TreeNode::new(id, entry, parent, indentation, self.settings.subscribe());
        self.nodes.insert(id, node);
        id
    }

    fn add_directory(
        &mut self,
        entry: FsEntry,
        owner: Option<NodeId>,
        indentation: usize,
    ) -> DirId {
        let id = DirId(self.next_dir_id);
        self.next_dir_id += 1;

        self.dir_by_path.insert(entry.path.clone(), id);
        self.dirs
            .insert(id, DirectoryTree::new(id, entry, owner, indentation));
        id
    }

    fn clear_children(&mut self, dir: DirId) {
        let children = match self.dirs.get_mut(&dir) {
            Some(listing) => std::mem::take(&mut listing.children),
            None => return,
        };
        for child in children {
            self.release_node(child);
        }
    }

    /// Remove a node and its child listing, recursively
    fn release_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        if self.path_to_node.get(&node.entry.path) == Some(&id) {
            self.path_to_node.remove(&node.entry.path);
        }
        if let Some(dir) = node.subtree {
            self.release_directory(dir);
        }
    }

    fn release_directory(&mut self, id: DirId) {
        let Some(listing) = self.dirs.remove(&id) else {
            return;
        };
        if self.dir_by_path.get(&listing.entry.path) == Some(&id) {
            self.dir_by_path.remove(&listing.entry.path);
        }
        for child in listing.children {
            self.release_node(child);
        }
    }

    fn repath_directory(
        &mut self,
        dir: DirId,
        new_path: &Path,
        restarted: &mut Vec<ListRequest>,
    ) {
        let children = {
            let Some(listing) = self.dirs.get_mut(&dir) else {
                return;
            };
            let old = std::mem::replace(&mut listing.entry.path, new_path.to_path_buf());
            if let Some(name) = new_path.file_name() {
                listing.entry.name = name.to_string_lossy().into_owned();
            }
            if listing.is_loading() {
                // The listing in flight names the old path and will be dropped
                listing.generation += 1;
                listing.revision += 1;
                restarted.push(ListRequest {
                    dir,
                    generation: listing.generation,
                    path: new_path.to_path_buf(),
                });
            }
            if self.dir_by_path.get(&old) == Some(&dir) {
                self.dir_by_path.remove(&old);
            }
            self.dir_by_path.insert(new_path.to_path_buf(), dir);
            listing.children.clone()
        };

        for child in children {
            let Some(node) = self.nodes.get_mut(&child) else {
                continue;
            };
            let child_path = new_path.join(&node.entry.name);
            let old = std::mem::replace(&mut node.entry.path, child_path.clone());
            let subtree = node.subtree;

            if self.path_to_node.get(&old) == Some(&child) {
                self.path_to_node.remove(&old);
            }
            self.path_to_node.insert(child_path.clone(), child);
            if let Some(subtree) = subtree {
                self.repath_directory(subtree, &child_path, restarted);
            }
        }

        self.render_directory(dir);
    }
}
