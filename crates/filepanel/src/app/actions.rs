//! Context-menu actions
//!
//! Each action is an async chain of dialog, filesystem call and (for
//! uploads and projects) a host service. Dismissed dialogs end the chain with
//! [`ActionOutcome::Cancelled`]; the tree itself is only updated later, by the
//! filesystem notifications a successful call publishes.

use super::messages::AsyncMessage;
use super::PanelServices;
use crate::services::fs::{FsEntry, FsManager};
use crate::services::registry::ProjectRunner;
use crate::services::upload::{top_level_entries, UploadProgress, UploadRequest};
use crate::view::file_tree::TreeNode;
use anyhow::{Context, Result as AnyhowResult};
use filepanel_core::{MenuItem, NodeAction};
use rust_i18n::t;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// How an action chain ended, short of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// A dialog was dismissed or answered with nothing to do
    Cancelled,
}

/// Everything an action task needs, detached from the panel
#[derive(Clone)]
pub(crate) struct ActionContext {
    pub fs: FsManager,
    pub services: PanelServices,
    pub messages: mpsc::UnboundedSender<AsyncMessage>,
}

/// Build the context menu for a node
pub fn build_menu(node: &TreeNode, has_runner: bool) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::action(t!("menu.rename"), NodeAction::Rename)];

    if !node.is_dir() {
        items.push(MenuItem::action(t!("menu.delete_file"), NodeAction::Delete));
        return items;
    }

    items.extend([
        MenuItem::Divider,
        MenuItem::action(t!("menu.new_file"), NodeAction::NewFile),
        MenuItem::action(t!("menu.new_folder"), NodeAction::NewFolder),
        MenuItem::Divider,
        MenuItem::submenu(
            t!("menu.upload"),
            vec![
                MenuItem::action(t!("menu.upload_files"), NodeAction::UploadFiles),
                MenuItem::action(t!("menu.upload_folder"), NodeAction::UploadFolder),
            ],
        ),
        MenuItem::Divider,
        MenuItem::action(t!("menu.refresh"), NodeAction::Refresh),
        MenuItem::Divider,
        MenuItem::action(t!("menu.delete_folder"), NodeAction::Delete),
    ]);

    if has_runner {
        items.extend([
            MenuItem::Divider,
            MenuItem::action(t!("menu.run_as_project"), NodeAction::RunAsProject),
        ]);
    }
    items
}

/// The answer to a name prompt, kept verbatim; blank or unchanged answers cancel
fn accepted_name(answer: Option<String>, current: Option<&str>) -> Option<String> {
    let name = answer?;
    if name.trim().is_empty() || Some(name.as_str()) == current {
        return None;
    }
    Some(name)
}

pub(crate) async fn rename(ctx: &ActionContext, entry: &FsEntry) -> AnyhowResult<ActionOutcome> {
    let answer = ctx
        .services
        .dialogs
        .prompt(&t!("prompt.rename"), &entry.name)
        .await;
    let Some(name) = accepted_name(answer, Some(&entry.name)) else {
        return Ok(ActionOutcome::Cancelled);
    };

    ctx.fs
        .rename(&entry.path, &name)
        .await
        .with_context(|| t!("error.rename", name = &entry.name).to_string())?;
    Ok(ActionOutcome::Completed)
}

pub(crate) async fn new_file(ctx: &ActionContext, dir: &FsEntry) -> AnyhowResult<ActionOutcome> {
    let answer = ctx
        .services
        .dialogs
        .prompt(&t!("prompt.new_file"), "untitled")
        .await;
    let Some(name) = accepted_name(answer, None) else {
        return Ok(ActionOutcome::Cancelled);
    };

    ctx.fs
        .create_file(&dir.path, &name)
        .await
        .with_context(|| t!("error.create_file", name = &name).to_string())?;
    Ok(ActionOutcome::Completed)
}

pub(crate) async fn new_folder(ctx: &ActionContext, dir: &FsEntry) -> AnyhowResult<ActionOutcome> {
    let answer = ctx
        .services
        .dialogs
        .prompt(&t!("prompt.new_folder"), "untitled")
        .await;
    let Some(name) = accepted_name(answer, None) else {
        return Ok(ActionOutcome::Cancelled);
    };

    ctx.fs
        .create_dir(&dir.path, &name)
        .await
        .with_context(|| t!("error.create_folder", name = &name).to_string())?;
    Ok(ActionOutcome::Completed)
}

pub(crate) async fn delete(ctx: &ActionContext, entry: &FsEntry) -> AnyhowResult<ActionOutcome> {
    let question = if entry.is_dir() {
        t!("confirm.delete_folder")
    } else {
        t!("confirm.delete_file")
    };
    if !ctx.services.dialogs.confirm(&question).await {
        return Ok(ActionOutcome::Cancelled);
    }

    ctx.fs
        .remove(&entry.path)
        .await
        .with_context(|| t!("error.delete", name = &entry.name).to_string())?;
    Ok(ActionOutcome::Completed)
}

/// Upload into `dir`, reporting progress on the status line
pub(crate) async fn upload(
    ctx: &ActionContext,
    dir: &FsEntry,
    is_directory: bool,
) -> AnyhowResult<ActionOutcome> {
    let (request, prefix) = if is_directory {
        (UploadRequest::folder(&dir.path), t!("status.uploading_folder"))
    } else {
        (UploadRequest::files(&dir.path), t!("status.uploading_files"))
    };

    let (progress_tx, mut progress_rx) = watch::channel(UploadProgress::default());
    let transfer = ctx.services.uploads.upload(request, progress_tx);
    let report = async {
        while progress_rx.changed().await.is_ok() {
            let progress = *progress_rx.borrow_and_update();
            let text = match progress.percent() {
                Some(percent) => format!("{}: {}%", prefix, percent),
                None => format!("{}...", prefix),
            };
            let _ = ctx.messages.send(AsyncMessage::Status(text));
        }
    };
    let (result, ()) = tokio::join!(transfer, report);

    let uploaded = result.with_context(|| t!("error.upload").to_string())?;
    for path in top_level_entries(&dir.path, &uploaded) {
        ctx.fs.notify_created(&dir.path, &path);
    }
    Ok(ActionOutcome::Completed)
}

pub(crate) async fn run_project(
    ctx: &ActionContext,
    runner: Arc<dyn ProjectRunner>,
    dir: &FsEntry,
) -> AnyhowResult<ActionOutcome> {
    let url = runner
        .run(&dir.path)
        .await
        .with_context(|| t!("error.run_project", name = &dir.name).to_string())?;
    ctx.services.viewer.open_url(&url).await?;
    Ok(ActionOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fs::FsEntryType;
    use crate::settings::SettingsStore;
    use crate::view::file_tree::{DirId, NodeId};
    use filepanel_core::menu::{actions, find_action};
    use std::path::PathBuf;

    fn node(path: &str, entry_type: FsEntryType, store: &SettingsStore) -> TreeNode {
        TreeNode::new(
            NodeId(1),
            FsEntry::from_path(PathBuf::from(path), entry_type),
            DirId(0),
            1,
            store.subscribe(),
        )
    }

    #[test]
    fn test_directory_menu_shape() {
        let store = SettingsStore::default();
        let items = build_menu(&node("/proj/src", FsEntryType::Directory, &store), false);

        let labels: Vec<_> = items.iter().map(|i| i.label().unwrap_or("-")).collect();
        assert_eq!(
            labels,
            vec![
                "Rename...",
                "-",
                "New File",
                "New Folder",
                "-",
                "Upload",
                "-",
                "Refresh List",
                "-",
                "Delete Folder"
            ]
        );
        assert_eq!(find_action(&items, "Folder"), Some(NodeAction::UploadFolder));
        assert!(!actions(&items).contains(&NodeAction::RunAsProject));
    }

    #[test]
    fn test_run_as_project_needs_runner() {
        let store = SettingsStore::default();
        let items = build_menu(&node("/proj/src", FsEntryType::Directory, &store), true);

        let n = items.len();
        assert!(items[n - 2].is_divider());
        assert_eq!(items[n - 1].label(), Some("Run As Project"));
    }

    #[test]
    fn test_file_menu_shape() {
        let store = SettingsStore::default();
        let items = build_menu(&node("/proj/a.rs", FsEntryType::File, &store), true);
        assert_eq!(
            actions(&items),
            vec![NodeAction::Rename, NodeAction::Delete]
        );
        assert_eq!(items[1].label(), Some("Delete File"));
    }

    #[test]
    fn test_accepted_name() {
        assert_eq!(accepted_name(None, None), None);
        assert_eq!(accepted_name(Some("  ".into()), None), None);
        assert_eq!(accepted_name(Some("a.rs".into()), Some("a.rs")), None);
        assert_eq!(
            accepted_name(Some("b.rs".into()), Some("a.rs")),
            Some("b.rs".to_string())
        );
    }

    #[test]
    fn test_accepted_name_keeps_surrounding_spaces() {
        assert_eq!(
            accepted_name(Some(" b.rs ".into()), Some("a.rs")),
            Some(" b.rs ".to_string())
        );
        // Only an exact match with the current name is unchanged
        assert_eq!(
            accepted_name(Some("a.rs ".into()), Some("a.rs")),
            Some("a.rs ".to_string())
        );
    }
}
