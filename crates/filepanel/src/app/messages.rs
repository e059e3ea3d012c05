use super::actions::ActionOutcome;
use crate::services::fs::FsEntry;
use crate::view::file_tree::{ListRequest, StatRequest};
use filepanel_core::NodeAction;
use std::io;
use std::path::PathBuf;

/// Messages sent from spawned tasks back to the panel loop
#[derive(Debug)]
pub enum AsyncMessage {
    /// A directory listing finished
    Listing {
        request: ListRequest,
        result: io::Result<Vec<FsEntry>>,
    },
    /// The stat behind a created-entry notification finished
    EntryStat {
        request: StatRequest,
        result: io::Result<FsEntry>,
    },
    /// A context-menu action chain finished (alerts already shown)
    ActionFinished {
        action: NodeAction,
        path: PathBuf,
        result: anyhow::Result<ActionOutcome>,
    },
    /// A file was handed to the content viewer
    Opened {
        path: PathBuf,
        result: io::Result<()>,
    },
    /// Progress text for the status line
    Status(String),
}

impl AsyncMessage {
    /// Whether this message closes a unit of work started by the panel
    pub fn completes_work(&self) -> bool {
        !matches!(self, AsyncMessage::Status(_))
    }
}
