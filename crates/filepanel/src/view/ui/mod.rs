//! Terminal rendering for the files panel

pub mod file_explorer;

pub use file_explorer::{buffer_to_lines, FileExplorerRenderer};
