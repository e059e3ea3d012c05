pub mod file_tree;
pub mod ui;
