//! Settings for the files tree panel
//!
//! Mirrors the `tree` settings object hosts persist for the panel. Keys are
//! camelCase on the wire (`showHidden`, `showDotGit`, ...) so settings files
//! written by other hosts load unchanged.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_toolbar() -> Vec<ToolbarCommand> {
    vec![
        ToolbarCommand::new("terminal.open"),
        ToolbarCommand::new("content.open"),
        ToolbarCommand::new("project.run"),
    ]
}

/// Files Tree
///
/// Visibility and toolbar options for the files tree panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "Files Tree")]
pub struct TreeSettings {
    /// Commands in the toolbar
    #[serde(default = "default_toolbar")]
    pub toolbar: Vec<ToolbarCommand>,

    /// Show toolbar
    #[serde(default = "default_true")]
    pub show_toolbar: bool,

    /// Show hidden files
    #[serde(default = "default_true")]
    pub show_hidden: bool,

    /// Show .git folder
    #[serde(default = "default_false")]
    pub show_dot_git: bool,
}

/// A single toolbar entry, naming a host command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolbarCommand {
    pub command: String,
}

impl ToolbarCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            toolbar: default_toolbar(),
            show_toolbar: true,
            show_hidden: true,
            show_dot_git: false,
        }
    }
}

impl TreeSettings {
    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let settings: TreeSettings =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.toolbar {
            if entry.command.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "toolbar command cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Toolbar commands to display, honoring `showToolbar`
    pub fn visible_toolbar(&self) -> Vec<&str> {
        if !self.show_toolbar {
            return Vec::new();
        }
        self.toolbar.iter().map(|c| c.command.as_str()).collect()
    }

    /// JSON Schema describing the settings object
    pub fn json_schema() -> Result<serde_json::Value, ConfigError> {
        serde_json::to_value(schemars::schema_for!(TreeSettings))
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TreeSettings::default();
        assert!(settings.show_toolbar);
        assert!(settings.show_hidden);
        assert!(!settings.show_dot_git);

        let commands: Vec<_> = settings.toolbar.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, vec!["terminal.open", "content.open", "project.run"]);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: TreeSettings = serde_json::from_str(r#"{ "showDotGit": true }"#).unwrap();
        assert!(settings.show_dot_git);
        assert!(settings.show_hidden);
        assert_eq!(settings.toolbar.len(), 3);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(TreeSettings::default()).unwrap();
        assert_eq!(json["showHidden"], serde_json::Value::Bool(true));
        assert_eq!(json["showDotGit"], serde_json::Value::Bool(false));
        assert_eq!(json["showToolbar"], serde_json::Value::Bool(true));
        assert_eq!(json["toolbar"][0]["command"], "terminal.open");
    }

    #[test]
    fn test_settings_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tree.json");

        let settings = TreeSettings {
            show_hidden: false,
            toolbar: vec![ToolbarCommand::new("terminal.open")],
            ..TreeSettings::default()
        };
        settings.save_to_file(&path).unwrap();

        let loaded = TreeSettings::load_from_file(&path).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_validation_rejects_empty_command() {
        let mut settings = TreeSettings::default();
        assert!(settings.validate().is_ok());

        settings.toolbar.push(ToolbarCommand::new("  "));
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tree.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            TreeSettings::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            TreeSettings::load_from_file(temp_dir.path().join("missing.json")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_visible_toolbar() {
        let mut settings = TreeSettings::default();
        assert_eq!(settings.visible_toolbar().len(), 3);

        settings.show_toolbar = false;
        assert!(settings.visible_toolbar().is_empty());
    }

    #[test]
    fn test_json_schema_lists_properties() {
        let schema = TreeSettings::json_schema().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for key in ["toolbar", "showToolbar", "showHidden", "showDotGit"] {
            assert!(properties.contains_key(key), "missing {key}");
        }
        assert_eq!(schema["title"], "Files Tree");
    }
}
