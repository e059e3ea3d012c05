use async_trait::async_trait;

/// Modal dialogs provided by the host
///
/// `None` from `prompt` and `false` from `confirm` mean the user dismissed
/// the dialog; callers stop the action without reporting an error.
#[async_trait]
pub trait DialogService: Send + Sync {
    /// Ask for a line of text, pre-filled with `default_value`
    async fn prompt(&self, message: &str, default_value: &str) -> Option<String>;

    /// Ask the user to accept or cancel
    async fn confirm(&self, message: &str) -> bool;

    /// Show a blocking error message
    async fn alert(&self, message: &str);
}

/// Dialogs for hosts without any UI: prompts cancel, alerts go to the log
#[derive(Debug, Default, Clone)]
pub struct HeadlessDialogs;

#[async_trait]
impl DialogService for HeadlessDialogs {
    async fn prompt(&self, message: &str, _default_value: &str) -> Option<String> {
        tracing::debug!("headless prompt cancelled: {}", message);
        None
    }

    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!("headless confirm cancelled: {}", message);
        false
    }

    async fn alert(&self, message: &str) {
        tracing::warn!("alert: {}", message);
    }
}
