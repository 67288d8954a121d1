use serde::{Deserialize, Serialize};
use super::types::HistoryEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
pub enum AppEvent {
    #[serde(rename = "translation://shown")]
    TranslationShown { original: String, translated: String },

    #[serde(rename = "error://shown")]
    ErrorShown(String),

    #[serde(rename = "error://hidden")]
    ErrorHidden,

    #[serde(rename = "history://updated")]
    HistoryUpdated(Vec<HistoryEntry>),

    #[serde(rename = "panel://visibility")]
    PanelVisibility(bool),
}

/// Sink for everything the user gets to see.
///
/// The translator never renders anything itself; a host (terminal, webview, test harness)
/// implements this and decides how results, errors and history look.
pub trait DisplaySurface: Send + Sync {
    fn show_translation(&self, original: &str, translated: &str);

    fn show_error(&self, message: &str);

    fn render_history(&self, entries: &[HistoryEntry]);

    /// Called when an error toast expires
    fn hide_error(&self) {}

    fn set_panel_visible(&self, _visible: bool) {}
}
