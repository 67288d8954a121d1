use serde::{Deserialize, Serialize};

/// One remembered translation. Serialized as `{"original": ..., "translated": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub original: String,
    pub translated: String,
}

impl HistoryEntry {
    pub fn new(original: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translated: translated.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original: String,
    pub translated: String,
    /// Source language as reported by the API (resolved when `auto` was sent)
    pub from: Option<String>,
    pub to: Option<String>,
}

impl From<&TranslationResult> for HistoryEntry {
    fn from(result: &TranslationResult) -> Self {
        HistoryEntry::new(result.original.clone(), result.translated.clone())
    }
}

/// Snapshot of the translation panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    pub visible: bool,
    pub original: Option<String>,
    pub translated: Option<String>,
}
