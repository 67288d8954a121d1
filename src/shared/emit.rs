use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use super::events::{AppEvent, DisplaySurface};
use super::types::HistoryEntry;

/// Dispatch an application event to a display surface
pub fn emit_event(surface: &dyn DisplaySurface, event: AppEvent) {
    match event {
        AppEvent::TranslationShown { original, translated } => {
            surface.show_translation(&original, &translated);
        }
        AppEvent::ErrorShown(message) => surface.show_error(&message),
        AppEvent::ErrorHidden => surface.hide_error(),
        AppEvent::HistoryUpdated(entries) => surface.render_history(&entries),
        AppEvent::PanelVisibility(visible) => surface.set_panel_visible(visible),
    }
}

/// Display surface that forwards every call as an `AppEvent` over a channel.
///
/// Lets a host consume display updates from its own task, and lets tests assert on the
/// exact sequence of updates.
#[derive(Clone)]
pub struct ChannelSurface {
    tx: UnboundedSender<AppEvent>,
}

impl ChannelSurface {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: AppEvent) {
        if self.tx.send(event).is_err() {
            warn!("[Display] Event receiver dropped, update discarded");
        }
    }
}

impl DisplaySurface for ChannelSurface {
    fn show_translation(&self, original: &str, translated: &str) {
        self.send(AppEvent::TranslationShown {
            original: original.to_string(),
            translated: translated.to_string(),
        });
    }

    fn show_error(&self, message: &str) {
        self.send(AppEvent::ErrorShown(message.to_string()));
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        self.send(AppEvent::HistoryUpdated(entries.to_vec()));
    }

    fn hide_error(&self) {
        self.send(AppEvent::ErrorHidden);
    }

    fn set_panel_visible(&self, visible: bool) {
        self.send(AppEvent::PanelVisibility(visible));
    }
}
