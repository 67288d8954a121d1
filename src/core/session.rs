//! Translator session
//!
//! Ties selection events, the translation client, the history cache and the display surface
//! together. One session per host; all collaborators are injected so the whole flow runs
//! without a UI or a network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::history::HistoryCache;
use crate::core::storage::KeyValueStore;
use crate::core::translator::languages::{is_supported_source, is_supported_target};
use crate::core::translator::{ApiCredentials, HttpTransport, TranslationClient, TranslationError};
use crate::shared::error::AppResult;
use crate::shared::events::DisplaySurface;
use crate::shared::settings::AppSettings;
use crate::shared::types::{HistoryEntry, PanelState, TranslationResult};

/// How long an error toast stays up
pub const ERROR_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: String,
    pub credentials: ApiCredentials,
    pub source_lang: String,
    pub target_lang: String,
    pub history_key: String,
    pub max_history_items: usize,
    pub error_toast_duration: Duration,
}

impl SessionConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            endpoint: settings.api.endpoint.clone(),
            credentials: ApiCredentials {
                app_id: settings.api.app_id.clone(),
                secret_key: settings.api.secret_key.clone(),
            },
            source_lang: settings.preferences.default_source_lang.clone(),
            target_lang: settings.preferences.default_target_lang.clone(),
            history_key: settings.history.storage_key.clone(),
            max_history_items: settings.history.max_items,
            error_toast_duration: ERROR_TOAST_DURATION,
        }
    }
}

#[derive(Debug, Clone)]
struct LanguagePair {
    from: String,
    to: String,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("[Session] {} mutex poisoned, recovering...", what);
        poisoned.into_inner()
    })
}

pub struct TranslatorSession {
    client: TranslationClient,
    history: Mutex<HistoryCache>,
    display: Arc<dyn DisplaySurface>,
    languages: Mutex<LanguagePair>,
    panel: Mutex<PanelState>,
    /// Text of the latest translate call that has not completed yet
    pending: Mutex<Option<String>>,
    /// Bumped by every translate call; only the latest call may touch the UI
    generation: AtomicU64,
    /// Bumped by every error toast; a dismissal timer only hides its own toast
    toast_generation: Arc<AtomicU64>,
    toast_duration: Duration,
}

impl TranslatorSession {
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        let client = TranslationClient::new(config.endpoint, config.credentials, transport);
        let history = HistoryCache::load(store, config.history_key, config.max_history_items);

        if !history.is_empty() {
            display.render_history(history.entries());
        }
        info!(
            "[Session] Ready ({} -> {}, {} history entries)",
            config.source_lang,
            config.target_lang,
            history.len()
        );

        Self {
            client,
            history: Mutex::new(history),
            display,
            languages: Mutex::new(LanguagePair {
                from: config.source_lang,
                to: config.target_lang,
            }),
            panel: Mutex::new(PanelState::default()),
            pending: Mutex::new(None),
            generation: AtomicU64::new(0),
            toast_generation: Arc::new(AtomicU64::new(0)),
            toast_duration: config.error_toast_duration,
        }
    }

    /// Entry point for a text selection. Whitespace-only selections are ignored.
    pub async fn handle_selection(&self, raw: &str) -> Option<TranslationResult> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        self.translate_text(text).await
    }

    /// Translate with the current language pair and update panel, history and display.
    ///
    /// Failures surface as an error toast and `None`. If another call starts before this one
    /// completes, this call's outcome is discarded and `None` is returned.
    pub async fn translate_text(&self, text: &str) -> Option<TranslationResult> {
        let generation = {
            let mut pending = lock(&self.pending, "Pending");
            *pending = Some(text.to_string());
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        let LanguagePair { from, to } = lock(&self.languages, "Languages").clone();

        let outcome = self.client.translate(text, &to, &from).await;

        // The panel lock serializes completions: the generation check and the update it
        // guards happen as one step.
        let mut panel = lock(&self.panel, "Panel");
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("[Session] Dropping superseded translation #{}", generation);
            return None;
        }
        *lock(&self.pending, "Pending") = None;

        match outcome {
            Ok(result) => {
                self.apply_translation(&mut panel, &result);
                Some(result)
            }
            Err(e) => {
                drop(panel);
                warn!("[Session] Translation failed: {}", e);
                self.show_error(&e.user_message());
                None
            }
        }
    }

    fn apply_translation(&self, panel: &mut PanelState, result: &TranslationResult) {
        panel.visible = true;
        panel.original = Some(result.original.clone());
        panel.translated = Some(result.translated.clone());
        self.display.show_translation(&result.original, &result.translated);
        self.display.set_panel_visible(true);

        let entries = lock(&self.history, "History").add(HistoryEntry::from(result)).to_vec();
        self.display.render_history(&entries);
    }

    /// Show an error toast and arm its dismissal timer
    fn show_error(&self, message: &str) {
        let token = self.toast_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.display.show_error(message);

        let display = Arc::clone(&self.display);
        let toast_generation = Arc::clone(&self.toast_generation);
        let duration = self.toast_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if toast_generation.load(Ordering::SeqCst) == token {
                display.hide_error();
            }
        });
    }

    /// Change the target language and re-translate the current text.
    ///
    /// The current text is the one still in flight if there is one, otherwise whatever the
    /// panel holds. Re-translating supersedes the in-flight call, so its old-language reply
    /// is dropped.
    pub async fn switch_language(&self, code: &str) -> Option<TranslationResult> {
        if !is_supported_target(code) {
            self.show_error(&TranslationError::UnsupportedLanguage(code.to_string()).user_message());
            return None;
        }
        lock(&self.languages, "Languages").to = code.to_string();
        info!("[Session] Target language set to {}", code);

        let pending = lock(&self.pending, "Pending").clone();
        let current = pending.or_else(|| lock(&self.panel, "Panel").original.clone());
        match current {
            Some(text) => self.translate_text(&text).await,
            None => None,
        }
    }

    pub fn set_source_language(&self, code: &str) -> Result<(), TranslationError> {
        if !is_supported_source(code) {
            return Err(TranslationError::UnsupportedLanguage(code.to_string()));
        }
        lock(&self.languages, "Languages").from = code.to_string();
        Ok(())
    }

    pub fn target_language(&self) -> String {
        lock(&self.languages, "Languages").to.clone()
    }

    pub fn source_language(&self) -> String {
        lock(&self.languages, "Languages").from.clone()
    }

    /// Flip panel visibility, returning the new state
    pub fn toggle_panel(&self) -> bool {
        let visible = {
            let mut panel = lock(&self.panel, "Panel");
            panel.visible = !panel.visible;
            panel.visible
        };
        self.display.set_panel_visible(visible);
        visible
    }

    pub fn hide_panel(&self) {
        lock(&self.panel, "Panel").visible = false;
        self.display.set_panel_visible(false);
    }

    pub fn panel(&self) -> PanelState {
        lock(&self.panel, "Panel").clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.history, "History").entries().to_vec()
    }

    pub fn clear_history(&self) -> AppResult<()> {
        lock(&self.history, "History").clear()?;
        self.display.render_history(&[]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::core::translator::client::tests::{credentials, ok_reply, ScriptedTransport};
    use crate::core::translator::{HttpReply, TranslatorResult};
    use crate::shared::emit::ChannelSurface;
    use crate::shared::events::AppEvent;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::{mpsc, oneshot};

    const KEY: &str = "translationHistory";

    fn config() -> SessionConfig {
        SessionConfig {
            endpoint: "https://fanyi.example/translate".to_string(),
            credentials: credentials(),
            source_lang: "auto".to_string(),
            target_lang: "en".to_string(),
            history_key: KEY.to_string(),
            max_history_items: 10,
            error_toast_duration: ERROR_TOAST_DURATION,
        }
    }

    fn session_with(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
    ) -> (TranslatorSession, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = TranslatorSession::new(config(), transport, store, Arc::new(ChannelSurface::new(tx)));
        (session, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn api_error() -> TranslatorResult<HttpReply> {
        Ok(HttpReply {
            status: 200,
            body: r#"{"error_code":"54001","error_msg":"Invalid Sign"}"#.to_string(),
        })
    }

    /// Each request waits until the test hands it a reply
    struct GatedTransport {
        gates: Mutex<VecDeque<oneshot::Receiver<TranslatorResult<HttpReply>>>>,
        sent: Mutex<Vec<String>>,
    }

    impl GatedTransport {
        fn new(gates: Vec<oneshot::Receiver<TranslatorResult<HttpReply>>>) -> Self {
            Self {
                gates: Mutex::new(gates.into()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for GatedTransport {
        async fn post_form(&self, _url: &str, body: String) -> TranslatorResult<HttpReply> {
            self.sent.lock().unwrap().push(body);
            let gate = self.gates.lock().unwrap().pop_front().expect("unexpected request");
            gate.await
                .unwrap_or_else(|_| Err(TranslationError::Network("gate dropped".to_string())))
        }
    }

    #[tokio::test]
    async fn test_success_updates_panel_history_and_display() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_reply("你好", "Hello")]));
        let (session, mut rx) = session_with(transport, Arc::new(MemoryStore::new()));

        let result = session.handle_selection("  你好 \n").await.unwrap();
        assert_eq!(result.translated, "Hello");

        assert_eq!(session.history().first(), Some(&HistoryEntry::new("你好", "Hello")));
        assert_eq!(
            session.panel(),
            PanelState {
                visible: true,
                original: Some("你好".to_string()),
                translated: Some("Hello".to_string()),
            }
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                AppEvent::TranslationShown {
                    original: "你好".to_string(),
                    translated: "Hello".to_string()
                },
                AppEvent::PanelVisibility(true),
                AppEvent::HistoryUpdated(vec![HistoryEntry::new("你好", "Hello")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_api_error_leaves_history_untouched() {
        let transport = Arc::new(ScriptedTransport::new(vec![api_error()]));
        let (session, mut rx) = session_with(transport, Arc::new(MemoryStore::new()));

        assert!(session.translate_text("hello").await.is_none());
        assert!(session.history().is_empty());
        assert!(!session.panel().visible);
        assert_eq!(drain(&mut rx), vec![AppEvent::ErrorShown("Invalid Sign".to_string())]);
    }

    #[tokio::test]
    async fn test_blank_selection_is_ignored() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let (session, mut rx) = session_with(transport.clone(), Arc::new(MemoryStore::new()));

        assert!(session.handle_selection(" \t\n").await.is_none());
        assert!(transport.sent.lock().unwrap().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_switch_language_retranslates_panel_text_once() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok_reply("hello", "你好"),
            ok_reply("hello", "こんにちは"),
        ]));
        let (session, _rx) = session_with(transport.clone(), Arc::new(MemoryStore::new()));
        session.translate_text("hello").await.unwrap();

        let result = session.switch_language("jp").await.unwrap();
        assert_eq!(result.translated, "こんにちは");
        assert_eq!(session.target_language(), "jp");

        let bodies = transport.sent_bodies();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[1].starts_with("q=hello&from=auto&to=jp&"));
    }

    #[tokio::test]
    async fn test_switch_language_without_panel_text_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let (session, _rx) = session_with(transport.clone(), Arc::new(MemoryStore::new()));

        assert!(session.switch_language("zh").await.is_none());
        assert_eq!(session.target_language(), "zh");
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_switch_to_unknown_language_keeps_target() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let (session, mut rx) = session_with(transport, Arc::new(MemoryStore::new()));

        assert!(session.switch_language("xx").await.is_none());
        assert_eq!(session.target_language(), "en");
        assert_eq!(drain(&mut rx), vec![AppEvent::ErrorShown("Unsupported language: xx".to_string())]);
    }

    #[tokio::test]
    async fn test_source_language() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_reply("bonjour", "hello")]));
        let (session, _rx) = session_with(transport.clone(), Arc::new(MemoryStore::new()));

        assert!(session.set_source_language("klingon").is_err());
        session.set_source_language("fra").unwrap();
        assert_eq!(session.source_language(), "fra");

        session.translate_text("bonjour").await.unwrap();
        assert!(transport.sent_bodies()[0].contains("&from=fra&"));
    }

    async fn race(first_reply_arrives_first: bool) {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let transport = Arc::new(GatedTransport::new(vec![rx1, rx2]));
        let (session, _rx) = session_with(transport, Arc::new(MemoryStore::new()));

        let release = async move {
            tokio::task::yield_now().await;
            if first_reply_arrives_first {
                let _ = tx1.send(ok_reply("one", "first"));
                tokio::task::yield_now().await;
                let _ = tx2.send(ok_reply("two", "second"));
            } else {
                let _ = tx2.send(ok_reply("two", "second"));
                tokio::task::yield_now().await;
                let _ = tx1.send(ok_reply("one", "first"));
            }
        };

        let (older, newer, _) = tokio::join!(session.translate_text("one"), session.translate_text("two"), release);

        assert!(older.is_none());
        assert_eq!(newer.unwrap().translated, "second");
        assert_eq!(session.panel().translated.as_deref(), Some("second"));
        assert_eq!(session.history(), vec![HistoryEntry::new("two", "second")]);
    }

    #[tokio::test]
    async fn test_latest_request_wins_when_older_reply_arrives_last() {
        race(false).await;
    }

    #[tokio::test]
    async fn test_latest_request_wins_when_older_reply_arrives_first() {
        race(true).await;
    }

    #[tokio::test]
    async fn test_switch_language_while_in_flight_retranslates_pending_text() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let transport = Arc::new(GatedTransport::new(vec![rx1, rx2]));
        let (session, _rx) = session_with(transport.clone(), Arc::new(MemoryStore::new()));

        let release = async move {
            tokio::task::yield_now().await;
            let _ = tx1.send(ok_reply("hi", "EN-hi"));
            tokio::task::yield_now().await;
            let _ = tx2.send(ok_reply("hi", "JP-hi"));
        };

        let (first, switched, _) =
            tokio::join!(session.translate_text("hi"), session.switch_language("jp"), release);

        assert!(first.is_none());
        assert_eq!(switched.unwrap().translated, "JP-hi");
        assert_eq!(session.target_language(), "jp");
        assert_eq!(session.panel().translated.as_deref(), Some("JP-hi"));
        assert_eq!(session.history(), vec![HistoryEntry::new("hi", "JP-hi")]);

        let bodies = transport.sent.lock().unwrap().clone();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[0].starts_with("q=hi&from=auto&to=en&"));
        assert!(bodies[1].starts_with("q=hi&from=auto&to=jp&"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_keep_panel_and_history_in_step() {
        let replies = (0..40).map(|i| ok_reply("x", &format!("t{}", i))).collect();
        let transport = Arc::new(ScriptedTransport::new(replies));
        let (session, _rx) = session_with(transport, Arc::new(MemoryStore::new()));
        let session = Arc::new(session);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..40 {
            let session = Arc::clone(&session);
            tasks.spawn(async move {
                session.translate_text(&format!("text {}", i)).await;
            });
        }
        while tasks.join_next().await.is_some() {}

        let panel = session.panel();
        let front = session.history().first().cloned().unwrap();
        assert_eq!(panel.original, Some(front.original));
        assert_eq!(panel.translated, Some(front.translated));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_toast_hides_after_three_seconds() {
        let transport = Arc::new(ScriptedTransport::new(vec![api_error()]));
        let (session, mut rx) = session_with(transport, Arc::new(MemoryStore::new()));

        session.translate_text("hello").await;
        assert_eq!(drain(&mut rx), vec![AppEvent::ErrorShown("Invalid Sign".to_string())]);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(drain(&mut rx), vec![AppEvent::ErrorHidden]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_timer_does_not_hide_newer_toast() {
        let transport = Arc::new(ScriptedTransport::new(vec![api_error(), api_error()]));
        let (session, mut rx) = session_with(transport, Arc::new(MemoryStore::new()));

        session.translate_text("one").await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.translate_text("two").await;
        drain(&mut rx);

        // First timer fires at t=3s but the toast now belongs to the second error
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(drain(&mut rx), vec![AppEvent::ErrorHidden]);
    }

    #[tokio::test]
    async fn test_startup_renders_persisted_history() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(KEY, &serde_json::to_string(&vec![HistoryEntry::new("a", "b")]).unwrap())
            .unwrap();

        let (session, mut rx) = session_with(Arc::new(ScriptedTransport::new(vec![])), store);
        assert_eq!(session.history(), vec![HistoryEntry::new("a", "b")]);
        assert_eq!(drain(&mut rx), vec![AppEvent::HistoryUpdated(vec![HistoryEntry::new("a", "b")])]);
    }

    #[tokio::test]
    async fn test_panel_toggle_and_clear_history() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_reply("a", "b")]));
        let store = Arc::new(MemoryStore::new());
        let (session, mut rx) = session_with(transport, store.clone());

        assert!(session.toggle_panel());
        assert!(!session.toggle_panel());

        session.translate_text("a").await.unwrap();
        session.hide_panel();
        assert!(!session.panel().visible);
        assert_eq!(session.panel().original.as_deref(), Some("a"));

        session.clear_history().unwrap();
        assert!(session.history().is_empty());
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(drain(&mut rx).last(), Some(&AppEvent::HistoryUpdated(vec![])));
    }
}
