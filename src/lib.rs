//! Select text, get a translation.
//!
//! `core` holds the translation client, the bounded history cache and the session that wires
//! them to a display surface. `shared` carries the types, errors, settings and display events
//! every layer uses. `host` is the terminal front end used by the binary.

pub mod core;
pub mod host;
pub mod shared;

pub use crate::core::history::HistoryCache;
pub use crate::core::session::{SessionConfig, TranslatorSession};
pub use crate::core::storage::{KeyValueStore, MemoryStore, RedbStore};
pub use crate::core::translator::{HttpTransport, TranslationClient, TranslationError};
pub use crate::shared::events::DisplaySurface;
pub use crate::shared::types::{HistoryEntry, TranslationResult};
