//! Translation client
//!
//! Signs requests for the translation API, sends them as URL-encoded forms and
//! classifies the reply into a result or a `TranslationError`.

pub mod client;
pub mod languages;
pub mod signing;
pub mod types;

pub use client::{HttpReply, HttpTransport, ReqwestTransport, TranslationClient};
pub use types::{ApiCredentials, TranslationError, TranslationRequest, TranslatorResult};
