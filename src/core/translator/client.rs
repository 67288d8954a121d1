use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::languages::{is_supported_source, is_supported_target};
use super::signing::generate_salt;
use super::types::{ApiCredentials, ApiResponse, TranslationError, TranslationRequest, TranslatorResult};
use crate::shared::types::TranslationResult;

/// Status and raw body of an HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Sends a form-encoded POST. Only transport failures are errors; any status is a reply.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_form(&self, url: &str, body: String) -> TranslatorResult<HttpReply>;
}

pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> TranslatorResult<Self> {
        let http = Client::builder()
            .user_agent("selection-translator/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::Network(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(&self, url: &str, body: String) -> TranslatorResult<HttpReply> {
        let response = self.http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text()
            .await
            .map_err(|e| TranslationError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(HttpReply { status, body })
    }
}

pub struct TranslationClient {
    endpoint: String,
    credentials: ApiCredentials,
    transport: Arc<dyn HttpTransport>,
}

impl TranslationClient {
    pub fn new(endpoint: impl Into<String>, credentials: ApiCredentials, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            transport,
        }
    }

    /// Sign a request for `text` with a fresh salt
    pub fn build_request(&self, text: &str, to: &str, from: &str) -> TranslationRequest {
        TranslationRequest::new(text, from, to, generate_salt(), &self.credentials)
    }

    /// Translate `text` into `to`. One attempt, no retry.
    pub async fn translate(&self, text: &str, to: &str, from: &str) -> TranslatorResult<TranslationResult> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyText);
        }
        if !is_supported_target(to) {
            return Err(TranslationError::UnsupportedLanguage(to.to_string()));
        }
        if !is_supported_source(from) {
            return Err(TranslationError::UnsupportedLanguage(from.to_string()));
        }

        let request = self.build_request(text, to, from);
        debug!("[Translator] POST {} ({} -> {}, {} chars)", self.endpoint, from, to, text.chars().count());

        let reply = self.transport.post_form(&self.endpoint, request.encode_form()).await?;
        parse_reply(text, reply)
    }
}

/// Turn a raw reply into a result, classifying every failure shape
pub fn parse_reply(original: &str, reply: HttpReply) -> TranslatorResult<TranslationResult> {
    if !(200..300).contains(&reply.status) {
        return Err(TranslationError::Http { status: reply.status });
    }

    let payload: ApiResponse = serde_json::from_str(&reply.body)
        .map_err(|e| TranslationError::MalformedResponse(format!("Failed to parse JSON: {}", e)))?;

    if let Some(code) = payload.error() {
        return Err(TranslationError::Api {
            code,
            message: payload.error_msg.clone().unwrap_or_else(|| "translation failed".to_string()),
        });
    }

    let first = payload.trans_result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| TranslationError::MalformedResponse("missing translation result".to_string()))?;

    Ok(TranslationResult {
        original: original.to_string(),
        translated: first.dst,
        from: payload.from,
        to: payload.to,
    })
}
