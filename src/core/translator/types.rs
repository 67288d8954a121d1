use serde::Deserialize;
use thiserror::Error;

use super::signing::sign;

/// Code the API sometimes returns alongside a successful payload
const API_SUCCESS_CODE: &str = "52000";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("nothing to translate")]
    EmptyText,

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("translation API returned HTTP {status}")]
    Http { status: u16 },

    #[error("translation API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TranslationError {
    /// Short message meant for the error toast
    pub fn user_message(&self) -> String {
        match self {
            TranslationError::EmptyText => "Nothing to translate".to_string(),
            TranslationError::UnsupportedLanguage(code) => format!("Unsupported language: {}", code),
            TranslationError::Network(_) => "Translation service is temporarily unavailable".to_string(),
            TranslationError::Http { status } => format!("Network request failed (HTTP {})", status),
            TranslationError::Api { message, .. } => message.clone(),
            TranslationError::MalformedResponse(_) => "Unexpected response from translation service".to_string(),
        }
    }
}

pub type TranslatorResult<T> = Result<T, TranslationError>;

/// Credentials shared by every request
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub app_id: String,
    pub secret_key: String,
}

/// A fully signed request, ready to be form-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub from: String,
    pub to: String,
    pub app_id: String,
    pub salt: String,
    pub sign: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        salt: impl Into<String>,
        credentials: &ApiCredentials,
    ) -> Self {
        let text = text.into();
        let salt = salt.into();
        let sign = sign(&credentials.app_id, &text, &salt, &credentials.secret_key);
        Self {
            text,
            from: from.into(),
            to: to.into(),
            app_id: credentials.app_id.clone(),
            salt,
            sign,
        }
    }

    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("q", self.text.as_str()),
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("appid", self.app_id.as_str()),
            ("salt", self.salt.as_str()),
            ("sign", self.sign.as_str()),
        ]
    }

    /// `application/x-www-form-urlencoded` body
    pub fn encode_form(&self) -> String {
        self.form_fields()
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub from: Option<String>,
    pub to: Option<String>,
    pub trans_result: Option<Vec<TransResult>>,
    /// Arrives as a string, occasionally as a number
    pub error_code: Option<serde_json::Value>,
    pub error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransResult {
    pub src: Option<String>,
    pub dst: String,
}

impl ApiResponse {
    /// The error code, if the payload reports a failure
    pub fn error(&self) -> Option<String> {
        let code = match self.error_code.as_ref()? {
            serde_json::Value::Null => return None,
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if code.is_empty() || code == API_SUCCESS_CODE {
            None
        } else {
            Some(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ApiCredentials {
        ApiCredentials {
            app_id: "2015063000000001".to_string(),
            secret_key: "12345678".to_string(),
        }
    }

    #[test]
    fn test_request_is_signed_from_its_own_fields() {
        let req = TranslationRequest::new("apple", "en", "zh", "1435660288", &credentials());
        assert_eq!(req.sign, sign("2015063000000001", "apple", "1435660288", "12345678"));

        let resalted = TranslationRequest::new("apple", "en", "zh", "1", &credentials());
        assert_ne!(req.sign, resalted.sign);
    }

    #[test]
    fn test_encode_form_escapes_values() {
        let req = TranslationRequest::new("a b&c=你", "auto", "en", "42", &credentials());
        let body = req.encode_form();

        assert!(body.starts_with("q=a%20b%26c%3D%E4%BD%A0&from=auto&to=en&appid=2015063000000001&salt=42&sign="));
        assert!(body.ends_with(&req.sign));
    }

    #[test]
    fn test_error_code_forms() {
        let numeric: ApiResponse = serde_json::from_str(r#"{"error_code": 54001, "error_msg": "Invalid Sign"}"#).unwrap();
        assert_eq!(numeric.error().as_deref(), Some("54001"));

        let string: ApiResponse = serde_json::from_str(r#"{"error_code": "52003"}"#).unwrap();
        assert_eq!(string.error().as_deref(), Some("52003"));

        let success: ApiResponse = serde_json::from_str(r#"{"error_code": "52000", "trans_result": []}"#).unwrap();
        assert_eq!(success.error(), None);

        let absent: ApiResponse = serde_json::from_str(r#"{"trans_result": []}"#).unwrap();
        assert_eq!(absent.error(), None);
    }

    #[test]
    fn test_user_messages() {
        let api = TranslationError::Api {
            code: "54003".to_string(),
            message: "Invalid Access Limit".to_string(),
        };
        assert_eq!(api.user_message(), "Invalid Access Limit");
        assert_eq!(
            TranslationError::Http { status: 502 }.user_message(),
            "Network request failed (HTTP 502)"
        );
    }
}
