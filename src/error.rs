//! Error type shared by every page component.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error, PartialEq)]
pub enum SiteError {
    #[error("element not found: #{0}")]
    MissingElement(String),
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("HTTP {status}{}", http_detail(.message))]
    Http { status: u16, message: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("no file selected")]
    NoFile,
}

impl SiteError {
    /// Text suitable for a status message.
    ///
    /// Server-supplied messages win, then non-empty transport errors;
    /// everything else falls back to `default`.
    pub fn user_text(&self, default: &str) -> String {
        match self {
            SiteError::Http { message: Some(m), .. } if !m.is_empty() => m.clone(),
            SiteError::Network(m) if !m.is_empty() => m.clone(),
            _ => default.to_string(),
        }
    }

    /// Wrap a rejected fetch promise.
    pub fn network(value: JsValue) -> Self {
        SiteError::Network(describe_js(&value))
    }

    /// Wrap a failed body read or conversion.
    pub fn decode(value: JsValue) -> Self {
        SiteError::Decode(describe_js(&value))
    }
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        SiteError::Dom(describe_js(&value))
    }
}

impl From<serde_wasm_bindgen::Error> for SiteError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        SiteError::Decode(err.to_string())
    }
}

fn http_detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Best-effort text for a thrown JS value.
fn describe_js(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_preferred() {
        let err = SiteError::Http { status: 500, message: Some("bad".into()) };
        assert_eq!(err.user_text("Generate failed"), "bad");
    }

    #[test]
    fn missing_or_empty_server_message_uses_default() {
        let err = SiteError::Http { status: 500, message: None };
        assert_eq!(err.user_text("Generate failed"), "Generate failed");

        let err = SiteError::Http { status: 500, message: Some(String::new()) };
        assert_eq!(err.user_text("Generate failed"), "Generate failed");
    }

    #[test]
    fn transport_text_is_shown() {
        let err = SiteError::Network("Failed to fetch".into());
        assert_eq!(err.user_text("Failed"), "Failed to fetch");
        assert_eq!(SiteError::Network(String::new()).user_text("Failed"), "Failed");
    }

    #[test]
    fn decode_errors_use_default() {
        let err = SiteError::Decode("unexpected token".into());
        assert_eq!(err.user_text("Generate failed"), "Generate failed");
    }

    #[test]
    fn http_display_includes_message() {
        let err = SiteError::Http { status: 400, message: Some("Invalid upload target".into()) };
        assert_eq!(err.to_string(), "HTTP 400: Invalid upload target");
        assert_eq!(SiteError::Http { status: 502, message: None }.to_string(), "HTTP 502");
    }
}
