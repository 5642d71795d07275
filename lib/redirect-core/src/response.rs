//! Response descriptors and their proxy-integration encoding

use serde::Serialize;
use std::collections::BTreeMap;

/// Structured HTTP response produced by the handler.
///
/// Serializes to the proxy-integration envelope; `body`, `headers` and
/// `cookies` are left out when empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescriptor {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
}

impl ResponseDescriptor {
    /// 301 with a `Location` header and no body
    pub fn redirect(location: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Location".to_string(), location.to_string());
        Self {
            status_code: 301,
            body: None,
            headers,
            is_base64_encoded: false,
            cookies: Vec::new(),
        }
    }

    /// Error response with a `{"errorMessage": ...}` body
    pub fn error(status_code: u16, message: &str) -> Self {
        let body = serde_json::json!({ "errorMessage": message }).to_string();
        Self {
            status_code,
            body: Some(body),
            headers: BTreeMap::new(),
            is_base64_encoded: false,
            cookies: Vec::new(),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location").map(String::as_str)
    }

    /// Encode as the proxy-integration JSON envelope
    pub fn to_envelope(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
