//! Inbound request descriptors

use crate::RedirectError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The part of an inbound request the handler needs: the requested host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    host: String,
}

impl RequestDescriptor {
    /// Build a descriptor from a raw `Host` value
    ///
    /// Fails with `MissingHost` when nothing is left after normalization.
    pub fn from_host(raw: &str) -> Result<Self, RedirectError> {
        let host = normalize_host(raw);
        if host.is_empty() {
            return Err(RedirectError::MissingHost);
        }
        Ok(Self { host })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Trim, lowercase, and drop a trailing `:port`.
///
/// Bracketed IPv6 literals keep their brackets; only the port after `]` is
/// removed. An unbracketed value with more than one `:` is a bare IPv6
/// address and has no port.
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();

    let host = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port))
                if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                name
            }
            _ => host,
        }
    };

    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Proxy-integration event as delivered by an upstream routing layer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProxyEvent {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ProxyEvent {
    /// Case-insensitive header lookup
    ///
    /// An exact-case key wins; otherwise the first matching key in sorted
    /// order is used.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    pub fn descriptor(&self) -> Result<RequestDescriptor, RedirectError> {
        let host = self.header("host").ok_or(RedirectError::MissingHost)?;
        RequestDescriptor::from_host(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Redirect.Example.COM"), "redirect.example.com");
        assert_eq!(normalize_host("  a.example.com "), "a.example.com");
        assert_eq!(normalize_host("a.example.com:8080"), "a.example.com");
        assert_eq!(normalize_host("a.example.com."), "a.example.com");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
        assert_eq!(normalize_host("[::1]"), "[::1]");
        assert_eq!(normalize_host("2001:db8::1"), "2001:db8::1");
        assert_eq!(normalize_host("2001:DB8::"), "2001:db8::");
    }

    #[test]
    fn test_descriptor_rejects_empty_host() {
        assert_eq!(
            RequestDescriptor::from_host("   "),
            Err(RedirectError::MissingHost)
        );
        assert_eq!(RequestDescriptor::from_host(":443"), Err(RedirectError::MissingHost));
    }

    #[test]
    fn test_proxy_event_host_lookup() {
        let event: ProxyEvent =
            serde_json::from_str(r#"{"headers": {"Host": "Nope.Example.com", "accept": "*/*"}}"#)
                .unwrap();
        let descriptor = event.descriptor().unwrap();
        assert_eq!(descriptor.host(), "nope.example.com");
    }

    #[test]
    fn test_proxy_event_duplicate_host_is_stable() {
        let raw = r#"{"headers": {"Host": "a.example.com", "host": "b.example.com"}}"#;
        for _ in 0..50 {
            let event: ProxyEvent = serde_json::from_str(raw).unwrap();
            assert_eq!(event.descriptor().unwrap().host(), "b.example.com");
        }

        let raw = r#"{"headers": {"HOST": "a.example.com", "Host": "b.example.com"}}"#;
        let event: ProxyEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.header("host"), Some("a.example.com"));
    }

    #[test]
    fn test_proxy_event_without_host() {
        let event: ProxyEvent = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(event.descriptor(), Err(RedirectError::MissingHost));
    }
}
