// src/env.rs
// =============================================================================
// The environment snapshot: "where is this site being served from right now?"
//
// In a browser the checkers would read window.location directly. Here the
// same information is captured once in a plain value and handed to the
// checkers, so a test can pin it to any hostname it likes.
//
// Nothing in the crate ever writes to a snapshot after it is built.
// =============================================================================

use serde::Serialize;
use url::Url;

use crate::error::{ProbeError, ProbeResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    /// Full URL the site is being served from (empty when detached)
    pub url: String,
    /// Lowercased hostname part of `url`
    pub hostname: String,
    /// Scheme without the trailing colon ("https", "http", "file")
    pub scheme: String,
    /// Whether the page counts as a secure context
    pub secure_context: bool,
}

impl EnvironmentSnapshot {
    // Builds a snapshot from the URL the site is being served from
    //
    // Example:
    //   "https://Example.com/debug" -> hostname "example.com", scheme "https"
    pub fn from_url(raw: &str) -> ProbeResult<Self> {
        let parsed = Url::parse(raw.trim())
            .map_err(|e| ProbeError::InvalidEnvironment(format!("'{}': {}", raw, e)))?;

        let hostname = parsed
            .host_str()
            .map(|h| h.trim_end_matches('.').to_lowercase())
            .unwrap_or_default();
        let scheme = parsed.scheme().to_string();

        // Browsers treat loopback as secure even over plain http
        let secure_context = scheme == "https" || is_loopback(&hostname);

        Ok(Self {
            url: parsed.to_string(),
            hostname,
            scheme,
            secure_context,
        })
    }

    // A snapshot for code that is not being served from anywhere,
    // which is the normal case when running from a terminal
    pub fn detached() -> Self {
        Self {
            url: String::new(),
            hostname: String::new(),
            scheme: "file".to_string(),
            secure_context: false,
        }
    }

    pub fn is_secure_scheme(&self) -> bool {
        self.scheme == "https"
    }

    // True when the hostname is exactly `domain` (case-insensitive)
    pub fn is_served_from(&self, domain: &str) -> bool {
        !self.hostname.is_empty() && self.hostname.eq_ignore_ascii_case(domain)
    }
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self::detached()
    }
}

fn is_loopback(hostname: &str) -> bool {
    hostname == "localhost"
        || hostname == "127.0.0.1"
        || hostname == "[::1]"
        || hostname.ends_with(".localhost")
}
