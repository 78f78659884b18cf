// src/report/types.rs
// =============================================================================
// The values the checkers publish.
//
// A result is built completely inside a check run and then published in one
// go; nothing ever edits a published result. That is why none of these types
// have setters, only constructors.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Lifecycle of one check run
//
// `Checking` while a run is in flight, then exactly one of the three
// terminal states. Only a new run puts a result back into `Checking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Checking,
    Success,
    Warning,
    Error,
}

impl CheckStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckStatus::Checking)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Checking => "checking",
            CheckStatus::Success => "success",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
        };
        f.write_str(label)
    }
}

// A boolean that can instead carry a diagnostic label
//
// Serializes as plain `true`/`false` or as the label string, so the JSON
// output looks like `"connectivity": true` or
// `"connectivity": "Edge proxy error 1001 - DNS not configured"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Signal {
    Flag(bool),
    Diagnostic(String),
}

impl Signal {
    // A diagnostic label still counts as "something answered"
    pub fn is_truthy(&self) -> bool {
        match self {
            Signal::Flag(value) => *value,
            Signal::Diagnostic(label) => !label.is_empty(),
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Signal::Diagnostic(label) => Some(label),
            Signal::Flag(_) => None,
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::Flag(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainDetails {
    /// The resolver returned at least one A record
    pub dns: bool,
    /// The domain answered an HTTP(S) request
    pub connectivity: Signal,
    /// The domain answered over HTTPS
    pub ssl: Signal,
    /// `www.<domain>` answered
    pub redirects: bool,
    /// Wall-clock duration of the whole run
    pub response_time_ms: u64,
    /// The checker is itself being served from the target domain
    pub is_custom_domain_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCheckResult {
    pub status: CheckStatus,
    pub details: DomainDetails,
    pub last_check: Option<DateTime<Utc>>,
    /// Problems in the order they were detected
    pub errors: Vec<String>,
}

impl Default for DomainCheckResult {
    fn default() -> Self {
        Self {
            status: CheckStatus::Checking,
            details: DomainDetails::default(),
            last_check: None,
            errors: Vec::new(),
        }
    }
}

impl DomainCheckResult {
    // The "a run has started" view of a previous result
    pub fn begin_run(&self) -> Self {
        Self {
            status: CheckStatus::Checking,
            errors: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationDetails {
    pub connected: bool,
    pub pages_enabled: bool,
    pub cname_exists: bool,
    pub build_status: bool,
    pub custom_domain_configured: bool,
    pub dns_verified_by_host: bool,
}

// Names for the integration booleans, used to mark which ones are guesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntegrationFlag {
    Connected,
    PagesEnabled,
    CnameExists,
    BuildStatus,
    CustomDomainConfigured,
    DnsVerifiedByHost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCheckResult {
    pub status: CheckStatus,
    pub details: IntegrationDetails,
    pub last_check: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
    /// Positive or neutral observations, kept apart from `errors`
    pub info: Vec<String>,
    /// Detail flags that were assumed rather than observed
    pub assumed: Vec<IntegrationFlag>,
}

impl Default for IntegrationCheckResult {
    fn default() -> Self {
        Self {
            status: CheckStatus::Checking,
            details: IntegrationDetails::default(),
            last_check: None,
            errors: Vec::new(),
            info: Vec::new(),
            assumed: Vec::new(),
        }
    }
}

impl IntegrationCheckResult {
    pub fn begin_run(&self) -> Self {
        Self {
            status: CheckStatus::Checking,
            errors: Vec::new(),
            info: Vec::new(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_truthiness() {
        assert!(Signal::Flag(true).is_truthy());
        assert!(!Signal::Flag(false).is_truthy());
        assert!(Signal::Diagnostic("edge error".to_string()).is_truthy());
        assert!(!Signal::Diagnostic(String::new()).is_truthy());
    }

    #[test]
    fn test_signal_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Signal::Flag(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&Signal::Diagnostic("x".to_string())).unwrap(),
            "\"x\""
        );
    }

    #[test]
    fn test_new_results_start_checking_with_false_details() {
        let domain = DomainCheckResult::default();
        assert_eq!(domain.status, CheckStatus::Checking);
        assert!(!domain.details.dns);
        assert!(!domain.details.connectivity.is_truthy());
        assert!(domain.last_check.is_none());

        let integration = IntegrationCheckResult::default();
        assert_eq!(integration.status, CheckStatus::Checking);
        assert_eq!(integration.details, IntegrationDetails::default());
    }

    #[test]
    fn test_begin_run_clears_errors_but_keeps_details() {
        let previous = DomainCheckResult {
            status: CheckStatus::Warning,
            details: DomainDetails {
                dns: true,
                ..DomainDetails::default()
            },
            last_check: Some(Utc::now()),
            errors: vec!["something".to_string()],
        };

        let running = previous.begin_run();
        assert_eq!(running.status, CheckStatus::Checking);
        assert!(running.errors.is_empty());
        assert!(running.details.dns);
        assert_eq!(running.last_check, previous.last_check);
    }

    #[test]
    fn test_details_use_camel_case_keys() {
        let json = serde_json::to_value(DomainDetails::default()).unwrap();
        assert!(json.get("responseTimeMs").is_some());
        assert!(json.get("isCustomDomainActive").is_some());
    }
}
