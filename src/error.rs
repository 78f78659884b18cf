// src/error.rs
// =============================================================================
// Typed errors for the individual probe steps.
//
// The checkers never let these escape a run: every step catches its own
// error and turns it into a finding (see report/findings.rs). The types are
// still useful because they let each step tell a *transport* failure apart
// from a *resolver* failure, which the report treats differently.
//
// Application code (main.rs, config.rs) uses anyhow instead, like the rest
// of the CLI.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// No HTTP response at all (connection refused, TLS failure, DNS miss...)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not finish within its per-request timeout
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The DNS-over-HTTPS endpoint itself could not be reached
    #[error("DNS resolver unreachable: {0}")]
    ResolverUnreachable(String),

    /// The resolver answered, but not with JSON we understand
    #[error("malformed resolver response: {0}")]
    MalformedResolverResponse(#[from] serde_json::Error),

    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),
}

impl ProbeError {
    // Classifies a reqwest error for a given URL.
    //
    // reqwest reports timeouts as a flag on the error rather than as a
    // separate type, so we pull that case out here.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeError::Timeout(url.to_string())
        } else {
            ProbeError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_response_converts_from_serde() {
        let err: ProbeError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, ProbeError::MalformedResolverResponse(_)));
        assert!(err.to_string().starts_with("malformed resolver response"));
    }

    #[test]
    fn test_timeout_message_names_url() {
        let err = ProbeError::Timeout("https://example.com".to_string());
        assert_eq!(err.to_string(), "request to https://example.com timed out");
    }
}
