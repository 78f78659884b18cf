// src/report/findings.rs
// =============================================================================
// Problems found during a domain check, one slot per concern.
//
// The reachability probe is a two-step affair: try HTTPS, and if that fails
// try plain HTTP. The HTTP outcome *supersedes* the HTTPS failure rather than
// adding to it, so the report never says both "HTTPS does not answer" and
// "only HTTP answers" at the same time.
//
// We model that by giving each concern a single slot. Recording an issue for
// a concern that already has one replaces it in place, keeping its original
// position in the list.
// =============================================================================

use serde::Serialize;
use std::fmt;

// Which transport the edge-proxy marker was seen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    Https,
    Http,
}

// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    /// Can we reach the domain at all, and over which transport
    Reachability,
    /// Does the domain resolve in DNS
    Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The edge proxy answered but cannot route to the origin
    EdgeProxy { via: Via },
    /// HTTPS gave no response (may be superseded by the HTTP fallback)
    HttpsUnreachable,
    /// Only plain HTTP answers
    InsecureOnly,
    /// Neither transport answers
    Unreachable,
    /// The resolver answered but returned no usable records
    DnsNotResolving,
    /// The resolver itself failed
    ResolverUnreachable,
}

impl Issue {
    pub fn concern(&self) -> Concern {
        match self {
            Issue::EdgeProxy { .. }
            | Issue::HttpsUnreachable
            | Issue::InsecureOnly
            | Issue::Unreachable => Concern::Reachability,
            Issue::DnsNotResolving | Issue::ResolverUnreachable => Concern::Resolution,
        }
    }

    // Edge-proxy misconfiguration overrides every other signal
    pub fn is_critical(&self) -> bool {
        matches!(self, Issue::EdgeProxy { .. })
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::EdgeProxy { via: Via::Https } => f.write_str(
                "CRITICAL EDGE PROXY ERROR 1001: DNS resolution error - the domain is configured \
                 on the edge proxy but it cannot resolve to the hosting origin",
            ),
            Issue::EdgeProxy { via: Via::Http } => {
                f.write_str("CRITICAL EDGE PROXY ERROR 1001: DNS resolution error via HTTP")
            }
            Issue::HttpsUnreachable => f.write_str("Domain is not responding over HTTPS"),
            Issue::InsecureOnly => f.write_str("Domain responds only over HTTP (no SSL)"),
            Issue::Unreachable => f.write_str("Domain does not respond over HTTP or HTTPS"),
            Issue::DnsNotResolving => f.write_str("DNS is not resolving correctly"),
            Issue::ResolverUnreachable => f.write_str("Could not reach the DNS resolver"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    issues: Vec<Issue>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    // Records an issue, replacing any earlier issue for the same concern
    pub fn record(&mut self, issue: Issue) {
        let concern = issue.concern();
        match self.issues.iter_mut().find(|i| i.concern() == concern) {
            Some(slot) => *slot = issue,
            None => self.issues.push(issue),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn has_critical(&self) -> bool {
        self.issues().iter().any(Issue::is_critical)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    // Human-readable messages, in detection order
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}
