// src/checker/doh.rs
// =============================================================================
// DNS lookups through a public DNS-over-HTTPS JSON API.
//
// We don't resolve names ourselves. Instead we ask a resolver such as
//   https://dns.google/resolve?name=example.com&type=A
// which answers with JSON like:
//   { "Status": 0, "Answer": [ { "name": "example.com.", "type": 1,
//                                "TTL": 300, "data": "93.184.216.34" } ] }
//
// Two different failure modes matter to the caller:
// - the resolver answered, but the name does not resolve  -> DnsNotResolving
// - the resolver could not be reached or sent junk         -> ResolverUnreachable
// =============================================================================

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::transport::Transport;
use crate::error::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Deserialize)]
pub struct DohResponse {
    /// DNS RCODE, 0 = NOERROR
    #[serde(rename = "Status")]
    pub status: u32,
    /// Missing entirely when there are no records
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

// Only `data` matters to us; name, type and TTL are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct DohAnswer {
    pub data: String,
}

impl DohResponse {
    // NOERROR with at least one answer
    pub fn resolves(&self) -> bool {
        self.status == 0 && !self.answer.is_empty()
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.answer.iter().map(|a| a.data.as_str()).collect()
    }

    // Whether any answer is one of the given addresses
    pub fn points_at(&self, allow_list: &[String]) -> bool {
        self.answer
            .iter()
            .any(|a| allow_list.iter().any(|ip| ip == &a.data))
    }
}

// Builds the lookup URL for an A-record query
pub fn query_url(resolver_url: &str, domain: &str) -> ProbeResult<String> {
    let url = Url::parse_with_params(resolver_url, &[("name", domain), ("type", "A")])
        .map_err(|e| ProbeError::ResolverUnreachable(format!("bad resolver URL: {}", e)))?;
    Ok(url.to_string())
}

// Asks the resolver for the domain's A records
pub async fn lookup(
    transport: &dyn Transport,
    resolver_url: &str,
    domain: &str,
    timeout: Duration,
) -> ProbeResult<DohResponse> {
    let url = query_url(resolver_url, domain)?;

    let reply = transport
        .get_text(&url, timeout)
        .await
        .map_err(|e| ProbeError::ResolverUnreachable(e.to_string()))?;

    let response: DohResponse = serde_json::from_str(&reply.body)?;
    Ok(response)
}
