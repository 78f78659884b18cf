// src/checker/transport.rs
// =============================================================================
// The network seam: every outbound request the checkers make goes through the
// `Transport` trait.
//
// Why a trait?
// - The real implementation (ReqwestTransport) talks to the internet
// - Tests plug in a ScriptedTransport that answers from a table, so the
//   checker logic can be tested without any network access
//
// Semantics match a browser `fetch`:
// - ANY HTTP response counts as a response, even a 404 or a 502
// - Only "no response at all" (DNS failure, refused, timeout, TLS) is an error
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

// A response we got back: the status code and the body as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and read the body as text
    async fn get_text(&self, url: &str, timeout: Duration) -> ProbeResult<HttpReply>;

    /// HEAD `url`, returning only the status code
    async fn head(&self, url: &str, timeout: Duration) -> ProbeResult<u16>;
}

// The real transport, backed by one pooled reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))  // Follow up to 5 redirects
            .user_agent(concat!("domain-guardian/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_text(&self, url: &str, timeout: Duration) -> ProbeResult<HttpReply> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        debug!(url, status, "GET answered");

        // The body can still fail mid-stream (connection reset, timeout)
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        Ok(HttpReply { status, body })
    }

    async fn head(&self, url: &str, timeout: Duration) -> ProbeResult<u16> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        debug!(url, status, "HEAD answered");
        Ok(status)
    }
}
