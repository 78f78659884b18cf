// src/checker/domain.rs
// =============================================================================
// DomainHealthChecker: is the custom domain reachable, secure and resolving?
//
// One run goes through these steps in order. Each step guards its own
// network call, so a failure in one step never stops the next:
//
// 1. Local shortcut: if we are being served from the domain, reachability
//    and SSL are already proven and steps 2-3 are skipped
// 2. GET https://{domain}, looking for the edge-proxy error page
// 3. If HTTPS gave no response, GET http://{domain} as a fallback
// 4. Ask a DNS-over-HTTPS resolver for the A records
// 5. HEAD https://www.{domain} (informational only, never an error)
// 6. Derive the status from what we found
// 7. Publish the result and send one summary notification
// =============================================================================

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

use super::doh;
use super::transport::Transport;
use crate::config::{Config, TimeoutConfig};
use crate::env::EnvironmentSnapshot;
use crate::error::{ProbeError, ProbeResult};
use crate::notify::{Notification, Notifier, Variant};
use crate::report::{CheckStatus, DomainCheckResult, DomainDetails, Findings, Issue, Signal, Via};

// Text the edge proxy puts on its "cannot reach origin" page
const EDGE_PROXY_MARKERS: [&str; 2] = ["Error 1001", "DNS resolution error"];

const EDGE_CONNECTIVITY_LABEL: &str = "Edge proxy error 1001 - DNS not configured";
const EDGE_SSL_LABEL: &str = "Edge proxy active but DNS misconfigured";

const GENERIC_FAILURE: &str = "General failure while checking the domain";

pub struct DomainHealthChecker {
    domain: String,
    resolver_url: String,
    hosting_ips: Vec<String>,
    timeouts: TimeoutConfig,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    environment: EnvironmentSnapshot,
    state: watch::Sender<DomainCheckResult>,
}

impl DomainHealthChecker {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(DomainCheckResult::default());

        Self {
            domain: config.domain().to_string(),
            resolver_url: config.resolver_url.clone(),
            hosting_ips: config.hosting_ips.clone(),
            timeouts: config.timeouts.clone(),
            transport,
            notifier,
            environment: EnvironmentSnapshot::detached(),
            state,
        }
    }

    // Sets the snapshot used by the zero-argument `check()`
    pub fn with_environment(mut self, environment: EnvironmentSnapshot) -> Self {
        self.environment = environment;
        self
    }

    // The most recently published result
    pub fn result(&self) -> DomainCheckResult {
        self.state.borrow().clone()
    }

    // A receiver that wakes up every time a result is published
    pub fn subscribe(&self) -> watch::Receiver<DomainCheckResult> {
        self.state.subscribe()
    }

    pub async fn check(&self) -> DomainCheckResult {
        self.check_with(&self.environment).await
    }

    // Runs the whole check against an explicit environment snapshot
    //
    // Always returns a result; every failure ends up inside it.
    #[instrument(skip(self, environment), fields(domain = %self.domain))]
    pub async fn check_with(&self, environment: &EnvironmentSnapshot) -> DomainCheckResult {
        self.state.send_modify(|current| *current = current.begin_run());

        let started = Instant::now();
        let mut details = DomainDetails::default();
        let mut findings = Findings::new();

        let (result, notification) = match self.probe(environment, &mut details, &mut findings).await {
            Ok(()) => {
                details.response_time_ms =
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

                let notification = summarize(&details, &findings);
                let result = DomainCheckResult {
                    status: derive_status(&details, &findings),
                    details,
                    last_check: Some(Utc::now()),
                    errors: findings.messages(),
                };
                (result, notification)
            }
            Err(e) => {
                error!(error = %e, "domain check aborted");
                let result = DomainCheckResult {
                    status: CheckStatus::Error,
                    details,
                    last_check: Some(Utc::now()),
                    errors: vec![GENERIC_FAILURE.to_string()],
                };
                let notification = Notification::new(
                    "Verification error",
                    "Could not verify the domain",
                    Variant::Destructive,
                );
                (result, notification)
            }
        };

        self.state.send_replace(result.clone());
        self.notifier.notify(notification);

        result
    }

    async fn probe(
        &self,
        environment: &EnvironmentSnapshot,
        details: &mut DomainDetails,
        findings: &mut Findings,
    ) -> ProbeResult<()> {
        let https_url = probe_url("https", &self.domain)?;
        let http_url = probe_url("http", &self.domain)?;
        let www_url = probe_url("https", &format!("www.{}", self.domain))?;

        // Step 1: already being served from the domain?
        let on_custom_domain = environment.is_served_from(&self.domain);
        if on_custom_domain {
            details.is_custom_domain_active = true;
            details.connectivity = Signal::Flag(true);
            details.ssl = Signal::Flag(environment.is_secure_scheme());
            details.dns = true;
            info!("served from the custom domain, skipping reachability probes");
        } else {
            // Steps 2 and 3
            self.probe_reachability(&https_url, &http_url, details, findings)
                .await;
        }

        // Step 4
        self.probe_dns(on_custom_domain, details, findings).await;

        // Step 5
        details.redirects = match self.transport.head(&www_url, self.timeouts.www()).await {
            Ok(status) => {
                info!(status, "www subdomain responds");
                true
            }
            Err(e) => {
                warn!(error = %e, "www subdomain may not be working");
                false
            }
        };

        Ok(())
    }

    async fn probe_reachability(
        &self,
        https_url: &str,
        http_url: &str,
        details: &mut DomainDetails,
        findings: &mut Findings,
    ) {
        match self.transport.get_text(https_url, self.timeouts.https()).await {
            Ok(reply) if is_edge_proxy_error(&reply.body) => {
                mark_edge_proxy(details);
                findings.record(Issue::EdgeProxy { via: Via::Https });
                error!(status = reply.status, "edge proxy error 1001 detected over HTTPS");
            }
            Ok(reply) => {
                details.connectivity = Signal::Flag(true);
                details.ssl = Signal::Flag(true);
                info!(status = reply.status, "domain responds over HTTPS");
            }
            Err(e) => {
                warn!(error = %e, "HTTPS probe failed");
                details.connectivity = Signal::Flag(false);
                findings.record(Issue::HttpsUnreachable);

                // Whatever the fallback finds supersedes the HTTPS failure
                match self.transport.get_text(http_url, self.timeouts.http()).await {
                    Ok(reply) if is_edge_proxy_error(&reply.body) => {
                        mark_edge_proxy(details);
                        findings.record(Issue::EdgeProxy { via: Via::Http });
                        error!(status = reply.status, "edge proxy error 1001 detected over HTTP");
                    }
                    Ok(reply) => {
                        details.connectivity = Signal::Flag(true);
                        details.ssl = Signal::Flag(false);
                        findings.record(Issue::InsecureOnly);
                        warn!(status = reply.status, "domain responds only over HTTP");
                    }
                    Err(e) => {
                        findings.record(Issue::Unreachable);
                        warn!(error = %e, "domain does not respond over HTTP either");
                    }
                }
            }
        }
    }

    async fn probe_dns(&self, on_custom_domain: bool, details: &mut DomainDetails, findings: &mut Findings) {
        let outcome = doh::lookup(
            self.transport.as_ref(),
            &self.resolver_url,
            &self.domain,
            self.timeouts.resolver(),
        )
        .await;

        // Being served from the domain already proves it resolves, so the
        // lookup only adds log lines in that case
        match outcome {
            Ok(response) if response.resolves() => {
                details.dns = true;
                let addresses = response.addresses();

                if response.points_at(&self.hosting_ips) {
                    info!(?addresses, "DNS points at the hosting provider");
                } else {
                    warn!(?addresses, "DNS does not point at the hosting provider");
                }
            }
            Ok(response) => {
                warn!(status = response.status, "DNS does not resolve");
                if !on_custom_domain {
                    details.dns = false;
                    findings.record(Issue::DnsNotResolving);
                }
            }
            Err(e) => {
                warn!(error = %e, "DNS resolver lookup failed");
                if !on_custom_domain {
                    findings.record(Issue::ResolverUnreachable);
                }
            }
        }
    }
}

fn probe_url(scheme: &str, host: &str) -> ProbeResult<String> {
    let url = format!("{}://{}", scheme, host);
    url::Url::parse(&url).map_err(|e| ProbeError::InvalidDomain(format!("{}: {}", host, e)))?;
    Ok(url)
}

pub fn is_edge_proxy_error(body: &str) -> bool {
    EDGE_PROXY_MARKERS.iter().any(|marker| body.contains(marker))
}

fn mark_edge_proxy(details: &mut DomainDetails) {
    details.connectivity = Signal::Diagnostic(EDGE_CONNECTIVITY_LABEL.to_string());
    details.ssl = Signal::Diagnostic(EDGE_SSL_LABEL.to_string());
}

// Status precedence, first match wins:
// 1. edge-proxy misconfiguration       -> error
// 2. nothing wrong                     -> success
// 3. something answered, or we are on
//    the custom domain                 -> warning
// 4. otherwise                         -> error
pub fn derive_status(details: &DomainDetails, findings: &Findings) -> CheckStatus {
    if findings.has_critical() {
        CheckStatus::Error
    } else if findings.is_empty() {
        CheckStatus::Success
    } else if details.connectivity.is_truthy() || details.is_custom_domain_active {
        CheckStatus::Warning
    } else {
        CheckStatus::Error
    }
}

fn summarize(details: &DomainDetails, findings: &Findings) -> Notification {
    let title = "Domain check finished";

    if details.is_custom_domain_active {
        Notification::new(title, "Custom domain is ACTIVE!", Variant::Default)
    } else if findings.is_empty() {
        Notification::new(title, "Domain configured correctly!", Variant::Default)
    } else {
        Notification::new(
            title,
            format!("{} items to review", findings.len()),
            Variant::Destructive,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::transport::testing::ScriptedTransport;
    use super::super::transport::HttpReply;
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use std::time::Duration;

    const DOMAIN: &str = "example.com";
    const RESOLVER: &str = "https://dns.google/resolve?name=example.com&type=A";
    const RESOLVED: &str = r#"{"Status":0,"Answer":[{"data":"185.199.108.153"}]}"#;
    const NXDOMAIN: &str = r#"{"Status":3}"#;
    const EDGE_PAGE: &str = "<html><h1>Error 1001</h1><p>DNS resolution error</p></html>";

    fn checker(transport: ScriptedTransport) -> (DomainHealthChecker, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
        let config = Config::default()
            .with_overrides(Some(DOMAIN.to_string()), None)
            .validate()
            .unwrap();
        let transport = Arc::new(transport);
        let notifier = Arc::new(RecordingNotifier::default());
        let checker = DomainHealthChecker::new(&config, transport.clone(), notifier.clone());
        (checker, transport, notifier)
    }

    fn elsewhere() -> EnvironmentSnapshot {
        EnvironmentSnapshot::from_url("https://preview.lovable.app/debug").unwrap()
    }

    #[tokio::test]
    async fn test_on_custom_domain_skips_reachability_probes() {
        let (checker, transport, notifier) = checker(ScriptedTransport::new());
        let env = EnvironmentSnapshot::from_url("https://example.com/debug").unwrap();

        let result = checker.check_with(&env).await;

        assert_eq!(result.status, CheckStatus::Success);
        assert!(result.errors.is_empty());
        assert!(result.details.dns);
        assert!(result.details.is_custom_domain_active);
        assert_eq!(result.details.connectivity, Signal::Flag(true));
        assert_eq!(result.details.ssl, Signal::Flag(true));

        // Only the DNS lookup and the www probe may go out
        assert!(!transport.requested("GET", "https://example.com"));
        assert!(!transport.requested("GET", "http://example.com"));
        assert!(transport.requested("GET", RESOLVER));
        assert!(transport.requested("HEAD", "https://www.example.com"));

        assert_eq!(notifier.last().unwrap().description, "Custom domain is ACTIVE!");
    }

    #[tokio::test]
    async fn test_on_custom_domain_over_http_reports_no_ssl() {
        let (checker, _, _) = checker(ScriptedTransport::new());
        let env = EnvironmentSnapshot::from_url("http://example.com/").unwrap();

        let result = checker.check_with(&env).await;

        assert_eq!(result.details.ssl, Signal::Flag(false));
        assert_eq!(result.status, CheckStatus::Success);
    }

    #[tokio::test]
    async fn test_fully_healthy_domain() {
        let (checker, _, notifier) = checker(
            ScriptedTransport::new()
                .reply("https://example.com", 200, "<html>welcome</html>")
                .reply(RESOLVER, 200, RESOLVED)
                .reply("https://www.example.com", 301, ""),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.status, CheckStatus::Success);
        assert!(result.errors.is_empty());
        assert!(result.details.dns);
        assert!(result.details.redirects);
        assert!(!result.details.is_custom_domain_active);
        assert!(result.last_check.is_some());

        let note = notifier.last().unwrap();
        assert_eq!(note.description, "Domain configured correctly!");
        assert_eq!(note.variant, Variant::Default);
    }

    #[tokio::test]
    async fn test_http_only_domain_replaces_https_error() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .fail("https://example.com")
                .reply("http://example.com", 200, "<html>plain</html>")
                .reply(RESOLVER, 200, RESOLVED),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.details.connectivity, Signal::Flag(true));
        assert_eq!(result.details.ssl, Signal::Flag(false));
        assert_eq!(result.errors, vec![Issue::InsecureOnly.to_string()]);
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn test_http_only_and_no_dns_is_still_warning() {
        let (checker, _, notifier) = checker(
            ScriptedTransport::new()
                .reply("http://example.com", 200, "ok")
                .reply(RESOLVER, 200, NXDOMAIN),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(
            result.errors,
            vec![Issue::InsecureOnly.to_string(), Issue::DnsNotResolving.to_string()]
        );
        assert_eq!(result.status, CheckStatus::Warning);
        assert_eq!(notifier.last().unwrap().description, "2 items to review");
    }

    #[tokio::test]
    async fn test_edge_proxy_over_https_is_error_even_if_dns_resolves() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .reply("https://example.com", 530, EDGE_PAGE)
                .reply(RESOLVER, 200, RESOLVED)
                .reply("https://www.example.com", 200, ""),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(
            result.details.connectivity.diagnostic(),
            Some(EDGE_CONNECTIVITY_LABEL)
        );
        assert_eq!(result.details.ssl.diagnostic(), Some(EDGE_SSL_LABEL));
        assert!(result.details.dns);
        assert!(result.details.redirects);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("1001"));
    }

    #[tokio::test]
    async fn test_edge_proxy_over_http_replaces_https_error() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .fail("https://example.com")
                .reply("http://example.com", 530, "Error 1001")
                .reply(RESOLVER, 200, RESOLVED),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors, vec![Issue::EdgeProxy { via: Via::Http }.to_string()]);
        assert!(result.details.connectivity.is_truthy());
    }

    #[tokio::test]
    async fn test_unreachable_everywhere() {
        let (checker, _, _) = checker(ScriptedTransport::new().reply(RESOLVER, 200, RESOLVED));

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.errors, vec![Issue::Unreachable.to_string()]);
        assert_eq!(result.details.connectivity, Signal::Flag(false));
        assert!(!result.details.redirects);
        assert_eq!(result.status, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_not_dns_failure() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .reply("https://example.com", 200, "ok")
                .reply(RESOLVER, 200, "not json at all"),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.errors, vec![Issue::ResolverUnreachable.to_string()]);
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[tokio::test]
    async fn test_www_failure_is_not_an_error() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .reply("https://example.com", 200, "ok")
                .reply(RESOLVER, 200, RESOLVED)
                .fail("https://www.example.com"),
        );

        let result = checker.check_with(&elsewhere()).await;

        assert!(!result.details.redirects);
        assert!(result.errors.is_empty());
        assert_eq!(result.status, CheckStatus::Success);
    }

    #[tokio::test]
    async fn test_dns_elsewhere_than_hosting_provider_is_still_success() {
        let (checker, _, _) = checker(
            ScriptedTransport::new()
                .reply("https://example.com", 200, "ok")
                .reply(
                    RESOLVER,
                    200,
                    r#"{"Status":0,"Answer":[{"data":"93.184.216.34"}]}"#,
                )
                .reply("https://www.example.com", 200, ""),
        );

        let result = checker.check_with(&elsewhere()).await;

        // The hosting-IP allow-list is only logged
        assert!(result.details.dns);
        assert!(result.errors.is_empty());
        assert_eq!(result.status, CheckStatus::Success);
    }

    // Waits a fixed time before every GET, then answers like the inner transport
    struct DelayedTransport {
        delay: Duration,
        inner: ScriptedTransport,
    }

    #[async_trait::async_trait]
    impl Transport for DelayedTransport {
        async fn get_text(&self, url: &str, timeout: Duration) -> ProbeResult<HttpReply> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_text(url, timeout).await
        }

        async fn head(&self, url: &str, timeout: Duration) -> ProbeResult<u16> {
            self.inner.head(url, timeout).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_time_covers_the_whole_run() {
        let config = Config::default()
            .with_overrides(Some(DOMAIN.to_string()), None)
            .validate()
            .unwrap();
        let transport = DelayedTransport {
            delay: Duration::from_millis(1500),
            inner: ScriptedTransport::new()
                .reply("https://example.com", 200, "ok")
                .reply(RESOLVER, 200, RESOLVED)
                .reply("https://www.example.com", 200, ""),
        };
        let checker =
            DomainHealthChecker::new(&config, Arc::new(transport), Arc::new(RecordingNotifier::default()));

        let result = checker.check_with(&elsewhere()).await;

        // HTTPS GET + resolver GET, 1.5s each
        assert_eq!(result.details.response_time_ms, 3000);
        assert_eq!(result.status, CheckStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_runs_are_identical() {
        let (checker, _, notifier) = checker(
            ScriptedTransport::new()
                .fail("https://example.com")
                .reply("http://example.com", 200, "ok")
                .reply(RESOLVER, 200, RESOLVED),
        );

        let first = checker.check_with(&elsewhere()).await;
        let second = checker.check_with(&elsewhere()).await;

        assert_eq!(first.details, second.details);
        assert_eq!(first.status, second.status);
        assert_eq!(first.errors, second.errors);
        assert_eq!(notifier.all().len(), 2);
    }

    #[tokio::test]
    async fn test_result_is_published_to_subscribers() {
        let (checker, _, _) = checker(ScriptedTransport::new());
        let mut receiver = checker.subscribe();
        assert_eq!(checker.result().status, CheckStatus::Checking);

        let env = EnvironmentSnapshot::from_url("https://example.com").unwrap();
        let checker = checker.with_environment(env);
        let result = checker.check().await;

        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), result);
        assert_eq!(checker.result(), result);
    }

    #[tokio::test]
    async fn test_invalid_domain_hits_top_level_guard() {
        let config = Config::default().with_overrides(Some("bad host.com".to_string()), None);
        let notifier = Arc::new(RecordingNotifier::default());
        let checker = DomainHealthChecker::new(&config, Arc::new(ScriptedTransport::new()), notifier.clone());

        let result = checker.check_with(&elsewhere()).await;

        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors, vec![GENERIC_FAILURE.to_string()]);
        assert!(result.last_check.is_some());
        assert_eq!(notifier.last().unwrap().variant, Variant::Destructive);
    }

    #[test]
    fn test_edge_proxy_markers() {
        assert!(is_edge_proxy_error("... Error 1001 ..."));
        assert!(is_edge_proxy_error("DNS resolution error"));
        assert!(!is_edge_proxy_error("<html>fine</html>"));
    }
}
