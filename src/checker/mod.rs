// src/checker/mod.rs
// =============================================================================
// This module contains the two health checkers.
//
// Submodules:
// - domain: DomainHealthChecker (reachability, SSL, DNS, www)
// - deploy: DeploymentIntegrationChecker (hosting pipeline inference)
// - transport: The Transport trait every network call goes through
// - doh: DNS-over-HTTPS lookups
//
// The two checkers share no state, so they can always run side by side.
//
// Rust concepts:
// - Trait objects: Arc<dyn Transport> lets tests swap the network out
// - watch channels: Each checker publishes its latest result to subscribers
// - futures::join: Drive two futures at once on the same task
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod deploy;
mod doh;
mod domain;
mod transport;

// Re-export public items from submodules
// This lets main.rs write `checker::DomainHealthChecker` instead of
// `checker::domain::DomainHealthChecker`
pub use deploy::DeploymentIntegrationChecker;
pub use domain::DomainHealthChecker;
pub use transport::{ReqwestTransport, Transport};

use crate::report::{DomainCheckResult, IntegrationCheckResult};

// Runs both checkers concurrently and waits for both to finish
//
// join (not spawn): both futures borrow the checkers, and neither needs its
// own task since they only wait on the network
pub async fn run_both(
    domain: &DomainHealthChecker,
    integration: &DeploymentIntegrationChecker,
) -> (DomainCheckResult, IntegrationCheckResult) {
    futures::future::join(domain.check(), integration.check()).await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is Transport a trait?
//    - The domain checker only needs "GET this" and "HEAD that"
//    - ReqwestTransport does it for real, ScriptedTransport answers from a
//      table in tests
//    - The checker holds an Arc<dyn Transport> and never knows which one
//
// 2. Why does every check return a result instead of an error?
//    - Each probe step catches its own failure and records a finding
//    - The caller always gets something printable back
//
// 3. What is `#[cfg(test)] pub mod testing`?
//    - Code that only exists when running `cargo test`
//    - Other modules' tests can reuse the test doubles from here
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::transport::testing::ScriptedTransport;
    use super::*;
    use crate::config::Config;
    use crate::env::EnvironmentSnapshot;
    use crate::notify::SilentNotifier;
    use crate::report::{aggregate, CheckStatus};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_both_on_custom_domain_is_overall_success() {
        let config = Config::default()
            .with_overrides(Some("example.com".to_string()), None)
            .validate()
            .unwrap();
        let env = EnvironmentSnapshot::from_url("https://example.com/").unwrap();

        let domain = DomainHealthChecker::new(&config, Arc::new(ScriptedTransport::new()), Arc::new(SilentNotifier))
            .with_environment(env.clone());
        let integration =
            DeploymentIntegrationChecker::new(&config, Arc::new(SilentNotifier)).with_environment(env);

        let (d, i) = run_both(&domain, &integration).await;

        assert_eq!(d.status, CheckStatus::Success);
        assert_eq!(i.status, CheckStatus::Success);
        assert_eq!(aggregate(d.status, i.status), CheckStatus::Success);
    }

    #[tokio::test]
    async fn test_run_both_from_unknown_host_is_overall_error() {
        let config = Config::default()
            .with_overrides(Some("example.com".to_string()), None)
            .validate()
            .unwrap();

        // Nothing answers: the domain check fails, the integration check warns
        let domain = DomainHealthChecker::new(&config, Arc::new(ScriptedTransport::new()), Arc::new(SilentNotifier));
        let integration = DeploymentIntegrationChecker::new(&config, Arc::new(SilentNotifier));

        let (d, i) = run_both(&domain, &integration).await;

        assert_eq!(d.status, CheckStatus::Error);
        assert_eq!(i.status, CheckStatus::Warning);
        assert_eq!(aggregate(d.status, i.status), CheckStatus::Error);
    }
}
