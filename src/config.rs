// src/config.rs
// =============================================================================
// Configuration for both checkers.
//
// Values come from three places, later ones winning:
// 1. Built-in defaults (the serde `default` functions below)
// 2. An optional TOML file passed with --config
// 3. Command-line flags (--domain, --interval)
//
// Example file:
//
//   target_domain = "example.com"
//   staging_suffixes = ["lovableproject.com", "lovable.app"]
//
//   [timeouts]
//   https_secs = 10
//
//   [refresh]
//   interval_secs = 45
// =============================================================================

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// The auto-refresh period is kept within this window
pub const MIN_REFRESH_SECS: u64 = 30;
pub const MAX_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The custom domain the site should eventually be served from
    pub target_domain: Option<String>,
    /// Hostname suffixes of the hosting platform's preview (staging) domains
    pub staging_suffixes: Vec<String>,
    /// Addresses known to belong to the static-hosting provider
    pub hosting_ips: Vec<String>,
    /// DNS-over-HTTPS JSON endpoint
    pub resolver_url: String,
    pub timeouts: TimeoutConfig,
    pub refresh: RefreshConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_domain: None,
            staging_suffixes: default_staging_suffixes(),
            hosting_ips: default_hosting_ips(),
            resolver_url: default_resolver_url(),
            timeouts: TimeoutConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

fn default_staging_suffixes() -> Vec<String> {
    vec!["lovableproject.com".to_string(), "lovable.app".to_string()]
}

// GitHub Pages apex A records
fn default_hosting_ips() -> Vec<String> {
    vec![
        "185.199.108.153".to_string(),
        "185.199.109.153".to_string(),
        "185.199.110.153".to_string(),
        "185.199.111.153".to_string(),
    ]
}

fn default_resolver_url() -> String {
    "https://dns.google/resolve".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub https_secs: u64,
    pub http_secs: u64,
    pub www_secs: u64,
    pub resolver_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            https_secs: 10,
            http_secs: 5,
            www_secs: 5,
            resolver_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn https(&self) -> Duration {
        Duration::from_secs(self.https_secs)
    }

    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_secs)
    }

    pub fn www(&self) -> Duration {
        Duration::from_secs(self.www_secs)
    }

    pub fn resolver(&self) -> Duration {
        Duration::from_secs(self.resolver_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl RefreshConfig {
    // The configured period, clamped to the allowed window
    pub fn period(&self) -> Duration {
        Duration::from_secs(
            self.interval_secs
                .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS),
        )
    }
}

impl Config {
    // Loads a config file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    // Applies command-line overrides on top of the file values
    pub fn with_overrides(mut self, domain: Option<String>, interval_secs: Option<u64>) -> Self {
        if let Some(domain) = domain {
            self.target_domain = Some(domain);
        }
        if let Some(secs) = interval_secs {
            self.refresh.interval_secs = secs;
        }
        self
    }

    // Normalizes the target domain and checks everything we rely on later
    pub fn validate(mut self) -> Result<Self> {
        let raw = self
            .target_domain
            .as_deref()
            .ok_or_else(|| anyhow!("No target domain: pass --domain or set target_domain in the config file"))?;

        self.target_domain = Some(normalize_domain(raw)?);

        url::Url::parse(&self.resolver_url)
            .with_context(|| format!("Invalid resolver_url '{}'", self.resolver_url))?;

        for ip in &self.hosting_ips {
            ip.parse::<std::net::IpAddr>()
                .with_context(|| format!("Invalid address in hosting_ips: '{}'", ip))?;
        }

        Ok(self)
    }

    // The normalized target domain (call after `validate`)
    pub fn domain(&self) -> &str {
        self.target_domain.as_deref().unwrap_or_default()
    }
}

// Normalizes a domain the user typed
//
// Accepts things people paste from a browser:
//   "https://Example.com/" -> "example.com"
//   "example.com."         -> "example.com"
pub fn normalize_domain(raw: &str) -> Result<String> {
    let domain = raw.trim().to_lowercase();

    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(&domain);

    let domain = domain.split('/').next().unwrap_or(domain);
    let domain = domain.trim_end_matches('.');

    if domain.is_empty() || !domain.contains('.') {
        return Err(anyhow!("Invalid domain name: '{}'", raw));
    }

    let valid_chars = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    let valid_labels = domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));

    if !valid_chars || !valid_labels {
        return Err(anyhow!("Invalid domain name: '{}'", raw));
    }

    Ok(domain.to_string())
}
