// src/output.rs
// =============================================================================
// Printing check results, either as a human-readable report or as JSON.
//
// The human report has the same sections for each checker:
// - a one-line status header
// - "Details": every detail flag as ✓ / ✗ (or its diagnostic text)
// - "Problems found": the errors list
// - "Information": the info list (integration checker only)
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::env::EnvironmentSnapshot;
use crate::report::{
    aggregate, CheckStatus, DomainCheckResult, IntegrationCheckResult, IntegrationFlag, Signal,
};

// Everything printed for one round of checks
//
// Either checker may be missing when only one was run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub target_domain: &'a str,
    pub environment: &'a EnvironmentSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<CheckStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<&'a DomainCheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<&'a IntegrationCheckResult>,
}

impl<'a> Report<'a> {
    pub fn new(target_domain: &'a str, environment: &'a EnvironmentSnapshot) -> Self {
        Self {
            target_domain,
            environment,
            overall: None,
            domain: None,
            integration: None,
        }
    }

    pub fn with_domain(mut self, result: &'a DomainCheckResult) -> Self {
        self.domain = Some(result);
        self.overall = self.combined();
        self
    }

    pub fn with_integration(mut self, result: &'a IntegrationCheckResult) -> Self {
        self.integration = Some(result);
        self.overall = self.combined();
        self
    }

    // Only meaningful once both checkers have reported
    fn combined(&self) -> Option<CheckStatus> {
        match (self.domain, self.integration) {
            (Some(d), Some(i)) => Some(aggregate(d.status, i.status)),
            _ => None,
        }
    }

    // The status that decides the exit code
    pub fn status(&self) -> CheckStatus {
        self.overall
            .or_else(|| self.domain.map(|d| d.status))
            .or_else(|| self.integration.map(|i| i.status))
            .unwrap_or(CheckStatus::Checking)
    }
}

pub fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}

// Builds the human-readable report as one string
pub fn render(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!("🎯 Target domain: {}\n", report.target_domain));
    if report.environment.hostname.is_empty() {
        out.push_str("📍 Served from: (not served from any page)\n");
    } else {
        let lock = if report.environment.secure_context { " 🔒" } else { "" };
        out.push_str(&format!("📍 Served from: {}{}\n", report.environment.url, lock));
    }

    if let Some(overall) = report.overall {
        out.push_str(&format!("\n{:<40} {}\n", "Overall system status", format_status(overall)));
        out.push_str(&format!("{}\n", "=".repeat(60)));
    }

    if let Some(domain) = report.domain {
        out.push_str(&render_domain(domain));
    }

    if let Some(integration) = report.integration {
        out.push_str(&render_integration(integration));
    }

    out
}

fn render_domain(result: &DomainCheckResult) -> String {
    let d = &result.details;
    let rows = vec![
        ("dns", flag(d.dns)),
        ("connectivity", signal(&d.connectivity)),
        ("ssl", signal(&d.ssl)),
        ("www", flag(d.redirects)),
        ("responseTime", format!("{} ms", d.response_time_ms)),
        ("customDomainActive", flag(d.is_custom_domain_active)),
    ];

    render_section(
        "Custom domain",
        result.status,
        result.last_check.map(|t| t.format("%H:%M:%S").to_string()),
        &rows,
        &result.errors,
        &[],
    )
}

fn render_integration(result: &IntegrationCheckResult) -> String {
    let d = &result.details;
    let assumed = |f: IntegrationFlag, value: bool| {
        if result.assumed.contains(&f) {
            format!("{} (assumed)", flag(value))
        } else {
            flag(value)
        }
    };

    let rows = vec![
        ("connected", assumed(IntegrationFlag::Connected, d.connected)),
        ("pagesEnabled", assumed(IntegrationFlag::PagesEnabled, d.pages_enabled)),
        ("cnameExists", assumed(IntegrationFlag::CnameExists, d.cname_exists)),
        ("buildStatus", assumed(IntegrationFlag::BuildStatus, d.build_status)),
        (
            "customDomain",
            assumed(IntegrationFlag::CustomDomainConfigured, d.custom_domain_configured),
        ),
        ("dnsVerified", assumed(IntegrationFlag::DnsVerifiedByHost, d.dns_verified_by_host)),
    ];

    render_section(
        "Hosting integration",
        result.status,
        result.last_check.map(|t| t.format("%H:%M:%S").to_string()),
        &rows,
        &result.errors,
        &result.info,
    )
}

fn render_section(
    title: &str,
    status: CheckStatus,
    last_check: Option<String>,
    rows: &[(&str, String)],
    errors: &[String],
    info: &[String],
) -> String {
    let mut out = String::new();

    let stamp = last_check.map(|t| format!("  🕒 {}", t)).unwrap_or_default();
    out.push_str(&format!("\n{:<40} {}{}\n", title, format_status(status), stamp));
    out.push_str(&format!("{}\n", "-".repeat(60)));

    for (key, value) in rows {
        out.push_str(&format!("   {:<22} {}\n", key, value));
    }

    if !errors.is_empty() {
        out.push_str("\n   ⚠️  Problems found:\n");
        for error in errors {
            out.push_str(&format!("      - {}\n", error));
        }
    }

    if !info.is_empty() {
        out.push_str("\n   ℹ️  Information:\n");
        for item in info {
            out.push_str(&format!("      - {}\n", item));
        }
    }

    out
}

fn flag(value: bool) -> String {
    if value { "✓".to_string() } else { "✗".to_string() }
}

fn signal(value: &Signal) -> String {
    value
        .diagnostic()
        .map(str::to_string)
        .unwrap_or_else(|| flag(value.is_truthy()))
}

// Formats the status enum the way the table shows it
fn format_status(status: CheckStatus) -> String {
    match status {
        CheckStatus::Success => "✅ OK".to_string(),
        CheckStatus::Warning => "⚠️  ATTENTION".to_string(),
        CheckStatus::Error => "❌ ERROR".to_string(),
        CheckStatus::Checking => "🔄 CHECKING".to_string(),
    }
}
