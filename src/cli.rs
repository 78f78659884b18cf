// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - domain: reachability / SSL / DNS check of the custom domain
// - deploy: hosting-integration inference (no network)
// - all:    both checks side by side plus an overall status
// - watch:  `all`, then again on a timer until Ctrl-C
//
// Global flags (--domain, --url, --json, ...) work with every subcommand.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "domain-guardian",
    version = "0.1.0",
    about = "Diagnose whether a custom domain and a static-hosting deployment are wired together",
    long_about = "domain-guardian probes a custom domain (HTTPS, HTTP fallback, DNS, www) and infers \
                  whether the repository-to-hosting pipeline is connected. It reports a heuristic, \
                  best-effort status for humans, or JSON for scripts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// The custom domain to check (overrides target_domain from the config file)
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// URL the site is currently being served from
    ///
    /// Example: --url https://my-site.lovable.app/debug
    /// Leave it out when running from a terminal.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output results in JSON format instead of a report
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logs for every probe
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check reachability, SSL and DNS of the custom domain
    ///
    /// Example: domain-guardian domain example.com
    Domain {
        /// Domain to check (same as --domain)
        #[arg(value_name = "DOMAIN")]
        target: Option<String>,
    },

    /// Infer whether the hosting pipeline and custom domain are connected
    Deploy,

    /// Run both checks and print an overall status
    All,

    /// Run both checks now and then again on a timer until Ctrl-C
    ///
    /// Example: domain-guardian watch --interval 45
    Watch {
        /// Seconds between runs (kept between 30 and 60)
        #[arg(long)]
        interval: Option<u64>,
    },
}
