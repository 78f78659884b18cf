// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and load the configuration
// 3. Build the checkers and dispatch to the subcommand handler
// 4. Print the report
// 5. Exit with proper code (0 = success, 1 = needs attention, 2 = error)
//
// Rust concepts used:
// - async/await: The probes wait on the network, so everything runs on tokio
// - Arc<dyn Trait>: Shared, swappable transport and notifier
// - tokio::select!: Wait on whichever of several futures finishes first
// =============================================================================

mod checker;       // src/checker/ - the two health checkers
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - config file + defaults
mod env;           // src/env.rs - where the site is being served from
mod error;         // src/error.rs - typed probe errors
mod notify;        // src/notify.rs - end-of-run notifications
mod output;        // src/output.rs - report / JSON printing
mod refresh;       // src/refresh/ - auto-refresh timer
mod report;        // src/report/ - result types and status logic

// anyhow::Result for application-level errors; Context adds a message to them
use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use checker::{run_both, DeploymentIntegrationChecker, DomainHealthChecker, ReqwestTransport, Transport};
use cli::{Cli, Commands};
use config::Config;
use env::EnvironmentSnapshot;
use notify::{ConsoleNotifier, Notifier, SilentNotifier};
use output::{print_report, Report};
use refresh::AutoRefresh;
use report::{aggregate, CheckStatus};

// The #[tokio::main] attribute creates a tokio runtime and runs our async main in it
#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Everything a subcommand handler needs
struct App {
    config: Config,
    environment: EnvironmentSnapshot,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    json: bool,
}

impl App {
    fn domain_checker(&self) -> DomainHealthChecker {
        DomainHealthChecker::new(&self.config, self.transport.clone(), self.notifier.clone())
            .with_environment(self.environment.clone())
    }

    fn integration_checker(&self) -> DeploymentIntegrationChecker {
        DeploymentIntegrationChecker::new(&self.config, self.notifier.clone())
            .with_environment(self.environment.clone())
    }
}

// Returns:
//   Ok(0) = everything checks out
//   Ok(1) = warning or error status
//   Err   = could not even start (bad config, bad --url, ...)
async fn run() -> Result<i32> {
    // Parse command-line arguments (handles --help and --version for us)
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // The positional `domain` argument wins over --domain
    let domain = match &cli.command {
        Commands::Domain { target: Some(target) } => Some(target.clone()),
        _ => cli.domain.clone(),
    };
    let interval = match &cli.command {
        Commands::Watch { interval } => *interval,
        _ => None,
    };

    // File (or defaults) first, then command-line overrides, then checks
    let config = Config::load(cli.config.as_deref())?
        .with_overrides(domain, interval)
        .validate()?;

    let environment = match &cli.url {
        Some(url) => EnvironmentSnapshot::from_url(url).context("Invalid --url")?,
        None => EnvironmentSnapshot::detached(),
    };

    // With --json, stdout must stay parseable, so notifications only go to the log
    let notifier: Arc<dyn Notifier> = if cli.json {
        Arc::new(SilentNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    };

    let app = App {
        config,
        environment,
        transport: Arc::new(ReqwestTransport::new()?),
        notifier,
        json: cli.json,
    };

    // Match on which subcommand was used
    match cli.command {
        Commands::Domain { .. } => handle_domain(&app).await,
        Commands::Deploy => handle_deploy(&app).await,
        Commands::All => handle_all(&app).await,
        Commands::Watch { .. } => handle_watch(app).await,
    }
}

// Logs go to stderr so stdout stays clean for the report (and for --json).
// RUST_LOG, when set, wins over --verbose.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_domain(app: &App) -> Result<i32> {
    if !app.json {
        println!("🔍 Checking domain: {}", app.config.domain());
    }

    let result = app.domain_checker().check().await;

    let report = Report::new(app.config.domain(), &app.environment).with_domain(&result);
    print_report(&report, app.json)?;
    Ok(exit_code(report.status()))
}

async fn handle_deploy(app: &App) -> Result<i32> {
    let result = app.integration_checker().check().await;

    let report = Report::new(app.config.domain(), &app.environment).with_integration(&result);
    print_report(&report, app.json)?;
    Ok(exit_code(report.status()))
}

async fn handle_all(app: &App) -> Result<i32> {
    if !app.json {
        println!("🔍 Checking domain and hosting integration: {}", app.config.domain());
    }

    let domain = app.domain_checker();
    let integration = app.integration_checker();
    let (d, i) = run_both(&domain, &integration).await;

    let report = Report::new(app.config.domain(), &app.environment)
        .with_domain(&d)
        .with_integration(&i);
    print_report(&report, app.json)?;
    Ok(exit_code(report.status()))
}

// Keeps re-running both checks on the refresh timer.
// Printing is driven by the checkers' published results: a report is printed
// each time both have settled on a final status. Stops on Ctrl-C, letting a
// run that is in flight finish first.
async fn handle_watch(app: App) -> Result<i32> {
    let period = app.config.refresh.period();
    let app = Arc::new(app);
    let domain = Arc::new(app.domain_checker());
    let integration = Arc::new(app.integration_checker());

    if !app.json {
        println!("🔍 Watching domain and hosting integration: {}", app.config.domain());
        println!("⏱️  Re-checking every {}s, press Ctrl-C to stop", period.as_secs());
    }

    let renderer = {
        let app = app.clone();
        let mut domain_rx = domain.subscribe();
        let mut integration_rx = integration.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = domain_rx.changed() => if changed.is_err() { break },
                    changed = integration_rx.changed() => if changed.is_err() { break },
                }

                let d = domain_rx.borrow_and_update().clone();
                let i = integration_rx.borrow_and_update().clone();
                if !(d.status.is_terminal() && i.status.is_terminal()) {
                    continue;
                }

                let report = Report::new(app.config.domain(), &app.environment)
                    .with_domain(&d)
                    .with_integration(&i);
                if let Err(e) = print_report(&report, app.json) {
                    tracing::error!(error = %e, "failed to print report");
                }
            }
        })
    };

    // First round right away, then on every tick
    run_both(&domain, &integration).await;

    let refresh = {
        let domain = domain.clone();
        let integration = integration.clone();
        AutoRefresh::start(period, move || {
            let domain = domain.clone();
            let integration = integration.clone();
            async move {
                run_both(&domain, &integration).await;
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    refresh.shutdown().await;
    renderer.abort();

    let overall = aggregate(domain.result().status, integration.result().status);
    Ok(exit_code(overall))
}

// Warning counts as failure too: something needs a human to look at it
fn exit_code(status: CheckStatus) -> i32 {
    match status {
        CheckStatus::Success => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(CheckStatus::Success), 0);
        assert_eq!(exit_code(CheckStatus::Warning), 1);
        assert_eq!(exit_code(CheckStatus::Error), 1);
    }
}
