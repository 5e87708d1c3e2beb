//! Shop Smoke CLI - API smoke checks and feature-file tools.
//!
//! # Usage
//!
//! ```bash
//! # Check that the auth flow works end to end
//! shop-smoke auth
//!
//! # Check catalog, cart, checkout and order history
//! shop-smoke workflow --base-url http://localhost:3001
//!
//! # Mark the default features as passing in feature_list.json
//! shop-smoke features mark
//!
//! # List failing features
//! shop-smoke features status --limit 10
//! ```
//!
//! # Commands
//!
//! - `auth` - Authentication flow check
//! - `workflow` - E-commerce workflow check
//! - `features mark` - Mark features as passing
//! - `features status` - Show feature pass/fail totals
//!
//! Exits with status 1 at the first failing check.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shop_smoke_cli::checks::{auth, workflow};
use shop_smoke_cli::commands::features::{self, DEFAULT_STATUS_LIMIT, DEFAULT_TARGETS};
use shop_smoke_cli::config::SmokeConfig;
use shop_smoke_cli::probe::ApiProbe;
use shop_smoke_cli::report::StdoutReporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shop-smoke")]
#[command(author, version, about = "Smoke checks for the shop API")]
struct Cli {
    /// Log HTTP calls and file operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Shop API base URL (overrides `SMOKE_BASE_URL`)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check unauthenticated rejection, login and authenticated access
    Auth,
    /// Check catalog, cart, checkout and order history
    Workflow,
    /// Maintain the feature-tracking file
    Features {
        #[command(subcommand)]
        action: FeaturesAction,
    },
}

#[derive(Subcommand)]
enum FeaturesAction {
    /// Mark features as passing and rewrite the file
    Mark {
        /// Feature file (overrides `SMOKE_FEATURE_FILE`)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Exact description to mark; repeatable. Defaults to the standard set.
        #[arg(short, long = "description")]
        descriptions: Vec<String>,

        /// Fail without writing if any description is not in the file
        #[arg(long)]
        strict: bool,
    },
    /// Show pass/fail totals and the first failing features
    Status {
        /// Feature file (overrides `SMOKE_FEATURE_FILE`)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// How many failing features to list
        #[arg(short, long, default_value_t = DEFAULT_STATUS_LIMIT)]
        limit: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "shop_smoke=debug,shop_smoke_cli=debug"
    } else {
        "shop_smoke=warn,shop_smoke_cli=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SmokeConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::info!(base_url = %config.base_url, "Configuration loaded");

    let mut out = StdoutReporter;
    match cli.command {
        Commands::Auth => {
            let probe = ApiProbe::new(config.base_url)?;
            auth::run(&probe, &config.credentials, &mut out).await?;
        }
        Commands::Workflow => {
            let probe = ApiProbe::new(config.base_url)?;
            workflow::run(&probe, &config.credentials, &mut out).await?;
        }
        Commands::Features { action } => match action {
            FeaturesAction::Mark {
                file,
                descriptions,
                strict,
            } => {
                let path = file.unwrap_or(config.feature_file);
                let targets: Vec<&str> = if descriptions.is_empty() {
                    DEFAULT_TARGETS.to_vec()
                } else {
                    descriptions.iter().map(String::as_str).collect()
                };
                features::mark(&path, &targets, strict, &mut out).await?;
            }
            FeaturesAction::Status { file, limit } => {
                let path = file.unwrap_or(config.feature_file);
                features::status(&path, limit, &mut out).await?;
            }
        },
    }
    Ok(())
}
