//! QuickPick CLI - storefront and back-office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password may also come from QUICKPICK_PASSWORD)
//! qp login -e me@example.com -p secret
//!
//! # Browse and check out
//! qp catalog products --search milk
//! qp checkout --item 65f0a:2 --address a1 --payment cash --promo SAVE10
//!
//! # Wallet
//! qp wallet add 25
//!
//! # Back office
//! qp admin login -e admin@example.com -p secret
//! qp admin orders --status pending
//! qp admin order-status 65f0c shipped
//! ```
//!
//! # Environment Variables
//!
//! - `QUICKPICK_API_URL` - API base URL (required)
//! - `QUICKPICK_SESSION_PATH` / `QUICKPICK_ADMIN_SESSION_PATH` - session files
//! - `QUICKPICK_TIMEOUT_SECS` - request timeout (default 30)
//! - `QUICKPICK_LOCALE` - content locale (default `en`)
//! - `SENTRY_DSN` - error tracking (optional)
//! - `RUST_LOG` - log filter (default `quickpick=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::admin::AdminAction;
use commands::shop::ShopCommand;
use output::Output;

#[derive(Parser)]
#[command(name = "qp")]
#[command(author, version, about = "QuickPick command-line client")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Shop(ShopCommand),
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickpick=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let out = Output::new(cli.json);
    match cli.command {
        Commands::Shop(command) => commands::shop::run(command, &out).await,
        Commands::Admin { action } => commands::admin::run(action, &out).await,
    }
}
