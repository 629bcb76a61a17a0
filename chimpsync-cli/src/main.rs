//! chimpsync: push paid orders to Mailchimp.
//!
//! # Usage
//!
//! ```text
//! chimpsync mailchimp:sync-orders [--create-only] [created-since]
//!           [--database <path>] [--config <path>] [--api-key <key>] [--store-id <id>]
//! ```

mod commands;
mod console;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::sync_orders::SyncOrdersArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "chimpsync",
    version,
    about = "Synchronize shop data to the Mailchimp e-commerce API",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize the paid orders to Mailchimp.
    #[command(name = "mailchimp:sync-orders", visible_alias = "sync-orders")]
    SyncOrders(SyncOrdersArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::SyncOrders(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
