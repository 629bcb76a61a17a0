//! `chimpsync mailchimp:sync-orders`: push paid orders to Mailchimp.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use chimpsync_core::{config, Config, SqliteOrderStore, SyncFilter};
use chimpsync_mailchimp::{ClientSettings, MailchimpClient, MailchimpRegistrar};
use chimpsync_sync::{pipeline, Reporter};

use crate::console::ConsoleReporter;

/// Arguments for `chimpsync mailchimp:sync-orders`.
#[derive(Args, Debug)]
pub struct SyncOrdersArgs {
    /// With this option existing remote orders are not updated, only missing ones created.
    #[arg(long, short = 'c')]
    pub create_only: bool,

    /// Only orders created at or after this date/time (e.g. 2024-01-01 or 2024-01-01 08:00:00).
    #[arg(value_name = "created-since")]
    pub created_since: Option<String>,

    /// SQLite order database; overrides `database` in the config file.
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Config file to use instead of ~/.chimpsync/config.yaml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mailchimp API key (`<key>-<dc>`).
    #[arg(long, env = "MAILCHIMP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Mailchimp e-commerce store id.
    #[arg(long, env = "MAILCHIMP_STORE_ID")]
    pub store_id: Option<String>,
}

impl SyncOrdersArgs {
    pub fn run(self) -> Result<()> {
        let file = match self.config.as_deref() {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => config::load().context("failed to load ~/.chimpsync/config.yaml")?,
        };
        let overrides = Config {
            api_key: self.api_key,
            store_id: self.store_id,
            database: self.database,
            ..Config::default()
        };
        let resolved = file
            .merge(overrides)
            .resolve()
            .context("incomplete configuration")?;

        let store = SqliteOrderStore::open(&resolved.database).with_context(|| {
            format!(
                "cannot open order database '{}'",
                resolved.database.display()
            )
        })?;
        let client = MailchimpClient::new(ClientSettings::from(&resolved))
            .context("cannot set up the Mailchimp client")?;
        let registrar = MailchimpRegistrar::new(client);

        let mut reporter = ConsoleReporter::stdout();
        reporter.title("Synchronizing the orders to Mailchimp");

        let filter = SyncFilter::new(self.create_only, self.created_since);
        let summary = pipeline::run(&store, &registrar, &mut reporter, &filter)
            .context("order synchronization aborted")?;

        tracing::info!(
            total = summary.total,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "sync-orders finished"
        );
        Ok(())
    }
}
