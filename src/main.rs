mod admin;
mod cli;
mod config;
mod datastore;
mod db;
mod live;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use cli::args::{Cli, Commands};
use cli::{admin as admin_cli, handlers};
use config::AppConfig;
use datastore::DataStore;
use db::SqliteStore;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure the database directory exists; migrations run on open
    config.ensure_db_dir()?;
    let db_path = config.db_path()?;
    let store = SqliteStore::open(&db_path)?;

    match cli.command {
        Some(cmd) => match cmd {
            Commands::Times => handlers::handle_times(&store, &config)?,
            Commands::News { all, id } => handlers::handle_news(&store, all, id.as_deref())?,
            Commands::Events { all, id } => {
                handlers::handle_events(&store, &config, all, id.as_deref())?
            }
            Commands::Contacts => handlers::handle_contacts(&store)?,
            Commands::Admin { action } => admin_cli::handle_admin(&store, action)?,
        },

        // No subcommand → live board
        None => {
            let store = store
                .with_change_feed(config.poll_interval())
                .context("Starting change feed")?;
            let store: Arc<dyn DataStore> = Arc::new(store);
            tui::app::run(store, config)?;
        }
    }

    Ok(())
}
