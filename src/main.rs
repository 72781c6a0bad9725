//! # enhance - explain selected page text with an LLM
//!
//! Entry point for the `enhance` CLI.
//!
//! ## Modes
//! - `explain` / `continue` / `context` on a page from a file, URL, or stdin
//! - `config` and `models` for settings management
//! - `host` to serve a browser extension over native messaging

mod cli;
mod run;

use std::error::Error;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands, ConfigSubcommand};
use enhance::core::settings::SettingsStore;
use enhance::core::{app, confirm};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    match dispatch(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the selected command. `Ok(false)` means it ran but reported failure.
async fn dispatch(args: Args) -> Result<bool, Box<dyn Error>> {
    match args.command {
        Commands::Explain {
            page,
            continue_chat,
        } => run::run_explain(&page, continue_chat).await?,
        Commands::Continue { page, print } => run::run_continue(&page, print).await?,
        Commands::Context { page } => run::run_context(&page).await?,
        Commands::Config { subcommand } => {
            let store = SettingsStore::open_default()?;
            match subcommand.unwrap_or(ConfigSubcommand::Show) {
                ConfigSubcommand::Show => enhance::core::cli::run_config_show(&store)?,
                ConfigSubcommand::Set(set) => {
                    enhance::core::cli::run_config_set(&store, &set.changes())?
                }
                ConfigSubcommand::Reset { yes } => {
                    let confirm = if yes {
                        confirm::assume_yes()
                    } else {
                        confirm::default_confirm()
                    };
                    enhance::core::cli::run_config_reset(&store, &confirm)?
                }
                ConfigSubcommand::Test(overrides) => {
                    let handler = run::message_handler(run::http_client()?)?;
                    return Ok(
                        enhance::core::cli::run_config_test(&handler, &overrides.changes()).await?,
                    );
                }
            }
        }
        Commands::Models { provider } => {
            let store = SettingsStore::open_default()?;
            enhance::core::cli::run_models(&store, provider.as_deref())?
        }
        Commands::Host { .. } => run::run_host().await?,
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, app::NAME, &mut std::io::stdout());
        }
    }
    Ok(true)
}
