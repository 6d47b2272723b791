// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rentio - a tenancy and rent-ledger Telegram bot.
//!
//! This is the binary entry point for the Rentio bot.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Rentio - a tenancy and rent-ledger Telegram bot.
#[derive(Parser, Debug)]
#[command(name = "rentio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Rentio bot server.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match rentio_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rentio_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("rentio serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("rentio: use --help for available commands");
        }
    }
}
