// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kibitz - a GroupMe persona bot with an operator approval queue.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config_cmd;
mod groups;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kibitz_config::KibitzConfig;

/// Kibitz - a GroupMe persona bot with an operator approval queue.
#[derive(Parser, Debug)]
#[command(name = "kibitz", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot and the operator API (default).
    Serve,
    /// List the GroupMe groups the configured account belongs to.
    Groups,
    /// Validate and print the effective configuration with secrets redacted.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> KibitzConfig {
    let result = match path {
        Some(path) => kibitz_config::load_and_validate_path(path),
        None => kibitz_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            kibitz_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Groups => groups::run_groups(&config).await,
        Commands::Config => config_cmd::run_config(&config),
    };

    if let Err(e) = result {
        eprintln!("kibitz: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["kibitz"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["kibitz", "groups", "--config", "/tmp/k.toml"]);
        assert!(matches!(cli.command, Some(Commands::Groups)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
    }
}
