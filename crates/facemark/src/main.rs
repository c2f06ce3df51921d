// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facemark - face-verified attendance tracking backend.
//!
//! This is the binary entry point for the Facemark server.

mod serve;

use clap::{Parser, Subcommand};

/// Facemark - face-verified attendance tracking backend.
#[derive(Parser, Debug)]
#[command(name = "facemark", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway and comparison worker.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match facemark_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("facemark: {error}");
            }
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("facemark serve: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("facemark: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = facemark_config::load_and_validate()
            .expect("default config should be valid");
        assert_eq!(config.service.name, "facemark");
    }
}
