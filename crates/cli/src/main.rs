//! ShipLogic checkout CLI - session migration and carrier tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! shiplogic-cli migrate
//!
//! # Quote a package file with the configured shop and carrier
//! shiplogic-cli quote --file package.json --opt-in 12 --insurance
//!
//! # Look up a shipment
//! shiplogic-cli track TCG12345
//! shiplogic-cli shipments TCG12345
//! shiplogic-cli label 98765
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shiplogic-cli")]
#[command(author, version, about = "ShipLogic checkout CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the checkout session table
    Migrate,
    /// Quote a package file
    Quote {
        /// Package file (JSON, or YAML with a .yaml/.yml extension)
        #[arg(short, long)]
        file: PathBuf,

        /// Regular opt-in id to apply (repeatable)
        #[arg(long = "opt-in")]
        opt_ins: Vec<i64>,

        /// Time-based opt-in id to apply (repeatable)
        #[arg(long = "time-based")]
        time_based: Vec<i64>,

        /// Declare the cart value for insurance
        #[arg(long)]
        insurance: bool,
    },
    /// Tracking events for a tracking reference
    Track {
        reference: String,
    },
    /// Shipments matching a tracking reference
    Shipments {
        reference: String,
    },
    /// Label for a shipment
    Label {
        shipment_id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiplogic_cli=info,shiplogic_checkout=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output = match cli.command {
        Commands::Migrate => {
            commands::migrate::sessions().await?;
            return Ok(());
        }
        Commands::Quote {
            file,
            opt_ins,
            time_based,
            insurance,
        } => {
            let options = commands::quote::QuoteOptions {
                opt_ins,
                time_based_opt_ins: time_based,
                insurance,
            };
            commands::quote::run(&file, options).await?
        }
        Commands::Track { reference } => commands::shipments::track(&reference).await?,
        Commands::Shipments { reference } => {
            commands::shipments::by_reference(&reference).await?
        }
        Commands::Label { shipment_id } => commands::shipments::label(&shipment_id).await?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
