//! counter-interact
//!
//! Reads and increments a deployed counter contract over JSON-RPC.
//!
//! ```text
//! config (file / env / flags)
//!     → connect → bind → read → sign → submit → confirm → read
//!     → stdout (values, tx hash) / stderr (logs, failures)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use counter_interact::lifecycle::signals::spawn_interrupt_listener;
use counter_interact::lifecycle::startup::{resolve_config, Overrides};
use counter_interact::observability::logging;
use counter_interact::{flow, Shutdown};

#[derive(Parser)]
#[command(name = "counter-interact")]
#[command(about = "Read and increment a deployed counter contract", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./interact.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Counter contract address
    #[arg(long)]
    contract: Option<String>,

    /// Chain ID used for signing
    #[arg(long)]
    chain_id: Option<u64>,

    /// Gas limit for the increment transaction
    #[arg(long)]
    gas_limit: Option<u64>,

    /// Confirmation timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Read the current counter value
    Read,
    /// Increment the counter and wait for confirmation (default)
    Increment,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = Overrides {
        endpoint: cli.endpoint.clone(),
        contract_address: cli.contract.clone(),
        chain_id: cli.chain_id,
        gas_limit: cli.gas_limit,
        confirmation_timeout_secs: cli.timeout,
    };

    let config = match resolve_config(cli.config.as_deref(), |k| std::env::var(k).ok(), &overrides)
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init(&config.observability);
    tracing::info!("counter-interact v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command.unwrap_or(Commands::Increment) {
        Commands::Read => flow::run_read(&config).await.map(|value| {
            if cli.json {
                println!("{}", serde_json::json!({ "count": value }));
            } else {
                println!("Current count: {}", value);
            }
        }),
        Commands::Increment => {
            let shutdown = Arc::new(Shutdown::new());
            let listener = spawn_interrupt_listener(shutdown.clone());
            let outcome = flow::run_increment(&config, &shutdown).await;
            listener.abort();

            outcome.map(|report| {
                if cli.json {
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{}", json),
                        Err(e) => tracing::error!(error = %e, "Failed to encode report"),
                    }
                } else {
                    println!("Count before: {}", report.before);
                    println!("Transaction hash: {}", report.tx_hash);
                    println!(
                        "Confirmed in block {} (gas used {})",
                        report.receipt.block_number, report.receipt.gas_used
                    );
                    println!("Count after: {}", report.after);
                }
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(step = %e.step, error = %e.source, "Run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
