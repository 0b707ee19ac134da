//! flow - Focus Flow CLI
//!
//! A personal task manager: create and organize tasks by category and
//! priority, track completion, and view aggregate statistics.

use clap::Parser;
use flow::cli::Cli;
use flow::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG.
    // Keep startup robust in CI/robot envs: ignore invalid/huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            std::process::exit(flow::error::exit_codes::OPERATION_FAILED);
        }
    };

    if let Err(err) = runtime.block_on(cli.run()) {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
