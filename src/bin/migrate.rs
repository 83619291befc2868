#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use clap::Parser;
use kbase_server::config::{DEFAULT_TABLES, TelemetryConfig};
use kbase_server::migration::{self, MigrateConfig};
use kbase_server::telemetry;
use std::process::ExitCode;

#[allow(clippy::print_stdout)]
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = MigrateConfig::parse();
    let telemetry_guard = telemetry::init_telemetry(&TelemetryConfig::default())?;

    let code = match migration::run(&config).await {
        Ok(()) => {
            tracing::info!("Migration completed successfully");
            println!("Tables created:");
            for table in DEFAULT_TABLES {
                println!("  - {table}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            println!("\n{}", migration::manual_instructions(&config));
            ExitCode::FAILURE
        }
    };

    telemetry_guard.shutdown();
    Ok(code)
}
