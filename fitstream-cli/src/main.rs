//! Fitstream CLI - Command-line interface
//!
//! Provides command-line access to the Fitstream media server.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "fitstream")]
#[command(about = "A fitness coaching media server")]
struct Cli {
    /// Console log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fitstream_core::tracing_setup::init_tracing(cli.log_level, None)?;

    commands::handle_command(cli.command).await
}
