//! WindWatts CLI - wind speed and energy production estimates from the command line.

use clap::Parser;
use std::time::Duration;
use ww_api::client::{ClientConfig, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(
    name = "ww-cli",
    version,
    about = "WindWatts wind resource and energy production toolkit"
)]
struct Cli {
    /// Base URL of the WindWatts API
    #[arg(long, global = true, env = "WINDWATTS_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: ww_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = ClientConfig {
        base_url: cli.api_url,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    ww_cmd::run(cli.command, config).await
}
