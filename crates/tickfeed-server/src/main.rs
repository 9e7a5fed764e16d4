//! Tickfeed server - static assets and a websocket time feed on port 8088.

use anyhow::Result;
use clap::Parser;
use tickfeed_server::{config::ServerConfig, logging, server::TickfeedServer};

use logging::LogConfig;

/// Tickfeed server - streams the local time over a websocket.
#[derive(Parser, Debug)]
#[command(name = "tickfeed-server")]
#[command(about = "Serves static assets and a websocket time feed")]
#[command(version)]
struct Cli {
    /// Enable dev mode.
    #[arg(short = 'd', long = "dev")]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogConfig::default());

    let config = ServerConfig::from_dev_flag(cli.dev);
    tracing::info!(target: "tickfeed::startup", "Dev mode: {}", cli.dev);

    // A bind failure surfaces as anyhow's `Error: ...` and a non-zero exit.
    TickfeedServer::new(config).run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dev_flag_defaults_off() {
        assert!(!Cli::parse_from(["tickfeed-server"]).dev);
        assert!(Cli::parse_from(["tickfeed-server", "-d"]).dev);
    }

    #[test]
    fn test_unknown_flags_rejected() {
        assert!(Cli::try_parse_from(["tickfeed-server", "--port", "9000"]).is_err());
    }
}
