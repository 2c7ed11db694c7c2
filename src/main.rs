use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use finsim::config::{Cli, Command, ServeConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,finsim=debug")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let config = ServeConfig::try_from(args)?;
            finsim::api::run_http_server(config).await
        }
    }
}
