use anyhow::Result;
use clap::Parser;
use foodtrace_api::{api::server::start_api_server, config::Config};
use log::info;
use std::path::PathBuf;

/// FoodTrace API Arguments
#[derive(Parser)]
#[clap(name = "foodtrace")]
#[clap(about = "FoodTrace Safety API - district risk lookups and on-chain batch tracing")]
struct Args {
    /// Path to configuration file
    #[clap(long, default_value = "config/foodtrace.yaml")]
    config: PathBuf,

    /// Address to listen on
    #[clap(long)]
    host: Option<String>,

    /// API port to listen on
    #[clap(long)]
    port: Option<u16>,

    /// Path to the crop production CSV
    #[clap(long)]
    dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Config path: {:?}", args.config);
    let mut config = Config::load(Some(args.config.as_path()))?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dataset) = args.dataset {
        config.dataset.path = dataset;
    }

    info!("Dataset path: {:?}", config.dataset.path);
    info!("Ledger RPC: {}", config.ledger.rpc_url);

    start_api_server(config).await
}
