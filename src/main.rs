//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This is the main entry point for the API server.
// It initializes logging, loads the configuration and serves the order book API.
//--------------------------------------------------------------------------------------------------

use tracing::{info, Level};

use trade_engine::{Api, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = Config::from_env();
    info!(market = %config.market, "starting order book API server");

    let api = Api::new(config.bind_addr, config.market);
    api.serve().await?;

    Ok(())
}
