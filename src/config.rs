use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;

const BIND_ADDR: &str = "BIND_ADDR";
const MARKET: &str = "MARKET";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MARKET: &str = "TEST/PAIR";

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub market: String,
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        // Load .env file
        dotenv().ok();

        let bind_addr = env::var(BIND_ADDR)
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|_| format!("failed to parse environment variable {}", BIND_ADDR))?;

        let market = env::var(MARKET).unwrap_or_else(|_| DEFAULT_MARKET.to_string());
        if !market.contains('/') {
            return Err(format!(
                "environment variable {} must look like BASE/QUOTE, got: {}",
                MARKET, market
            ));
        }

        Ok(Config { bind_addr, market })
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default address is valid"),
            market: DEFAULT_MARKET.to_string(),
        }
    }
}
