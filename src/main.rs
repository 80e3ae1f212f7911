use log::error;
use seating_solver::config::AppConfig;
use seating_solver::server;

const CONFIG_ENV: &str = "SEATING_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "seating.toml";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match AppConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {path}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
