use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use entitlement_engine::api::{AppState, create_router};
use entitlement_engine::config::{ConfigLoader, EngineConfig};
use entitlement_engine::logging;
use entitlement_engine::services::Engine;
use entitlement_engine::store::InMemoryStore;

/// Directory holding `engine.yaml`; built-in defaults are used when unset.
const CONFIG_DIR_ENV: &str = "ENGINE_CONFIG_DIR";

fn load_config() -> Result<EngineConfig, entitlement_engine::error::EngineError> {
    match env::var(CONFIG_DIR_ENV) {
        Ok(dir) => ConfigLoader::load(&dir).map(ConfigLoader::into_config),
        Err(_) => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() {
    logging::init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    let bind = config.server.bind.clone();

    let store = Arc::new(InMemoryStore::provisioned(&config.collections));
    let engine = Engine::new(store, config);
    let router = create_router(AppState::new(engine));

    let listener = match TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(bind = %bind, error = %err, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(bind = %bind, "Entitlement engine listening");

    if let Err(err) = axum::serve(listener, router).await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}
