use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::{InMemoryStore, PgStore};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

fn startup_error(kind: std::io::ErrorKind, msg: &'static str) -> std::io::Error {
    std::io::Error::new(kind, msg)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(startup_error(std::io::ErrorKind::InvalidInput, "Configuration error"));
        }
    };
    if let Err(e) = configuration.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(startup_error(std::io::ErrorKind::InvalidInput, "Configuration error"));
    }
    tracing::info!(
        platform = %configuration.application.platform,
        "Configuration loaded successfully"
    );

    let state = if configuration.database.in_memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        AppState::new(&configuration, Arc::new(InMemoryStore::new()))
    } else {
        tracing::info!("Attempting to connect to database");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&configuration.database.connection_string())
            .await
            .map_err(|e| {
                tracing::error!("Failed to create connection pool: {}", e);
                startup_error(std::io::ErrorKind::ConnectionRefused, "Database connection error")
            })?;

        let store = PgStore::new(pool);
        store.migrate().await.map_err(|e| {
            tracing::error!("Failed to migrate database: {}", e);
            startup_error(std::io::ErrorKind::Other, "Database migration error")
        })?;
        tracing::info!("Database ready");

        AppState::new(&configuration, Arc::new(store))
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, state)?.await
}
