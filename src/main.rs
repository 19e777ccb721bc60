use bountiful_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    identity::{GitHubClient, IdentityState},
    store::{MemoryStore, PostgresStore, StoreState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, opens the document store and the GitHub client,
/// then serves the API until the process is stopped.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose defaults for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bountiful_api=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Document store: Postgres when configured, otherwise in-memory (local only).
    let store: StoreState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            let store = PostgresStore::new(pool);
            store
                .ensure_schema()
                .await
                .expect("FATAL: Failed to create the collection tables.");
            Arc::new(store) as StoreState
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on exit.");
            Arc::new(MemoryStore::new()) as StoreState
        }
    };

    // 4. Identity provider
    let identity = Arc::new(GitHubClient::new(&config)) as IdentityState;

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        store,
        identity,
        config,
    });

    // 5. Server
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
