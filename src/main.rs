use anyhow::Context;
use media_studio::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    media::{CloudinaryClient, MediaState},
    policy::AccessPolicy,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, connects and migrates the database, wires the
/// media service and access policy into the shared state, then serves HTTP.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    // 2. Logging: RUST_LOG wins, otherwise sensible development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "media_studio=debug,tower_http=info".into());

    // Pretty output locally, JSON for log aggregation in production.
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
    if config.dev_identity_bypass() {
        tracing::warn!(
            "x-user-id header authentication is enabled; set APP_ENV=production for deployments"
        );
    }

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .context("failed to connect to Postgres, check DATABASE_URL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Media service. Without credentials (local only) uploads answer 500 but
    // listings still render delivery URLs.
    if config.media.is_none() {
        tracing::warn!("media service credentials missing, uploads are disabled");
    }
    let media = Arc::new(CloudinaryClient::new(
        config.media.clone().unwrap_or_default(),
    )) as MediaState;

    // 5. Access policy allow-lists, compiled once.
    let policy = Arc::new(AccessPolicy::standard().context("invalid route exclusion pattern")?);

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        media,
        config,
        policy,
    };

    // 6. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /_docs");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
