//! Starlinks server
//!
//! Reads `StarlinksConfig` (file named by `STARLINKS_CONFIG` plus
//! environment overrides), picks the persistence backend and serves the
//! REST and GraphQL routes until SIGINT/SIGTERM.

use anyhow::Result;
use starlinks::config::StarlinksConfig;
use starlinks::core::GithubTokenExchange;
use starlinks::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "starlinks=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = StarlinksConfig::load()?;

    let mut builder = with_store(ServerBuilder::new(), &config).await?;

    match config.oauth.clone() {
        Some(oauth) => {
            tracing::info!(token_url = %oauth.token_url, "OAuth login enabled");
            builder = builder.with_token_exchange(GithubTokenExchange::new(oauth));
        }
        None => tracing::info!("OAuth not configured, /auth will answer 503"),
    }

    tracing::info!("GraphQL playground at http://{}/graphql/playground", config.server.bind);
    builder.serve(&config.server.bind).await
}

#[cfg(feature = "postgres")]
async fn with_store(builder: ServerBuilder, config: &StarlinksConfig) -> Result<ServerBuilder> {
    use sqlx::postgres::PgPoolOptions;
    use starlinks::storage::{PostgresStarService, PostgresUserService, ensure_schema};

    let Some(url) = config.database.url.as_deref() else {
        tracing::info!("No database URL configured, using the in-memory store");
        return Ok(builder.with_in_memory_store());
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(url)
        .await?;
    ensure_schema(&pool).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(builder
        .with_user_service(PostgresUserService::new(pool.clone()))
        .with_star_service(PostgresStarService::new(pool)))
}

#[cfg(not(feature = "postgres"))]
async fn with_store(builder: ServerBuilder, config: &StarlinksConfig) -> Result<ServerBuilder> {
    if config.database.url.is_some() {
        tracing::warn!(
            "A database URL is configured but starlinks was built without the `postgres` feature; using the in-memory store"
        );
    } else {
        tracing::info!("No database URL configured, using the in-memory store");
    }
    Ok(builder.with_in_memory_store())
}
