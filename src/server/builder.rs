//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use crate::core::auth::TokenExchange;
use crate::core::service::{StarService, UserService};
use crate::storage::{InMemoryStarService, InMemoryUserService};
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the starlinks HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_in_memory_store()
///     .build()?;
/// ```
pub struct ServerBuilder {
    users: Option<Arc<dyn UserService>>,
    stars: Option<Arc<dyn StarService>>,
    token_exchange: Option<Arc<dyn TokenExchange>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            users: None,
            stars: None,
            token_exchange: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the user gateway (required)
    pub fn with_user_service(mut self, service: impl UserService + 'static) -> Self {
        self.users = Some(Arc::new(service));
        self
    }

    /// Set the star gateway (required)
    pub fn with_star_service(mut self, service: impl StarService + 'static) -> Self {
        self.stars = Some(Arc::new(service));
        self
    }

    /// Back both gateways with fresh in-memory stores
    pub fn with_in_memory_store(self) -> Self {
        self.with_user_service(InMemoryUserService::new())
            .with_star_service(InMemoryStarService::new())
    }

    /// Enable `/auth` with the given authorization-code exchange
    pub fn with_token_exchange(mut self, exchange: impl TokenExchange + 'static) -> Self {
        self.token_exchange = Some(Arc::new(exchange));
        self
    }

    /// Add custom routes to the server
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{Router, routing::get};
    ///
    /// let extra = Router::new().route("/version", get(|| async { "1" }));
    ///
    /// ServerBuilder::new()
    ///     .with_in_memory_store()
    ///     .with_custom_routes(extra)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Fails when either gateway is missing.
    pub fn build_host(self) -> Result<ServerHost> {
        let users = self.users.ok_or_else(|| {
            anyhow!("User service is required. Call .with_user_service() or .with_in_memory_store()")
        })?;
        let stars = self.stars.ok_or_else(|| {
            anyhow!("Star service is required. Call .with_star_service() or .with_in_memory_store()")
        })?;

        let mut host = ServerHost::new(users, stars);
        if let Some(exchange) = self.token_exchange {
            host = host.with_token_exchange(exchange);
        }

        Ok(host)
    }

    /// Build the final router
    ///
    /// Merges the REST routes (health, `/auth`, custom) with the GraphQL
    /// routes and wraps them in request tracing and permissive CORS.
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);

        let rest_router = RestExposure::build_router(host.clone(), custom_routes)?;
        let graphql_router = GraphQLExposure::build_router(host)?;

        Ok(rest_router.merge(graphql_router).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_in_memory_store()
    ///     .serve("0.0.0.0:4000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
///
/// A handler that cannot be installed never fires; the other one still can.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
