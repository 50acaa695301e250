//! REST API exposure
//!
//! Health checks and the OAuth callback. The callback trades the
//! authorization code for an access token and then runs the token lookup
//! through the GraphQL executor, so a first login creates the user.
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.

use super::super::host::ServerHost;
use super::graphql::{GraphQLExecutor, GraphQLRequest, GraphQLResponse};
use crate::core::error::{RequestError, StarlinksError};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Extension, Query},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Find-or-create the user owning an access token
pub const LOGIN_QUERY: &str = "query Login($token: String!) { user(token: $token) { id token } }";

#[derive(Debug, Deserialize)]
struct AuthParams {
    code: Option<String>,
}

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing all service state
    /// * `custom_routes` - Additional custom routes to merge
    ///
    /// # Returns
    ///
    /// Returns an Axum router with:
    /// - Health check routes
    /// - The `/auth` OAuth callback
    /// - Custom routes
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes().merge(
            Router::new()
                .route("/auth", get(Self::auth_callback))
                .layer(Extension(host)),
        );

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "starlinks"
        }))
    }

    /// `GET /auth?code=...`
    async fn auth_callback(
        Extension(host): Extension<Arc<ServerHost>>,
        Query(params): Query<AuthParams>,
    ) -> Result<Json<GraphQLResponse>, StarlinksError> {
        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| RequestError::MissingParameter {
                parameter: "code".to_string(),
            })?;

        let exchange = host
            .token_exchange()
            .cloned()
            .ok_or_else(|| RequestError::NotConfigured {
                feature: "OAuth token exchange".to_string(),
            })?;

        let token = exchange.exchange(&code).await?;
        tracing::info!(provider = exchange.provider(), "authorization code exchanged");

        let mut variables = Map::new();
        variables.insert("token".to_string(), Value::String(token));
        let request = GraphQLRequest::new(LOGIN_QUERY).variables(variables);

        let response = GraphQLExecutor::new(host).execute(request).await;
        Ok(Json(response))
    }
}
