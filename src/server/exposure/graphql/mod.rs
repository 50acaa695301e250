//! GraphQL API exposure
//!
//! This module provides the GraphQL endpoint, the playground and the SDL
//! export. It only depends on the transport-agnostic [`ServerHost`].

mod executor;
pub mod registry;

pub use executor::{
    ErrorExtensions, GraphQLExecutor, GraphQLRequest, GraphQLResponse, Location, PathSegment,
    ResponseError,
};

use crate::core::error::{StarlinksError, ValidationError};
use crate::server::host::ServerHost;
use anyhow::Result;
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use axum::{
    Router,
    extract::{
        Extension, Json as AxumJson, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Query-string form of a request (`GET /graphql?query=...`)
#[derive(Debug, Deserialize)]
struct GraphQLQueryParams {
    #[serde(default)]
    query: String,
    /// JSON-encoded variables object
    variables: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
}

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// Returns a router with:
    /// - `POST /graphql` (JSON body) and `GET /graphql?query=...`
    /// - `GET /graphql/playground`
    /// - `GET /graphql/schema` (SDL)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = builder.build_host()?;
    /// let graphql_app = GraphQLExposure::build_router(host)?;
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let router = Router::new()
            .route("/graphql", get(graphql_get_handler).post(graphql_post_handler))
            .route("/graphql/playground", get(graphql_playground))
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(host));

        Ok(router)
    }
}

/// Handler for GraphQL queries and mutations sent as JSON
///
/// A body that is not a request object still gets the `{data, errors}`
/// envelope with status 200.
async fn graphql_post_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    request: Result<AxumJson<GraphQLRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match request {
        Ok(AxumJson(request)) => request,
        Err(rejection) => return AxumJson(malformed_request(rejection.body_text())),
    };

    let executor = GraphQLExecutor::new(host);
    AxumJson(executor.execute(request).await)
}

/// Handler for GraphQL requests sent in the query string
async fn graphql_get_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    params: Result<Query<GraphQLQueryParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return AxumJson(malformed_request(rejection.body_text())),
    };

    let variables = match params.variables.as_deref().map(parse_variables).transpose() {
        Ok(variables) => variables,
        Err(error) => return AxumJson(GraphQLResponse::from_error(&error, None)),
    };

    let request = GraphQLRequest {
        query: params.query,
        variables,
        operation_name: params.operation_name,
    };

    let executor = GraphQLExecutor::new(host);
    AxumJson(executor.execute(request).await)
}

fn malformed_request(message: String) -> GraphQLResponse {
    tracing::debug!(%message, "rejected malformed GraphQL request");
    let error: StarlinksError = ValidationError::InvalidJson { message }.into();
    GraphQLResponse::from_error(&error, None)
}

fn parse_variables(raw: &str) -> Result<Map<String, Value>, StarlinksError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ValidationError::InvalidJson {
            message: "variables must be a JSON object".to_string(),
        }
        .into()),
    }
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        host.registry.to_sdl(),
    )
}
