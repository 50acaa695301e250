//! # Starlinks
//!
//! GraphQL backend for a social bookmarking service. Users are identified
//! by an opaque access token and own a list of starred links.
//!
//! ## Features
//!
//! - **GraphQL API**: queries and mutations over `User` and `Star`, with
//!   per-field error isolation and lazily resolved `User.stars`
//! - **Find-or-create by token**: looking a user up by token inserts the
//!   user on first sight
//! - **Pluggable persistence**: in-memory stores for development and tests,
//!   PostgreSQL behind the `postgres` feature
//! - **OAuth login**: `/auth` trades a GitHub authorization code for a token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starlinks::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_in_memory_store()
//!         .serve("0.0.0.0:4000")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{GithubTokenExchange, TokenExchange},
        entity::{Entity, NewStar, Star, StarPatch, User, UserPatch},
        error::{StarlinksError, StarlinksResult},
        identity::select_or_insert_by_token,
        service::{StarService, UserService},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryStarService, InMemoryUserService};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresStarService, PostgresUserService, ensure_schema};

    // === Config ===
    pub use crate::config::{DatabaseConfig, OAuthConfig, ServerConfig, StarlinksConfig};

    // === Server ===
    pub use crate::server::exposure::graphql::{GraphQLExecutor, GraphQLRequest, GraphQLResponse};
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{Router, routing::get};
}
