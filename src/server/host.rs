//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds everything an exposure needs to serve requests: the
//! two gateways, the type registry, and the optional token-exchange
//! collaborator. It is the single source of truth for application state and
//! knows nothing about HTTP.

use crate::core::auth::TokenExchange;
use crate::core::service::{StarService, UserService};
use crate::server::exposure::graphql::registry::Registry;
use std::sync::Arc;

/// Host context containing all service state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(users, stars);
///
/// let host = Arc::new(host);
/// let rest_app = RestExposure::build_router(host.clone(), vec![])?;
/// let graphql_app = GraphQLExposure::build_router(host)?;
/// ```
pub struct ServerHost {
    /// User gateway
    pub users: Arc<dyn UserService>,

    /// Star gateway
    pub stars: Arc<dyn StarService>,

    /// Type & Field Registry the executor validates against
    pub registry: Arc<Registry>,

    /// Authorization-code exchange backing `/auth`
    ///
    /// `None` when OAuth is not configured.
    pub token_exchange: Option<Arc<dyn TokenExchange>>,
}

impl ServerHost {
    pub fn new(users: Arc<dyn UserService>, stars: Arc<dyn StarService>) -> Self {
        Self {
            users,
            stars,
            registry: Arc::new(Registry::new()),
            token_exchange: None,
        }
    }

    /// Set the token exchange used by `/auth`
    pub fn with_token_exchange(mut self, exchange: Arc<dyn TokenExchange>) -> Self {
        self.token_exchange = Some(exchange);
        self
    }

    /// Get a reference to the token exchange (if configured)
    pub fn token_exchange(&self) -> Option<&Arc<dyn TokenExchange>> {
        self.token_exchange.as_ref()
    }
}
