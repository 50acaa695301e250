//! Server module for building the HTTP server
//!
//! This module provides a `ServerBuilder` that wires:
//! - the user and star gateways into a transport-agnostic `ServerHost`
//! - the REST exposure (health checks, OAuth callback)
//! - the GraphQL exposure (endpoint, playground, SDL)

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use host::ServerHost;
