//! Persistence Gateway implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryStarService, InMemoryUserService};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresStarService, PostgresUserService, ensure_schema};
