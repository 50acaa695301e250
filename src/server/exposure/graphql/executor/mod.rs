//! GraphQL executor module
//!
//! This module contains the executor that runs documents against the
//! Type & Field Registry and the Persistence Gateway.
//!
//! The executor is split into several sub-modules:
//! - `core`: operation selection, variables, response envelope
//! - `validation`: per-root-field document validation
//! - `args`: typed request structs for every root field
//! - `query_executor`: query resolution logic
//! - `mutation_executor`: mutation resolution logic
//! - `field_resolver`: field projection and lazy relation resolution
//! - `utils`: value conversion and field collection

mod args;
mod core;
mod field_resolver;
mod mutation_executor;
mod query_executor;
mod utils;
mod validation;

pub use self::core::{
    ErrorExtensions, GraphQLExecutor, GraphQLRequest, GraphQLResponse, Location, PathSegment,
    ResponseError,
};
