//! Core module containing the record types, gateway traits and error taxonomy

pub mod auth;
pub mod entity;
pub mod error;
pub mod identity;
pub mod service;

pub use auth::{GithubTokenExchange, TokenExchange};
pub use entity::{Entity, NewStar, Star, StarPatch, User, UserPatch};
pub use error::{StarlinksError, StarlinksResult};
pub use identity::select_or_insert_by_token;
pub use service::{StarService, UserService};
