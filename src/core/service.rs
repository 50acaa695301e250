//! Persistence Gateway traits for users and stars
//!
//! One operation per entity per verb. Each call is a single round trip to the
//! store and reports failures as a typed [`StarlinksError`]; a missing row on
//! lookup is `Ok(None)`, a missing row on update/delete is
//! [`EntityError::NotFound`](crate::core::error::EntityError::NotFound).

use crate::core::entity::{NewStar, Star, StarPatch, User, UserPatch};
use crate::core::error::StarlinksResult;
use async_trait::async_trait;

/// Gateway for `users(id primary key, token unique)`.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Insert a user with a store-generated id
    ///
    /// A duplicate token fails with `EntityError::AlreadyExists`.
    async fn insert(&self, token: &str) -> StarlinksResult<User>;

    /// Get a user by ID
    async fn get(&self, id: i32) -> StarlinksResult<Option<User>>;

    /// Get the user holding exactly this token
    async fn find_by_token(&self, token: &str) -> StarlinksResult<Option<User>>;

    /// List all users, ordered by id
    ///
    /// No query field exposes this; it backs row counts in tests and
    /// administrative tooling.
    async fn list(&self) -> StarlinksResult<Vec<User>>;

    /// Write the supplied fields and return the stored row
    async fn update(&self, id: i32, patch: UserPatch) -> StarlinksResult<User>;

    /// Delete a user and return the removed row
    ///
    /// Stars owned by the user are left in place.
    async fn delete(&self, id: i32) -> StarlinksResult<User>;
}

/// Gateway for `stars(id primary key, name, user_id, img, link)`.
#[async_trait]
pub trait StarService: Send + Sync {
    /// Insert a star with a store-generated id
    async fn insert(&self, star: NewStar) -> StarlinksResult<Star>;

    /// Get a star by ID
    async fn get(&self, id: i32) -> StarlinksResult<Option<Star>>;

    /// List every star
    async fn list(&self) -> StarlinksResult<Vec<Star>>;

    /// Stars whose `user_id` equals `user_id`, in no guaranteed order
    async fn find_by_user(&self, user_id: i32) -> StarlinksResult<Vec<Star>>;

    /// Write the supplied fields and return the stored row
    async fn update(&self, id: i32, patch: StarPatch) -> StarlinksResult<Star>;

    /// Delete a star and return the removed row
    async fn delete(&self, id: i32) -> StarlinksResult<Star>;
}
