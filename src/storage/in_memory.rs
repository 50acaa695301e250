//! In-memory gateway implementations for testing and development
//!
//! Rows live in `RwLock`-guarded maps. Ids are assigned from a counter
//! starting at 1 like a `SERIAL` column, and the user table enforces the
//! unique-token constraint the relational store would.

use crate::core::entity::{NewStar, Star, StarPatch, User, UserPatch};
use crate::core::error::{EntityError, StarlinksError, StarlinksResult, StorageError};
use crate::core::service::{StarService, UserService};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in-memory";

fn poisoned(err: impl Display) -> StarlinksError {
    StorageError::Unavailable {
        backend: BACKEND.to_string(),
        message: format!("lock poisoned: {}", err),
    }
    .into()
}

fn token_taken(token: &str) -> StarlinksError {
    EntityError::AlreadyExists {
        entity_type: "User".to_string(),
        message: format!("token '{}' is already taken", token),
    }
    .into()
}

struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// In-memory user gateway
///
/// Cloning shares the underlying table.
#[derive(Clone, Default)]
pub struct InMemoryUserService {
    users: Arc<RwLock<Table<User>>>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn insert(&self, token: &str) -> StarlinksResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;

        if users.rows.values().any(|u| u.token == token) {
            return Err(token_taken(token));
        }

        let user = User {
            id: users.allocate_id(),
            token: token.to_string(),
        };
        users.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get(&self, id: i32) -> StarlinksResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.rows.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> StarlinksResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.rows.values().find(|u| u.token == token).cloned())
    }

    async fn list(&self) -> StarlinksResult<Vec<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, patch: UserPatch) -> StarlinksResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;

        if let Some(token) = &patch.token
            && users.rows.values().any(|u| u.id != id && &u.token == token)
        {
            return Err(token_taken(token));
        }

        let user = users
            .rows
            .get_mut(&id)
            .ok_or_else(|| EntityError::not_found("User", id))?;
        patch.apply_to(user);

        Ok(user.clone())
    }

    async fn delete(&self, id: i32) -> StarlinksResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        users
            .rows
            .remove(&id)
            .ok_or_else(|| EntityError::not_found("User", id).into())
    }
}

// ---------------------------------------------------------------------------
// Stars
// ---------------------------------------------------------------------------

/// In-memory star gateway
///
/// Like the relational layout, `user_id` is not checked against users.
#[derive(Clone, Default)]
pub struct InMemoryStarService {
    stars: Arc<RwLock<Table<Star>>>,
}

impl InMemoryStarService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StarService for InMemoryStarService {
    async fn insert(&self, star: NewStar) -> StarlinksResult<Star> {
        let mut stars = self.stars.write().map_err(poisoned)?;

        let star = Star::from_new(stars.allocate_id(), star);
        stars.rows.insert(star.id, star.clone());

        Ok(star)
    }

    async fn get(&self, id: i32) -> StarlinksResult<Option<Star>> {
        let stars = self.stars.read().map_err(poisoned)?;
        Ok(stars.rows.get(&id).cloned())
    }

    async fn list(&self) -> StarlinksResult<Vec<Star>> {
        let stars = self.stars.read().map_err(poisoned)?;
        Ok(stars.rows.values().cloned().collect())
    }

    async fn find_by_user(&self, user_id: i32) -> StarlinksResult<Vec<Star>> {
        let stars = self.stars.read().map_err(poisoned)?;
        Ok(stars
            .rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, patch: StarPatch) -> StarlinksResult<Star> {
        let mut stars = self.stars.write().map_err(poisoned)?;

        let star = stars
            .rows
            .get_mut(&id)
            .ok_or_else(|| EntityError::not_found("Star", id))?;
        patch.apply_to(star);

        Ok(star.clone())
    }

    async fn delete(&self, id: i32) -> StarlinksResult<Star> {
        let mut stars = self.stars.write().map_err(poisoned)?;
        stars
            .rows
            .remove(&id)
            .ok_or_else(|| EntityError::not_found("Star", id).into())
    }
}
