//! Record types stored by the Persistence Gateway
//!
//! `User` and `Star` are full rows with store-generated ids. Writes go through
//! the companion shapes: [`NewStar`] for inserts and the patch types for
//! partial updates, where every updatable field is an `Option` so that
//! "not supplied" and "set to zero/empty" stay distinguishable.

use serde::{Deserialize, Serialize};

/// Base trait for the two record kinds.
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    /// Type name as exposed on the query surface (e.g., "User")
    fn entity_type() -> &'static str;

    /// Store-generated primary key
    fn id(&self) -> i32;
}

/// An identity record keyed by a unique opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: i32,
    pub token: String,
}

impl Entity for User {
    fn entity_type() -> &'static str {
        "User"
    }

    fn id(&self) -> i32 {
        self.id
    }
}

/// A saved link owned by a user.
///
/// `user_id` is not checked against existing users; a star may outlive
/// its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub img: String,
    pub link: String,
}

impl Entity for Star {
    fn entity_type() -> &'static str {
        "Star"
    }

    fn id(&self) -> i32 {
        self.id
    }
}

impl Star {
    /// Materialize an inserted star with its assigned id
    pub fn from_new(id: i32, new: NewStar) -> Self {
        Self {
            id,
            name: new.name,
            user_id: new.user_id,
            img: new.img,
            link: new.link,
        }
    }
}

/// All writable fields of a star, as required by insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStar {
    pub name: String,
    pub user_id: i32,
    pub img: String,
    pub link: String,
}

/// Sparse user update. `None` leaves the stored token untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub token: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
    }

    /// Merge the supplied fields into `user`
    pub fn apply_to(&self, user: &mut User) {
        if let Some(token) = &self.token {
            user.token = token.clone();
        }
    }
}

/// Sparse star update. Every `Some` is written, including `Some(0)` and
/// `Some(String::new())`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarPatch {
    pub name: Option<String>,
    pub user_id: Option<i32>,
    pub img: Option<String>,
    pub link: Option<String>,
}

impl StarPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.user_id.is_none() && self.img.is_none() && self.link.is_none()
    }

    /// Merge the supplied fields into `star`
    pub fn apply_to(&self, star: &mut Star) {
        if let Some(name) = &self.name {
            star.name = name.clone();
        }
        if let Some(user_id) = self.user_id {
            star.user_id = user_id;
        }
        if let Some(img) = &self.img {
            star.img = img.clone();
        }
        if let Some(link) = &self.link {
            star.link = link.clone();
        }
    }
}
