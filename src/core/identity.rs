//! Select-or-insert of users keyed by their opaque token

use crate::core::entity::User;
use crate::core::error::{StarlinksError, StarlinksResult, StorageError};
use crate::core::service::UserService;

/// How many insert races to absorb before giving up.
///
/// A second lost race only happens if the winning row is deleted between our
/// conflicting insert and the follow-up lookup.
const MAX_UPSERT_ATTEMPTS: usize = 3;

/// Return the user holding `token`, creating it if no such user exists.
///
/// Concurrent first calls for the same token all observe the same row: the
/// store's unique constraint lets exactly one insert through, and every loser
/// turns its conflict into a lookup instead of reporting it.
pub async fn select_or_insert_by_token(
    users: &dyn UserService,
    token: &str,
) -> StarlinksResult<User> {
    for attempt in 1..=MAX_UPSERT_ATTEMPTS {
        if let Some(user) = users.find_by_token(token).await? {
            return Ok(user);
        }

        match users.insert(token).await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "created user on first token lookup");
                return Ok(user);
            }
            Err(err) if err.is_conflict() => {
                tracing::debug!(attempt, "lost token insert race, retrying as lookup");
            }
            Err(err) => return Err(err),
        }
    }

    Err(StarlinksError::Storage(StorageError::IntegrityError {
        message: format!(
            "token lookup did not settle after {} attempts",
            MAX_UPSERT_ATTEMPTS
        ),
    }))
}
