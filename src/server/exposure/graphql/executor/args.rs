//! Typed requests for each root operation
//!
//! Arguments are converted once, at the boundary, into these structs. The
//! resolvers only ever see typed values.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::entity::{NewStar, StarPatch, UserPatch};
use crate::core::error::{StarlinksResult, ValidationError};

/// Deserialize `args` into the request type of `field`
pub fn parse_args<T: DeserializeOwned>(field: &str, args: Map<String, Value>) -> StarlinksResult<T> {
    serde_json::from_value(Value::Object(args)).map_err(|e| {
        ValidationError::InvalidArguments {
            field: field.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

fn non_empty_token(field: &str, token: String) -> StarlinksResult<String> {
    if token.is_empty() {
        Err(ValidationError::FieldError {
            field: field.to_string(),
            message: "token must not be empty".to_string(),
        }
        .into())
    } else {
        Ok(token)
    }
}

/// How `user(...)` locates its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    ById(i32),
    /// Find-or-create
    ByToken(String),
}

/// `user(id: Int, token: String)`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserArgs {
    pub id: Option<i32>,
    pub token: Option<String>,
}

impl UserArgs {
    /// `id` wins when both are supplied
    pub fn into_lookup(self) -> StarlinksResult<UserLookup> {
        match (self.id, self.token) {
            (Some(id), _) => Ok(UserLookup::ById(id)),
            (None, Some(token)) => Ok(UserLookup::ByToken(non_empty_token("user", token)?)),
            (None, None) => Err(ValidationError::MissingArgument {
                field: "user".to_string(),
                argument: "id or token".to_string(),
            }
            .into()),
        }
    }
}

/// Any operation addressed by a single `id`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdArgs {
    pub id: i32,
}

/// `stars(userId: Int!)`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StarsByUserArgs {
    pub user_id: i32,
}

/// Operations without arguments
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// `addUser(token: String!)`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddUserArgs {
    pub token: String,
}

impl AddUserArgs {
    pub fn into_token(self) -> StarlinksResult<String> {
        non_empty_token("addUser", self.token)
    }
}

/// `addStar(name: String!, userId: Int!, img: String!, link: String!)`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddStarArgs {
    pub name: String,
    pub user_id: i32,
    pub img: String,
    pub link: String,
}

impl From<AddStarArgs> for NewStar {
    fn from(args: AddStarArgs) -> Self {
        NewStar {
            name: args.name,
            user_id: args.user_id,
            img: args.img,
            link: args.link,
        }
    }
}

/// `updateUser(id: Int!, token: String)`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserArgs {
    pub id: i32,
    pub token: Option<String>,
}

impl UpdateUserArgs {
    /// An empty replacement token is rejected rather than written
    pub fn into_patch(self) -> StarlinksResult<(i32, UserPatch)> {
        let token = self
            .token
            .map(|t| non_empty_token("updateUser", t))
            .transpose()?;
        Ok((self.id, UserPatch { token }))
    }
}

/// `updateStar(id: Int!, name: String, userId: Int, img: String, link: String)`
///
/// Omitted and `null` arguments both leave the stored value untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStarArgs {
    pub id: i32,
    pub name: Option<String>,
    pub user_id: Option<i32>,
    pub img: Option<String>,
    pub link: Option<String>,
}

impl UpdateStarArgs {
    pub fn into_patch(self) -> (i32, StarPatch) {
        (
            self.id,
            StarPatch {
                name: self.name,
                user_id: self.user_id,
                img: self.img,
                link: self.link,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_user_lookup_prefers_id() {
        let parsed: UserArgs = parse_args("user", args(json!({"id": 3, "token": "abc"}))).unwrap();
        assert_eq!(parsed.into_lookup().unwrap(), UserLookup::ById(3));

        let parsed: UserArgs = parse_args("user", args(json!({"token": "abc"}))).unwrap();
        assert_eq!(
            parsed.into_lookup().unwrap(),
            UserLookup::ByToken("abc".to_string())
        );
    }

    #[test]
    fn test_user_lookup_needs_an_argument() {
        let parsed: UserArgs = parse_args("user", Map::new()).unwrap();
        let err = parsed.into_lookup().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let parsed: AddUserArgs = parse_args("addUser", args(json!({"token": ""}))).unwrap();
        assert!(parsed.into_token().is_err());

        let parsed: UpdateUserArgs =
            parse_args("updateUser", args(json!({"id": 1, "token": ""}))).unwrap();
        assert!(parsed.into_patch().is_err());
    }

    #[test]
    fn test_missing_required_argument() {
        let err = parse_args::<AddStarArgs>(
            "addStar",
            args(json!({"name": "n", "img": "i", "link": "l"})),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn test_out_of_range_int_is_rejected() {
        let err = parse_args::<IdArgs>("star", args(json!({"id": 1_i64 << 40}))).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_update_star_patch_keeps_explicit_zero() {
        let parsed: UpdateStarArgs =
            parse_args("updateStar", args(json!({"id": 1, "userId": 0, "img": null}))).unwrap();
        let (id, patch) = parsed.into_patch();

        assert_eq!(id, 1);
        assert_eq!(patch.user_id, Some(0));
        assert_eq!(patch.img, None);
        assert_eq!(patch.name, None);
    }
}
