//! Field and relation resolution for resolved records
//!
//! Scalar fields are projected from the record's serde representation.
//! Relation fields (`User.stars`) call the gateway only when the caller
//! selected them; each selected relation costs one lookup per parent record.

use futures::future::{BoxFuture, FutureExt, join_all};
use graphql_parser::Pos;
use graphql_parser::query::Selection;
use serde_json::{Map, Value, json};

use super::core::{ExecutionContext, PathSegment};
use super::utils::FieldGroup;
use crate::core::entity::{Entity, Star, User};
use crate::core::error::{StarlinksError, StarlinksResult};

/// A record produced by a resolver
#[derive(Debug, Clone)]
pub(super) enum Resolved {
    User(User),
    Star(Star),
}

impl Resolved {
    pub fn type_name(&self) -> &'static str {
        match self {
            Resolved::User(_) => User::entity_type(),
            Resolved::Star(_) => Star::entity_type(),
        }
    }

    fn to_json(&self) -> StarlinksResult<Map<String, Value>> {
        let value = match self {
            Resolved::User(user) => serde_json::to_value(user)?,
            Resolved::Star(star) => serde_json::to_value(star)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(StarlinksError::Internal(format!(
                "{} did not serialize to an object",
                self.type_name()
            ))),
        }
    }
}

/// What a field resolver returns
#[derive(Debug)]
pub(super) enum Output {
    Object(Resolved),
    List(Vec<Resolved>),
}

impl From<User> for Output {
    fn from(user: User) -> Self {
        Output::Object(Resolved::User(user))
    }
}

impl From<Star> for Output {
    fn from(star: Star) -> Self {
        Output::Object(Resolved::Star(star))
    }
}

impl From<Vec<Star>> for Output {
    fn from(stars: Vec<Star>) -> Self {
        Output::List(stars.into_iter().map(Resolved::Star).collect())
    }
}

/// Complete a resolver's output against the group's sub-selection
pub(super) async fn complete<'q>(
    ctx: &ExecutionContext<'q>,
    output: Output,
    group: &FieldGroup<'q>,
    path: Vec<PathSegment>,
) -> Value {
    let position = group.field().position;
    let selections = group.sub_selections();

    match output {
        Output::Object(item) => complete_object(ctx, item, &selections, position, path).await,
        Output::List(items) => {
            let completions = items.into_iter().enumerate().map(|(index, item)| {
                let mut item_path = path.clone();
                item_path.push(PathSegment::Index(index));
                complete_object(ctx, item, &selections, position, item_path)
            });
            Value::Array(join_all(completions).await)
        }
    }
}

/// Resolve the selected fields of a single record
fn complete_object<'a, 'q: 'a>(
    ctx: &'a ExecutionContext<'q>,
    item: Resolved,
    selections: &'a [&'q Selection<'q, String>],
    position: Pos,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Value> {
    async move { complete_object_impl(ctx, item, selections, position, path).await }.boxed()
}

/// Implementation of complete_object
async fn complete_object_impl<'q>(
    ctx: &ExecutionContext<'q>,
    item: Resolved,
    selections: &[&'q Selection<'q, String>],
    position: Pos,
    path: Vec<PathSegment>,
) -> Value {
    let type_name = item.type_name();

    let (groups, fields) = match ctx
        .collect(type_name, selections)
        .and_then(|groups| Ok((groups, item.to_json()?)))
    {
        Ok(prepared) => prepared,
        Err(error) => {
            ctx.report(error, position, &path);
            return Value::Null;
        }
    };

    let mut result = Map::new();

    for group in &groups {
        let name = group.name();
        let key = group.response_key.clone();

        if name == "__typename" {
            result.insert(key, json!(type_name));
            continue;
        }

        // Regular field (exists in the record itself)
        if let Some(value) = fields.get(name) {
            result.insert(key, value.clone());
            continue;
        }

        // Relation field, fetched only now that it is selected
        let mut child_path = path.clone();
        child_path.push(PathSegment::Key(key.clone()));
        let value = match resolve_relation(ctx, &item, name).await {
            Ok(output) => complete(ctx, output, group, child_path).await,
            Err(error) => {
                ctx.report(error, group.field().position, &child_path);
                Value::Null
            }
        };
        result.insert(key, value);
    }

    Value::Object(result)
}

async fn resolve_relation(
    ctx: &ExecutionContext<'_>,
    parent: &Resolved,
    field: &str,
) -> StarlinksResult<Output> {
    match (parent, field) {
        (Resolved::User(user), "stars") => {
            let stars = ctx.host.stars.find_by_user(user.id).await?;
            Ok(stars.into())
        }
        _ => Err(StarlinksError::Internal(format!(
            "no resolver for {}.{}",
            parent.type_name(),
            field
        ))),
    }
}
