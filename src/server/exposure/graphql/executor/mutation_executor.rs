//! Mutation execution for GraphQL

use super::args::{AddStarArgs, AddUserArgs, IdArgs, UpdateStarArgs, UpdateUserArgs, parse_args};
use super::core::ExecutionContext;
use super::field_resolver::Output;
use super::utils::{self, FieldGroup};
use crate::core::error::{EntityError, GraphQLError, StarlinksResult};
use crate::server::exposure::graphql::registry::MUTATION_ROOT;

/// Resolve a root mutation field (`addUser`, `updateStar`, ...)
pub(super) async fn resolve_mutation_field<'q>(
    ctx: &ExecutionContext<'q>,
    group: &FieldGroup<'q>,
) -> StarlinksResult<Output> {
    let field_name = group.name();
    let args = utils::arguments_to_json(group.field(), &ctx.variables)?;
    let host = ctx.host;

    tracing::debug!(mutation = field_name, "resolving mutation");

    match field_name {
        "addUser" => {
            let token = parse_args::<AddUserArgs>(field_name, args)?.into_token()?;
            Ok(host.users.insert(&token).await?.into())
        }
        "addStar" => {
            let star = parse_args::<AddStarArgs>(field_name, args)?;
            Ok(host.stars.insert(star.into()).await?.into())
        }
        "updateUser" => {
            let (id, patch) = parse_args::<UpdateUserArgs>(field_name, args)?.into_patch()?;
            // Nothing to write: answer with the stored row
            let user = if patch.is_empty() {
                host.users
                    .get(id)
                    .await?
                    .ok_or_else(|| EntityError::not_found("User", id))?
            } else {
                host.users.update(id, patch).await?
            };
            Ok(user.into())
        }
        "updateStar" => {
            let (id, patch) = parse_args::<UpdateStarArgs>(field_name, args)?.into_patch();
            let star = if patch.is_empty() {
                host.stars
                    .get(id)
                    .await?
                    .ok_or_else(|| EntityError::not_found("Star", id))?
            } else {
                host.stars.update(id, patch).await?
            };
            Ok(star.into())
        }
        "deleteUser" => {
            let IdArgs { id } = parse_args(field_name, args)?;
            Ok(host.users.delete(id).await?.into())
        }
        "deleteStar" => {
            let IdArgs { id } = parse_args(field_name, args)?;
            Ok(host.stars.delete(id).await?.into())
        }
        _ => Err(GraphQLError::UnknownField {
            type_name: MUTATION_ROOT.to_string(),
            field: field_name.to_string(),
        }
        .into()),
    }
}
