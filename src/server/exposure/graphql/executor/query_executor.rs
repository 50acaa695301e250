//! Query execution for GraphQL

use super::args::{IdArgs, NoArgs, StarsByUserArgs, UserArgs, UserLookup, parse_args};
use super::core::ExecutionContext;
use super::field_resolver::Output;
use super::utils::{self, FieldGroup};
use crate::core::error::{EntityError, GraphQLError, StarlinksResult};
use crate::core::identity::select_or_insert_by_token;
use crate::server::exposure::graphql::registry::QUERY_ROOT;

/// Resolve a root query field (`user`, `star`, `stars`, `allStars`)
pub(super) async fn resolve_query_field<'q>(
    ctx: &ExecutionContext<'q>,
    group: &FieldGroup<'q>,
) -> StarlinksResult<Output> {
    let field_name = group.name();
    let args = utils::arguments_to_json(group.field(), &ctx.variables)?;
    let host = ctx.host;

    match field_name {
        "user" => {
            let lookup = parse_args::<UserArgs>(field_name, args)?.into_lookup()?;
            let user = match lookup {
                UserLookup::ById(id) => host
                    .users
                    .get(id)
                    .await?
                    .ok_or_else(|| EntityError::not_found("User", id))?,
                UserLookup::ByToken(token) => {
                    select_or_insert_by_token(host.users.as_ref(), &token).await?
                }
            };
            Ok(user.into())
        }
        "star" => {
            let IdArgs { id } = parse_args(field_name, args)?;
            let star = host
                .stars
                .get(id)
                .await?
                .ok_or_else(|| EntityError::not_found("Star", id))?;
            Ok(star.into())
        }
        "stars" => {
            let StarsByUserArgs { user_id } = parse_args(field_name, args)?;
            Ok(host.stars.find_by_user(user_id).await?.into())
        }
        "allStars" => {
            let NoArgs {} = parse_args(field_name, args)?;
            Ok(host.stars.list().await?.into())
        }
        _ => Err(GraphQLError::UnknownField {
            type_name: QUERY_ROOT.to_string(),
            field: field_name.to_string(),
        }
        .into()),
    }
}
