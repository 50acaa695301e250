//! Document validation against the registry
//!
//! Runs per root field, before its resolver: the whole sub-tree of the field
//! is checked, so a resolver never starts for a selection that cannot be
//! completed.

use graphql_parser::Pos;
use graphql_parser::query::{Field, Value as GqlValue};

use super::core::ExecutionContext;
use super::utils::FieldGroup;
use crate::core::error::{GraphQLError, StarlinksError, ValidationError};
use crate::server::exposure::graphql::registry::{FieldDef, ObjectDef, TypeRef};

/// A validation failure and where it was found
pub(super) type Located = (StarlinksError, Pos);

/// Check a field group selected on `parent`, recursively
pub(super) fn validate_field<'q>(
    ctx: &ExecutionContext<'q>,
    parent: &ObjectDef,
    group: &FieldGroup<'q>,
) -> Result<(), Located> {
    let field = group.field();

    if let Some(other) = group.fields.iter().find(|f| f.name != field.name) {
        return Err((
            GraphQLError::Selection {
                field: group.response_key.clone(),
                message: format!(
                    "fields '{}' and '{}' cannot share one response name",
                    field.name, other.name
                ),
            }
            .into(),
            other.position,
        ));
    }

    if field.name == "__typename" {
        return Ok(());
    }

    let def = parent.get_field(&field.name).ok_or_else(|| {
        (
            GraphQLError::UnknownField {
                type_name: parent.name.clone(),
                field: field.name.clone(),
            }
            .into(),
            field.position,
        )
    })?;

    for occurrence in &group.fields {
        validate_arguments(ctx, def, occurrence)?;
    }

    validate_selection(ctx, def, group)
}

fn validate_arguments(
    ctx: &ExecutionContext<'_>,
    def: &FieldDef,
    field: &Field<'_, String>,
) -> Result<(), Located> {
    for (name, value) in &field.arguments {
        let arg = def.argument(name).ok_or_else(|| {
            (
                GraphQLError::UnknownArgument {
                    field: def.name.clone(),
                    argument: name.clone(),
                }
                .into(),
                field.position,
            )
        })?;

        let matches = value_matches(ctx, value, &arg.type_ref).map_err(|e| (e, field.position))?;
        if !matches {
            return Err((
                GraphQLError::ArgumentType {
                    field: def.name.clone(),
                    argument: name.clone(),
                    expected: arg.type_ref.to_string(),
                }
                .into(),
                field.position,
            ));
        }
    }

    let missing = def
        .args
        .iter()
        .filter(|arg| arg.type_ref.is_non_null())
        .find(|arg| !field.arguments.iter().any(|(name, _)| name == &arg.name));
    if let Some(arg) = missing {
        return Err((
            ValidationError::MissingArgument {
                field: def.name.clone(),
                argument: arg.name.clone(),
            }
            .into(),
            field.position,
        ));
    }

    Ok(())
}

/// Whether an argument value can be supplied where `expected` is declared
fn value_matches(
    ctx: &ExecutionContext<'_>,
    value: &GqlValue<'_, String>,
    expected: &TypeRef,
) -> Result<bool, StarlinksError> {
    match (expected, value) {
        (_, GqlValue::Variable(name)) => {
            let (declared, has_default) = ctx.variable_types.get(name).ok_or_else(|| {
                ValidationError::InvalidVariable {
                    variable: name.clone(),
                    message: "variable is not declared by the operation".to_string(),
                }
            })?;
            Ok(declared.is_assignable_to(expected, *has_default))
        }
        (TypeRef::NonNull(_), GqlValue::Null) => Ok(false),
        (TypeRef::NonNull(inner), v) => value_matches(ctx, v, inner),
        (_, GqlValue::Null) => Ok(true),
        (TypeRef::List(inner), GqlValue::List(items)) => {
            for item in items {
                if !value_matches(ctx, item, inner)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (TypeRef::List(inner), v) => value_matches(ctx, v, inner),
        (TypeRef::Named(name), v) => Ok(match (name.as_str(), v) {
            ("Int", GqlValue::Int(n)) => n.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
            ("String", GqlValue::String(_)) => true,
            ("Boolean", GqlValue::Boolean(_)) => true,
            _ => false,
        }),
    }
}

fn validate_selection<'q>(
    ctx: &ExecutionContext<'q>,
    def: &FieldDef,
    group: &FieldGroup<'q>,
) -> Result<(), Located> {
    let position = group.field().position;
    let base = def.type_ref.base_name();
    let selections = group.sub_selections();

    if ctx.registry().is_scalar(base) {
        if selections.is_empty() {
            return Ok(());
        }
        return Err((
            GraphQLError::Selection {
                field: def.name.clone(),
                message: format!("'{}' is a scalar and has no sub-fields", base),
            }
            .into(),
            position,
        ));
    }

    let object = ctx.registry().object(base).ok_or_else(|| {
        (
            StarlinksError::Internal(format!("type '{}' is not registered", base)),
            position,
        )
    })?;

    if selections.is_empty() {
        return Err((
            GraphQLError::Selection {
                field: def.name.clone(),
                message: format!("a selection of sub-fields is required on type '{}'", base),
            }
            .into(),
            position,
        ));
    }

    let children = ctx
        .collect(&object.name, &selections)
        .map_err(|e| (e, position))?;
    for child in &children {
        validate_field(ctx, object, child)?;
    }

    Ok(())
}
