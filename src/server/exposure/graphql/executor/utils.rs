//! Utility functions for GraphQL execution

use graphql_parser::query::{
    Directive, Field, FragmentDefinition, Selection, TypeCondition, Value as GqlValue,
};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

use crate::core::error::{GraphQLError, StarlinksResult, ValidationError};

/// Variable values after coercion, keyed by name without `$`
pub type Variables = Map<String, Value>;

/// Fragment definitions of the current document, keyed by name
pub type Fragments<'q> = HashMap<&'q str, &'q FragmentDefinition<'q, String>>;

/// Convert a GraphQL literal to JSON, substituting variables
pub fn gql_value_to_json(value: &GqlValue<'_, String>, variables: &Variables) -> StarlinksResult<Value> {
    Ok(match value {
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => match i.as_i64() {
            Some(n) => json!(n),
            None => Value::Null,
        },
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|v| gql_value_to_json(v, variables))
                .collect::<StarlinksResult<_>>()?,
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json(v, variables)?);
            }
            Value::Object(map)
        }
        GqlValue::Variable(name) => variables.get(name).cloned().ok_or_else(|| {
            ValidationError::InvalidVariable {
                variable: name.clone(),
                message: "variable is not declared by the operation".to_string(),
            }
        })?,
    })
}

/// Field arguments as a JSON object, ready for typed deserialization
pub fn arguments_to_json(
    field: &Field<'_, String>,
    variables: &Variables,
) -> StarlinksResult<Map<String, Value>> {
    let mut args = Map::new();
    for (name, value) in &field.arguments {
        args.insert(name.clone(), gql_value_to_json(value, variables)?);
    }
    Ok(args)
}

/// Evaluate `@skip(if:)` and `@include(if:)`
pub fn should_include(
    directives: &[Directive<'_, String>],
    variables: &Variables,
) -> StarlinksResult<bool> {
    for directive in directives {
        let skip_when = match directive.name.as_str() {
            "skip" => true,
            "include" => false,
            _ => continue,
        };

        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .map(|(_, value)| gql_value_to_json(value, variables))
            .transpose()?;

        match condition {
            Some(Value::Bool(flag)) if flag == skip_when => return Ok(false),
            Some(Value::Bool(_)) => {}
            _ => {
                return Err(GraphQLError::ArgumentType {
                    field: format!("@{}", directive.name),
                    argument: "if".to_string(),
                    expected: "Boolean!".to_string(),
                }
                .into());
            }
        }
    }
    Ok(true)
}

/// All fields selected under one response key
///
/// Repeated selections of the same key (through fragments or plain
/// repetition) are merged, so their sub-selections are combined.
#[derive(Debug)]
pub struct FieldGroup<'q> {
    pub response_key: String,
    pub fields: Vec<&'q Field<'q, String>>,
}

impl<'q> FieldGroup<'q> {
    /// The first occurrence; its name, arguments and position are used
    pub fn field(&self) -> &'q Field<'q, String> {
        self.fields[0]
    }

    pub fn name(&self) -> &'q str {
        self.field().name.as_str()
    }

    /// Sub-selections of every merged occurrence
    pub fn sub_selections(&self) -> Vec<&'q Selection<'q, String>> {
        self.fields
            .iter()
            .flat_map(|f| f.selection_set.items.iter())
            .collect()
    }
}

/// Flatten a selection set for an object of `type_name` into field groups
///
/// Fragment spreads and inline fragments are inlined and `@skip`/`@include`
/// are applied. Groups keep the order of their first appearance.
pub fn collect_fields<'q>(
    fragments: &Fragments<'q>,
    variables: &Variables,
    type_name: &str,
    selections: &[&'q Selection<'q, String>],
) -> StarlinksResult<Vec<FieldGroup<'q>>> {
    let mut groups = Vec::new();
    let mut stack = Vec::new();
    collect_into(
        fragments,
        variables,
        type_name,
        selections.iter().copied(),
        &mut stack,
        &mut groups,
    )?;
    Ok(groups)
}

fn collect_into<'q>(
    fragments: &Fragments<'q>,
    variables: &Variables,
    type_name: &str,
    selections: impl Iterator<Item = &'q Selection<'q, String>>,
    stack: &mut Vec<&'q str>,
    groups: &mut Vec<FieldGroup<'q>>,
) -> StarlinksResult<()> {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if !should_include(&field.directives, variables)? {
                    continue;
                }
                let key = field.alias.as_deref().unwrap_or(field.name.as_str());
                match groups.iter_mut().find(|g| g.response_key == key) {
                    Some(group) => group.fields.push(field),
                    None => groups.push(FieldGroup {
                        response_key: key.to_string(),
                        fields: vec![field],
                    }),
                }
            }
            Selection::FragmentSpread(spread) => {
                if !should_include(&spread.directives, variables)? {
                    continue;
                }
                let name = spread.fragment_name.as_str();
                if stack.contains(&name) {
                    return Err(GraphQLError::Fragment {
                        name: name.to_string(),
                        message: "fragment spreads itself".to_string(),
                    }
                    .into());
                }
                let fragment = fragments.get(name).copied().ok_or_else(|| {
                    GraphQLError::Fragment {
                        name: name.to_string(),
                        message: "unknown fragment".to_string(),
                    }
                })?;
                let TypeCondition::On(on) = &fragment.type_condition;
                check_type_condition(name, on, type_name)?;

                stack.push(name);
                collect_into(
                    fragments,
                    variables,
                    type_name,
                    fragment.selection_set.items.iter(),
                    stack,
                    groups,
                )?;
                stack.pop();
            }
            Selection::InlineFragment(inline) => {
                if !should_include(&inline.directives, variables)? {
                    continue;
                }
                if let Some(TypeCondition::On(on)) = &inline.type_condition {
                    check_type_condition("inline fragment", on, type_name)?;
                }
                collect_into(
                    fragments,
                    variables,
                    type_name,
                    inline.selection_set.items.iter(),
                    stack,
                    groups,
                )?;
            }
        }
    }
    Ok(())
}

/// Only object types exist, so a fragment applies to exactly one type
fn check_type_condition(fragment: &str, on: &str, type_name: &str) -> StarlinksResult<()> {
    if on == type_name {
        Ok(())
    } else {
        Err(GraphQLError::Fragment {
            name: fragment.to_string(),
            message: format!("cannot be spread on type '{}' (declared on '{}')", type_name, on),
        }
        .into())
    }
}
