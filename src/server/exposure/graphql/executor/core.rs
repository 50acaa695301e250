//! Core GraphQL executor orchestration

use futures::future::join_all;
use graphql_parser::Pos;
use graphql_parser::query::{
    Definition, Document, OperationDefinition, Selection, VariableDefinition, parse_query,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::field_resolver;
use super::mutation_executor;
use super::query_executor;
use super::utils::{self, FieldGroup, Fragments, Variables};
use super::validation;
use crate::core::error::{GraphQLError, StarlinksError, StarlinksResult, ValidationError};
use crate::server::exposure::graphql::registry::{ObjectDef, Registry, TypeRef};
use crate::server::host::ServerHost;

/// A GraphQL request as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    #[serde(default)]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Source location of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// One step of a response path: a response key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// An entry of the response `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    pub extensions: ErrorExtensions,
}

impl ResponseError {
    pub fn new(error: &StarlinksError, position: Option<Pos>, path: Vec<PathSegment>) -> Self {
        Self {
            message: error.to_string(),
            locations: position.map(Location::from).into_iter().collect(),
            path,
            extensions: ErrorExtensions {
                code: error.error_code().to_string(),
            },
        }
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }
}

/// The `{data, errors}` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl GraphQLResponse {
    /// A response whose whole operation failed before execution
    pub fn from_error(error: &StarlinksError, position: Option<Pos>) -> Self {
        Self {
            data: Value::Null,
            errors: vec![ResponseError::new(error, position, Vec::new())],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// State shared by every resolver of one operation
pub(super) struct ExecutionContext<'q> {
    pub host: &'q ServerHost,
    pub fragments: Fragments<'q>,
    pub variables: Variables,
    /// Declared type of each variable and whether it has a default
    pub variable_types: HashMap<String, (TypeRef, bool)>,
    errors: Mutex<Vec<ResponseError>>,
}

impl<'q> ExecutionContext<'q> {
    pub fn registry(&self) -> &Registry {
        &self.host.registry
    }

    pub fn collect(
        &self,
        type_name: &str,
        selections: &[&'q Selection<'q, String>],
    ) -> StarlinksResult<Vec<FieldGroup<'q>>> {
        utils::collect_fields(&self.fragments, &self.variables, type_name, selections)
    }

    /// Record a field error; the field itself resolves to `null`
    pub fn report(&self, error: StarlinksError, position: Pos, path: &[PathSegment]) {
        let code = error.error_code();
        match &error {
            StarlinksError::Storage(_) | StarlinksError::Internal(_) => {
                tracing::warn!(?path, code, error = %error, "field resolution failed");
            }
            _ => tracing::debug!(?path, code, error = %error, "field resolution failed"),
        }

        let entry = ResponseError::new(&error, Some(position), path.to_vec());
        self.errors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }

    fn into_errors(self) -> Vec<ResponseError> {
        self.errors
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Query,
    Mutation,
}

struct SelectedOperation<'q> {
    kind: OperationKind,
    position: Pos,
    variables: &'q [VariableDefinition<'q, String>],
    selections: Vec<&'q Selection<'q, String>>,
}

/// GraphQL executor resolving documents against the registry and gateways
pub struct GraphQLExecutor {
    host: Arc<ServerHost>,
}

impl GraphQLExecutor {
    /// Create a new executor with the given host
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Execute a request
    ///
    /// Never fails: parse, validation and resolver failures all end up in
    /// the response's `errors` list.
    pub async fn execute(&self, request: GraphQLRequest) -> GraphQLResponse {
        tracing::debug!(
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            "executing GraphQL request"
        );

        let doc = match parse_query::<String>(&request.query) {
            Ok(doc) => doc,
            Err(e) => {
                let error: StarlinksError = GraphQLError::ParseError {
                    message: e.to_string(),
                }
                .into();
                tracing::debug!(error = %error, "rejected unparsable query");
                return GraphQLResponse::from_error(&error, None);
            }
        };

        self.execute_document(
            &doc,
            request.operation_name.as_deref(),
            request.variables.unwrap_or_default(),
        )
        .await
    }

    async fn execute_document<'q>(
        &'q self,
        doc: &'q Document<'q, String>,
        operation_name: Option<&str>,
        variables: Map<String, Value>,
    ) -> GraphQLResponse {
        let (operation, fragments) = match prepare(doc, operation_name) {
            Ok(prepared) => prepared,
            Err((error, position)) => return GraphQLResponse::from_error(&error, position),
        };

        let (variables, variable_types) =
            match coerce_variables(operation.variables, variables, &self.host.registry) {
                Ok(coerced) => coerced,
                Err(error) => {
                    return GraphQLResponse::from_error(&error, Some(operation.position));
                }
            };

        let ctx = ExecutionContext {
            host: &self.host,
            fragments,
            variables,
            variable_types,
            errors: Mutex::new(Vec::new()),
        };

        let root = match operation.kind {
            OperationKind::Query => ctx.registry().query_root(),
            OperationKind::Mutation => ctx.registry().mutation_root(),
        };
        let Some(root) = root else {
            let error = StarlinksError::Internal("registry has no root type".to_string());
            return GraphQLResponse::from_error(&error, Some(operation.position));
        };

        let groups = match ctx.collect(&root.name, &operation.selections) {
            Ok(groups) => groups,
            Err(error) => return GraphQLResponse::from_error(&error, Some(operation.position)),
        };

        let values = match operation.kind {
            // Root query fields are independent reads
            OperationKind::Query => {
                join_all(groups.iter().map(|g| resolve_root(&ctx, root, g, operation.kind))).await
            }
            // Mutations run one after another, in document order
            OperationKind::Mutation => {
                let mut values = Vec::with_capacity(groups.len());
                for group in &groups {
                    values.push(resolve_root(&ctx, root, group, operation.kind).await);
                }
                values
            }
        };

        let mut data = Map::new();
        for (group, value) in groups.iter().zip(values) {
            data.insert(group.response_key.clone(), value);
        }

        GraphQLResponse {
            data: Value::Object(data),
            errors: ctx.into_errors(),
        }
    }
}

/// Validate and resolve one root field; failures become `null` plus an error
async fn resolve_root<'q>(
    ctx: &ExecutionContext<'q>,
    root: &ObjectDef,
    group: &FieldGroup<'q>,
    kind: OperationKind,
) -> Value {
    let position = group.field().position;
    let path = vec![PathSegment::Key(group.response_key.clone())];

    if group.name() == "__typename" {
        return json!(root.name);
    }

    if let Err((error, at)) = validation::validate_field(ctx, root, group) {
        ctx.report(error, at, &path);
        return Value::Null;
    }

    let resolved = match kind {
        OperationKind::Query => query_executor::resolve_query_field(ctx, group).await,
        OperationKind::Mutation => mutation_executor::resolve_mutation_field(ctx, group).await,
    };

    match resolved {
        Ok(output) => field_resolver::complete(ctx, output, group, path).await,
        Err(error) => {
            ctx.report(error, position, &path);
            Value::Null
        }
    }
}

type Located = (StarlinksError, Option<Pos>);

/// Pick the operation to run and index the document's fragments
fn prepare<'q>(
    doc: &'q Document<'q, String>,
    operation_name: Option<&str>,
) -> Result<(SelectedOperation<'q>, Fragments<'q>), Located> {
    let mut fragments = Fragments::new();
    let mut operations = Vec::new();

    for definition in &doc.definitions {
        match definition {
            Definition::Operation(op) => operations.push(op),
            Definition::Fragment(fragment) => {
                if fragments.insert(fragment.name.as_str(), fragment).is_some() {
                    return Err((
                        GraphQLError::Fragment {
                            name: fragment.name.clone(),
                            message: "defined more than once".to_string(),
                        }
                        .into(),
                        Some(fragment.position),
                    ));
                }
            }
        }
    }

    let operation = match operation_name {
        Some(name) => operations
            .iter()
            .copied()
            .find(|op| operation_name_of(op) == Some(name))
            .ok_or_else(|| {
                (
                    GraphQLError::InvalidOperation {
                        operation: name.to_string(),
                        message: "no operation with this name in the document".to_string(),
                    }
                    .into(),
                    None,
                )
            })?,
        None => match operations.as_slice() {
            [single] => *single,
            [] => {
                return Err((
                    GraphQLError::InvalidOperation {
                        operation: "<none>".to_string(),
                        message: "document contains no operation".to_string(),
                    }
                    .into(),
                    None,
                ));
            }
            _ => {
                return Err((
                    GraphQLError::InvalidOperation {
                        operation: "<anonymous>".to_string(),
                        message: "operationName is required when the document has several operations"
                            .to_string(),
                    }
                    .into(),
                    None,
                ));
            }
        },
    };

    let selected = match operation {
        OperationDefinition::SelectionSet(set) => SelectedOperation {
            kind: OperationKind::Query,
            position: set.span.0,
            variables: &[],
            selections: set.items.iter().collect(),
        },
        OperationDefinition::Query(query) => SelectedOperation {
            kind: OperationKind::Query,
            position: query.position,
            variables: &query.variable_definitions,
            selections: query.selection_set.items.iter().collect(),
        },
        OperationDefinition::Mutation(mutation) => SelectedOperation {
            kind: OperationKind::Mutation,
            position: mutation.position,
            variables: &mutation.variable_definitions,
            selections: mutation.selection_set.items.iter().collect(),
        },
        OperationDefinition::Subscription(subscription) => {
            return Err((
                GraphQLError::InvalidOperation {
                    operation: subscription
                        .name
                        .clone()
                        .unwrap_or_else(|| "<anonymous>".to_string()),
                    message: "subscriptions are not supported".to_string(),
                }
                .into(),
                Some(subscription.position),
            ));
        }
    };

    Ok((selected, fragments))
}

fn operation_name_of<'a>(op: &'a OperationDefinition<'_, String>) -> Option<&'a str> {
    match op {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

/// Apply defaults and check supplied values against declared types
///
/// Declared variables that are neither supplied nor defaulted are bound to
/// `null`, so a required argument fed by one fails argument conversion.
fn coerce_variables(
    definitions: &[VariableDefinition<'_, String>],
    supplied: Map<String, Value>,
    registry: &Registry,
) -> StarlinksResult<(Variables, HashMap<String, (TypeRef, bool)>)> {
    let mut values = Variables::new();
    let mut types = HashMap::new();

    for definition in definitions {
        let type_ref = TypeRef::from_parsed(&definition.var_type);
        if !registry.is_scalar(type_ref.base_name()) {
            return Err(ValidationError::InvalidVariable {
                variable: definition.name.clone(),
                message: format!("'{}' is not an input type", type_ref),
            }
            .into());
        }

        let value = match (supplied.get(&definition.name), &definition.default_value) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => utils::gql_value_to_json(default, &Variables::new())?,
            (None, None) => Value::Null,
        };

        if !type_ref.accepts_json(&value) {
            return Err(ValidationError::InvalidVariable {
                variable: definition.name.clone(),
                message: format!("expected a value of type {}", type_ref),
            }
            .into());
        }

        types.insert(
            definition.name.clone(),
            (type_ref, definition.default_value.is_some()),
        );
        values.insert(definition.name.clone(), value);
    }

    Ok((values, types))
}
