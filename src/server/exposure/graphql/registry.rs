//! Type & Field Registry
//!
//! Declares the object types (`User`, `Star`) and the root `Query` and
//! `Mutation` fields. The executor validates every document against this
//! registry before any resolver runs, and `/graphql/schema` renders it as SDL.

use std::fmt;

/// Built-in scalars understood by the executor
pub const SCALARS: [&str; 3] = ["Int", "String", "Boolean"];

pub const QUERY_ROOT: &str = "Query";
pub const MUTATION_ROOT: &str = "Mutation";

/// Reference to a type, with list and non-null wrappers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Innermost named type (`[Star!]` -> `Star`)
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Build from a parsed variable type
    pub fn from_parsed(ty: &graphql_parser::query::Type<'_, String>) -> Self {
        use graphql_parser::query::Type;
        match ty {
            Type::NamedType(name) => TypeRef::Named(name.clone()),
            Type::ListType(inner) => TypeRef::list(TypeRef::from_parsed(inner)),
            Type::NonNullType(inner) => TypeRef::non_null(TypeRef::from_parsed(inner)),
        }
    }

    /// Whether a value of type `self` may be passed where `expected` is declared
    ///
    /// A nullable variable may only feed a non-null argument when it carries
    /// a default value.
    pub fn is_assignable_to(&self, expected: &TypeRef, has_default: bool) -> bool {
        match (self, expected) {
            (TypeRef::NonNull(inner), TypeRef::NonNull(exp)) => {
                inner.is_assignable_to(exp, has_default)
            }
            (TypeRef::NonNull(inner), exp) => inner.is_assignable_to(exp, has_default),
            (actual, TypeRef::NonNull(exp)) => has_default && actual.is_assignable_to(exp, false),
            (TypeRef::List(inner), TypeRef::List(exp)) => inner.is_assignable_to(exp, false),
            (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
            _ => false,
        }
    }

    /// Whether a JSON value is acceptable input for this type
    pub fn accepts_json(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (TypeRef::NonNull(_), Value::Null) => false,
            (TypeRef::NonNull(inner), v) => inner.accepts_json(v),
            (_, Value::Null) => true,
            (TypeRef::List(inner), Value::Array(items)) => {
                items.iter().all(|item| inner.accepts_json(item))
            }
            // Single values coerce to one-element lists
            (TypeRef::List(inner), v) => inner.accepts_json(v),
            (TypeRef::Named(name), v) => match name.as_str() {
                "Int" => v.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
                "String" => v.is_string(),
                "Boolean" => v.is_boolean(),
                _ => false,
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

fn int() -> TypeRef {
    TypeRef::named("Int")
}

fn string() -> TypeRef {
    TypeRef::named("String")
}

fn required(ty: TypeRef) -> TypeRef {
    TypeRef::non_null(ty)
}

fn star_list() -> TypeRef {
    TypeRef::list(required(TypeRef::named("Star")))
}

/// Field argument declaration
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub type_ref: TypeRef,
}

/// Field declaration on an object type
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub type_ref: TypeRef,
    pub args: Vec<ArgumentDef>,
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            type_ref,
            args: Vec::new(),
            description: None,
        }
    }

    pub fn arg(mut self, name: &str, type_ref: TypeRef) -> Self {
        self.args.push(ArgumentDef {
            name: name.to_string(),
            type_ref,
        });
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// Object type declaration
#[derive(Debug, Clone)]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ObjectDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The complete query surface
#[derive(Debug, Clone)]
pub struct Registry {
    objects: Vec<ObjectDef>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry for the bookmarking service
    pub fn new() -> Self {
        let user = ObjectDef::new("User")
            .describe("An identity keyed by a unique opaque token")
            .field(FieldDef::new("id", required(int())))
            .field(FieldDef::new("token", string()))
            .field(
                FieldDef::new("stars", star_list())
                    .describe("Stars owned by this user, fetched only when selected"),
            );

        let star = ObjectDef::new("Star")
            .describe("A saved link owned by a user")
            .field(FieldDef::new("id", required(int())))
            .field(FieldDef::new("name", string()))
            .field(FieldDef::new("userId", int()))
            .field(FieldDef::new("img", string()))
            .field(FieldDef::new("link", string()));

        let query = ObjectDef::new(QUERY_ROOT)
            .field(
                FieldDef::new("user", TypeRef::named("User"))
                    .arg("id", int())
                    .arg("token", string())
                    .describe("Fetch a user by id, or find-or-create one by token"),
            )
            .field(FieldDef::new("star", TypeRef::named("Star")).arg("id", required(int())))
            .field(
                FieldDef::new("stars", star_list())
                    .arg("userId", required(int()))
                    .describe("Stars owned by the given user"),
            )
            .field(FieldDef::new("allStars", star_list()));

        let mutation = ObjectDef::new(MUTATION_ROOT)
            .field(FieldDef::new("addUser", TypeRef::named("User")).arg("token", required(string())))
            .field(
                FieldDef::new("addStar", TypeRef::named("Star"))
                    .arg("name", required(string()))
                    .arg("userId", required(int()))
                    .arg("img", required(string()))
                    .arg("link", required(string())),
            )
            .field(
                FieldDef::new("updateUser", TypeRef::named("User"))
                    .arg("id", required(int()))
                    .arg("token", string())
                    .describe("Replace the token when one is supplied"),
            )
            .field(
                FieldDef::new("updateStar", TypeRef::named("Star"))
                    .arg("id", required(int()))
                    .arg("name", string())
                    .arg("userId", int())
                    .arg("img", string())
                    .arg("link", string())
                    .describe("Write only the supplied fields"),
            )
            .field(
                FieldDef::new("deleteUser", TypeRef::named("User"))
                    .arg("id", required(int()))
                    .describe("Delete a user; owned stars are kept"),
            )
            .field(FieldDef::new("deleteStar", TypeRef::named("Star")).arg("id", required(int())));

        Self {
            objects: vec![user, star, query, mutation],
        }
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn query_root(&self) -> Option<&ObjectDef> {
        self.object(QUERY_ROOT)
    }

    pub fn mutation_root(&self) -> Option<&ObjectDef> {
        self.object(MUTATION_ROOT)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        SCALARS.contains(&name)
    }

    /// Render the registry as GraphQL SDL
    pub fn to_sdl(&self) -> String {
        let mut sdl = String::new();

        for object in &self.objects {
            if let Some(description) = &object.description {
                sdl.push_str(&format!("\"{}\"\n", description));
            }
            sdl.push_str(&format!("type {} {{\n", object.name));

            for field in &object.fields {
                if let Some(description) = &field.description {
                    sdl.push_str(&format!("  \"{}\"\n", description));
                }
                let args = if field.args.is_empty() {
                    String::new()
                } else {
                    let rendered: Vec<String> = field
                        .args
                        .iter()
                        .map(|a| format!("{}: {}", a.name, a.type_ref))
                        .collect();
                    format!("({})", rendered.join(", "))
                };
                sdl.push_str(&format!("  {}{}: {}\n", field.name, args, field.type_ref));
            }

            sdl.push_str("}\n\n");
        }

        sdl.push_str("schema {\n");
        sdl.push_str(&format!("  query: {}\n", QUERY_ROOT));
        sdl.push_str(&format!("  mutation: {}\n", MUTATION_ROOT));
        sdl.push_str("}\n");

        sdl
    }
}
