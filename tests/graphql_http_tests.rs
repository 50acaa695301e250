//! End-to-end tests for the HTTP surface
//!
//! Drives the full router (REST + GraphQL + CORS) built by `ServerBuilder`
//! over the in-memory gateways.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};
use starlinks::core::error::RequestError;
use starlinks::prelude::*;

// =============================================================================
// Test doubles
// =============================================================================

/// Exchange that maps `code-<x>` to token `token-<x>` and rejects anything else
struct FakeExchange;

#[async_trait]
impl TokenExchange for FakeExchange {
    fn provider(&self) -> &str {
        "fake"
    }

    async fn exchange(&self, code: &str) -> StarlinksResult<String> {
        match code.strip_prefix("code-") {
            Some(suffix) => Ok(format!("token-{}", suffix)),
            None => Err(RequestError::Upstream {
                provider: "fake".to_string(),
                message: "bad_verification_code".to_string(),
            }
            .into()),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn create_test_server() -> (TestServer, InMemoryUserService, InMemoryStarService) {
    let users = InMemoryUserService::new();
    let stars = InMemoryStarService::new();

    let app = ServerBuilder::new()
        .with_user_service(users.clone())
        .with_star_service(stars.clone())
        .with_token_exchange(FakeExchange)
        .build()
        .expect("Failed to build app");

    let server = TestServer::try_new(app).expect("Failed to create test server");
    (server, users, stars)
}

async fn post_graphql(server: &TestServer, query: &str) -> Value {
    let response = server.post("/graphql").json(&json!({ "query": query })).await;
    response.assert_status_ok();
    response.json()
}

async fn seed_star(stars: &InMemoryStarService, name: &str, user_id: i32) -> Star {
    stars
        .insert(NewStar {
            name: name.to_string(),
            user_id,
            img: format!("{}.png", name),
            link: format!("https://example.com/{}", name),
        })
        .await
        .unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _, _) = create_test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "starlinks");
    }

    #[tokio::test]
    async fn test_healthz_endpoint() {
        let (server, _, _) = create_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

// =============================================================================
// GraphQL Endpoint Tests
// =============================================================================

mod graphql_tests {
    use super::*;

    #[tokio::test]
    async fn test_user_by_token_creates_then_reuses() {
        let (server, users, _) = create_test_server();

        let first = post_graphql(&server, r#"{ user(token: "abc") { id token } }"#).await;
        let second = post_graphql(&server, r#"{ user(token: "abc") { id token } }"#).await;

        assert_eq!(first["data"]["user"]["token"], "abc");
        assert_eq!(first["data"]["user"]["id"], second["data"]["user"]["id"]);
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_with_stars() {
        let (server, users, stars) = create_test_server();
        let user = users.insert("owner").await.unwrap();
        seed_star(&stars, "rust", user.id).await;
        seed_star(&stars, "tokio", user.id).await;
        seed_star(&stars, "elsewhere", user.id + 100).await;

        let query = format!("{{ user(id: {}) {{ id stars {{ name userId }} }} }}", user.id);
        let body = post_graphql(&server, &query).await;

        let mut names: Vec<&str> = body["data"]["user"]["stars"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["rust", "tokio"]);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_missing_star_is_null_with_error() {
        let (server, _, stars) = create_test_server();
        let star = seed_star(&stars, "present", 1).await;

        let query = format!(
            "{{ missing: star(id: 999) {{ id }} present: star(id: {}) {{ name }} }}",
            star.id
        );
        let body = post_graphql(&server, &query).await;

        assert_eq!(body["data"]["missing"], Value::Null);
        assert_eq!(body["data"]["present"]["name"], "present");
        assert_eq!(body["errors"][0]["extensions"]["code"], "NOT_FOUND");
        assert_eq!(body["errors"][0]["path"], json!(["missing"]));
    }

    #[tokio::test]
    async fn test_stars_by_user_and_all_stars() {
        let (server, _, stars) = create_test_server();
        seed_star(&stars, "a", 1).await;
        seed_star(&stars, "b", 2).await;

        let body = post_graphql(&server, "{ stars(userId: 2) { name } allStars { id } }").await;

        assert_eq!(body["data"]["stars"], json!([{ "name": "b" }]));
        assert_eq!(body["data"]["allStars"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mutations_round_trip() {
        let (server, _, stars) = create_test_server();

        let added = post_graphql(
            &server,
            r#"mutation {
                addStar(name: "axum", userId: 1, img: "a.png", link: "https://github.com/tokio-rs/axum") { id }
            }"#,
        )
        .await;
        let id = added["data"]["addStar"]["id"].as_i64().unwrap();

        let updated = post_graphql(
            &server,
            &format!(r#"mutation {{ updateStar(id: {}, name: "Axum") {{ name img }} }}"#, id),
        )
        .await;
        assert_eq!(updated["data"]["updateStar"]["name"], "Axum");
        assert_eq!(updated["data"]["updateStar"]["img"], "a.png");

        let deleted = post_graphql(
            &server,
            &format!("mutation {{ deleteStar(id: {}) {{ id name }} }}", id),
        )
        .await;
        assert_eq!(deleted["data"]["deleteStar"]["name"], "Axum");
        assert!(stars.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_add_user_is_conflict() {
        let (server, _, _) = create_test_server();

        post_graphql(&server, r#"mutation { addUser(token: "dup") { id } }"#).await;
        let body = post_graphql(&server, r#"mutation { addUser(token: "dup") { id } }"#).await;

        assert_eq!(body["data"]["addUser"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_variables_and_operation_name() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/graphql")
            .json(&json!({
                "query": "query A($t: String!) { user(token: $t) { token } } query B { allStars { id } }",
                "variables": { "t": "from-vars" },
                "operationName": "A"
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["token"], "from-vars");
    }

    #[tokio::test]
    async fn test_parse_error_still_answers_200() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/graphql")
            .json(&json!({ "query": "{ user(token: " }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "GRAPHQL_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_body_still_answers_200() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/graphql")
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_body_without_query_still_answers_200() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/graphql")
            .json(&json!({ "variables": { "t": "x" } }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["errors"][0]["extensions"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_graphql_with_query_string() {
        let (server, _, _) = create_test_server();

        let response = server
            .get("/graphql")
            .add_query_param("query", r#"{ user(token: "via-get") { token } }"#)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["token"], "via-get");
    }

    #[tokio::test]
    async fn test_get_graphql_with_variables() {
        let (server, _, _) = create_test_server();

        let response = server
            .get("/graphql")
            .add_query_param("query", "query($t: String!) { user(token: $t) { token } }")
            .add_query_param("variables", r#"{"t":"encoded"}"#)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["token"], "encoded");
    }

    #[tokio::test]
    async fn test_get_graphql_with_malformed_variables() {
        let (server, _, _) = create_test_server();

        let response = server
            .get("/graphql")
            .add_query_param("query", "{ allStars { id } }")
            .add_query_param("variables", "{not json")
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["errors"][0]["extensions"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_schema_and_playground() {
        let (server, _, _) = create_test_server();

        let schema = server.get("/graphql/schema").await;
        schema.assert_status_ok();
        let sdl = schema.text();
        assert!(sdl.contains("type Star"));
        assert!(sdl.contains("allStars: [Star!]"));

        let playground = server.get("/graphql/playground").await;
        playground.assert_status_ok();
        assert!(playground.text().contains("/graphql"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (server, _, _) = create_test_server();

        let response = server
            .post("/graphql")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("http://localhost:3000"),
            )
            .json(&json!({ "query": "{ allStars { id } }" }))
            .await;
        response.assert_status_ok();

        let allow_origin = response.header("access-control-allow-origin");
        assert_eq!(allow_origin.to_str().unwrap(), "*");
    }
}

// =============================================================================
// OAuth Callback Tests
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_auth_creates_user_for_new_token() {
        let (server, users, _) = create_test_server();

        let response = server.get("/auth").add_query_param("code", "code-42").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["token"], "token-42");

        let stored = users.find_by_token("token-42").await.unwrap().unwrap();
        assert_eq!(body["data"]["user"]["id"], stored.id);
    }

    #[tokio::test]
    async fn test_auth_reuses_existing_user() {
        let (server, users, _) = create_test_server();
        let existing = users.insert("token-7").await.unwrap();

        let response = server.get("/auth").add_query_param("code", "code-7").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["id"], existing.id);
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_auth_without_code_is_bad_request() {
        let (server, _, _) = create_test_server();

        let response = server.get("/auth").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn test_auth_rejected_code_is_bad_gateway() {
        let (server, users, _) = create_test_server();

        let response = server.get("/auth").add_query_param("code", "nope").await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let body: Value = response.json();
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert!(users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auth_without_exchange_is_unavailable() {
        let app = ServerBuilder::new()
            .with_in_memory_store()
            .build()
            .expect("Failed to build app");
        let server = TestServer::try_new(app).expect("Failed to create test server");

        let response = server.get("/auth").add_query_param("code", "code-1").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["code"], "NOT_CONFIGURED");
    }
}
