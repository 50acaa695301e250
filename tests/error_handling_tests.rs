//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error codes match what GraphQL clients see in `extensions.code`
//! - Error conversions work correctly
//! - Gateways report typed errors

use axum::http::StatusCode;
use axum::response::IntoResponse;
use starlinks::core::error::{
    ConfigError, EntityError, GraphQLError, RequestError, StorageError, ValidationError,
};
use starlinks::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_entity_not_found_returns_404() {
        let err = StarlinksError::from(EntityError::not_found("User", 7));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_entity_already_exists_returns_409() {
        let err = StarlinksError::Entity(EntityError::AlreadyExists {
            entity_type: "User".to_string(),
            message: "token already taken".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_error_returns_400() {
        let err = StarlinksError::Validation(ValidationError::FieldError {
            field: "token".to_string(),
            message: "must not be empty".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_parameter_returns_400() {
        let err = StarlinksError::Request(RequestError::MissingParameter {
            parameter: "code".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_returns_502() {
        let err = StarlinksError::Request(RequestError::Upstream {
            provider: "github".to_string(),
            message: "bad_verification_code".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_configured_returns_503() {
        let err = StarlinksError::Request(RequestError::NotConfigured {
            feature: "OAuth token exchange".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_store_unavailable_returns_503() {
        let err = StarlinksError::Storage(StorageError::Unavailable {
            backend: "PostgreSQL".to_string(),
            message: "connection refused".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = StarlinksError::Config(ConfigError::InvalidValue {
            field: "database.max_connections".to_string(),
            message: "must be at least 1".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_entity_error_codes() {
        assert_eq!(
            StarlinksError::from(EntityError::not_found("Star", 1)).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            StarlinksError::from(EntityError::AlreadyExists {
                entity_type: "User".to_string(),
                message: "dup".to_string(),
            })
            .error_code(),
            "CONFLICT"
        );
    }

    #[test]
    fn test_storage_error_codes() {
        let unavailable = StarlinksError::from(StorageError::Unavailable {
            backend: "PostgreSQL".to_string(),
            message: "pool timed out".to_string(),
        });
        let query = StarlinksError::from(StorageError::QueryError {
            backend: "PostgreSQL".to_string(),
            message: "syntax error".to_string(),
        });
        let integrity = StarlinksError::from(StorageError::IntegrityError {
            message: "check violated".to_string(),
        });

        assert_eq!(unavailable.error_code(), "STORE_UNAVAILABLE");
        assert_eq!(query.error_code(), "STORE_UNAVAILABLE");
        assert_eq!(integrity.error_code(), "CONSTRAINT_VIOLATION");
    }

    #[test]
    fn test_graphql_error_codes() {
        let parse = StarlinksError::from(GraphQLError::ParseError {
            message: "unexpected end".to_string(),
        });
        let operation = StarlinksError::from(GraphQLError::InvalidOperation {
            operation: "subscription".to_string(),
            message: "not supported".to_string(),
        });
        let unknown = StarlinksError::from(GraphQLError::UnknownField {
            type_name: "Query".to_string(),
            field: "stats".to_string(),
        });

        assert_eq!(parse.error_code(), "GRAPHQL_PARSE_ERROR");
        assert_eq!(operation.error_code(), "GRAPHQL_INVALID_OPERATION");
        assert_eq!(unknown.error_code(), "GRAPHQL_VALIDATION_FAILED");
    }

    #[test]
    fn test_request_error_codes() {
        let missing = StarlinksError::from(RequestError::MissingParameter {
            parameter: "code".to_string(),
        });
        let upstream = StarlinksError::from(RequestError::Upstream {
            provider: "github".to_string(),
            message: "timeout".to_string(),
        });
        let not_configured = StarlinksError::from(RequestError::NotConfigured {
            feature: "OAuth".to_string(),
        });

        assert_eq!(missing.error_code(), "MISSING_PARAMETER");
        assert_eq!(upstream.error_code(), "UPSTREAM_ERROR");
        assert_eq!(not_configured.error_code(), "NOT_CONFIGURED");
    }

    #[test]
    fn test_every_validation_variant_is_validation_error() {
        let errors: Vec<StarlinksError> = vec![
            ValidationError::MissingArgument {
                field: "user".to_string(),
                argument: "id".to_string(),
            }
            .into(),
            ValidationError::InvalidArguments {
                field: "addStar".to_string(),
                message: "missing field `link`".to_string(),
            }
            .into(),
            ValidationError::InvalidVariable {
                variable: "token".to_string(),
                message: "not provided".to_string(),
            }
            .into(),
        ];

        for err in errors {
            assert_eq!(err.error_code(), "VALIDATION_ERROR");
        }
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let err = StarlinksError::from(EntityError::not_found("User", 42));
        let response = err.to_response();

        assert_eq!(response.code, "NOT_FOUND");
        assert!(response.message.contains("User"));
        assert!(response.message.contains("42"));
    }

    #[test]
    fn test_validation_errors_include_field_details() {
        let err = StarlinksError::from(ValidationError::MissingArgument {
            field: "star".to_string(),
            argument: "id".to_string(),
        });
        let response = err.to_response();

        assert!(response.message.contains("star"));
        assert!(response.message.contains("id"));
    }

    #[test]
    fn test_config_parse_error_names_file() {
        let err = StarlinksError::from(ConfigError::ParseError {
            file: Some("starlinks.yaml".to_string()),
            message: "bad indentation".to_string(),
        });
        assert!(err.to_string().contains("starlinks.yaml"));
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_serde_json_error_converts_to_validation_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: StarlinksError = json_err.into();

        assert!(matches!(
            err,
            StarlinksError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_io_error_converts_to_config_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StarlinksError = io_err.into();

        assert!(matches!(err, StarlinksError::Config(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_error_source_is_preserved() {
        use std::error::Error;

        let err = StarlinksError::from(EntityError::not_found("Star", 3));
        assert!(err.source().is_some());
        assert!(StarlinksError::Internal("boom".to_string()).source().is_none());
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_conflict_and_not_found_helpers() {
        let conflict = StarlinksError::from(EntityError::AlreadyExists {
            entity_type: "User".to_string(),
            message: "dup".to_string(),
        });
        let missing = StarlinksError::from(EntityError::not_found("User", 1));

        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
        assert!(missing.is_not_found());
        assert!(!missing.is_conflict());
    }

    #[test]
    fn test_can_match_specific_entity_errors() {
        let err = StarlinksError::from(EntityError::not_found("Star", 9));

        match err {
            StarlinksError::Entity(EntityError::NotFound { entity_type, id }) => {
                assert_eq!(entity_type, "Star");
                assert_eq!(id, 9);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_starlinks_error_into_response_status() {
        let response = StarlinksError::from(EntityError::not_found("User", 1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_request_error_into_response_status() {
        let response = StarlinksError::from(RequestError::NotConfigured {
            feature: "OAuth".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

// =============================================================================
// Gateway Error Tests
// =============================================================================

mod gateway_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_token_is_conflict() {
        let users = InMemoryUserService::new();
        users.insert("abc").await.unwrap();

        let err = users.insert("abc").await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_missing_star_is_not_found() {
        let stars = InMemoryStarService::new();
        let patch = StarPatch {
            name: Some("renamed".to_string()),
            ..Default::default()
        };

        let err = stars.update(99, patch).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let users = InMemoryUserService::new();
        let err = users.delete(5).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let users = InMemoryUserService::new();
        let stars = InMemoryStarService::new();

        assert!(users.get(1).await.unwrap().is_none());
        assert!(stars.get(1).await.unwrap().is_none());
    }
}
