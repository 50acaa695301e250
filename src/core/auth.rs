//! OAuth authorization-code exchange
//!
//! The service never handles credentials itself: `/auth` hands the
//! authorization code to a [`TokenExchange`] and uses the opaque access token
//! it returns as the user's identity key.

use crate::config::OAuthConfig;
use crate::core::error::{RequestError, StarlinksResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trades an authorization code for an opaque access token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Provider name used in logs and error messages
    fn provider(&self) -> &str;

    /// Exchange `code` for an access token
    async fn exchange(&self, code: &str) -> StarlinksResult<String>;
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

/// GitHub's access-token response. On failure GitHub still answers 200 and
/// fills `error` instead of `access_token`.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl AccessTokenResponse {
    fn into_token(self, provider: &str) -> StarlinksResult<String> {
        match (self.access_token, self.error) {
            (Some(token), None) if !token.is_empty() => Ok(token),
            (_, Some(error)) => {
                let message = match self.error_description {
                    Some(description) => format!("{}: {}", error, description),
                    None => error,
                };
                Err(RequestError::Upstream {
                    provider: provider.to_string(),
                    message,
                }
                .into())
            }
            _ => Err(RequestError::Upstream {
                provider: provider.to_string(),
                message: "response carried no access token".to_string(),
            }
            .into()),
        }
    }
}

/// [`TokenExchange`] against a GitHub OAuth application
#[derive(Clone)]
pub struct GithubTokenExchange {
    client: reqwest::Client,
    config: OAuthConfig,
}

impl GithubTokenExchange {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    pub fn with_client(config: OAuthConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    fn upstream(&self, err: impl std::fmt::Display) -> RequestError {
        RequestError::Upstream {
            provider: self.provider().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl TokenExchange for GithubTokenExchange {
    fn provider(&self) -> &str {
        "GitHub"
    }

    async fn exchange(&self, code: &str) -> StarlinksResult<String> {
        let form = AccessTokenRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            code,
            redirect_uri: self.config.redirect_uri.as_deref(),
        };

        let response = self
            .client
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| self.upstream(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "token endpoint rejected exchange");
            return Err(self.upstream(format!("token endpoint answered {}", status)).into());
        }

        let body: AccessTokenResponse = response.json().await.map_err(|e| self.upstream(e))?;
        body.into_token(self.provider())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> StarlinksResult<String> {
        serde_json::from_str::<AccessTokenResponse>(json)
            .unwrap()
            .into_token("GitHub")
    }

    #[test]
    fn test_successful_response_yields_token() {
        let token = parse(r#"{"access_token":"gho_abc","token_type":"bearer","scope":""}"#);
        assert_eq!(token.unwrap(), "gho_abc");
    }

    #[test]
    fn test_error_response_is_upstream_failure() {
        let err = parse(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap_err();

        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(err.to_string().contains("bad_verification_code"));
        assert!(err.to_string().contains("incorrect or expired"));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = parse(r#"{"access_token":""}"#).unwrap_err();
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_form_omits_missing_redirect() {
        let form = AccessTokenRequest {
            client_id: "id",
            client_secret: "secret",
            code: "c",
            redirect_uri: None,
        };
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("redirect_uri").is_none());
        assert_eq!(json["code"], "c");
    }
}
