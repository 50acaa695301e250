//! Configuration loading and management
//!
//! Configuration comes from an optional YAML file (path in `STARLINKS_CONFIG`)
//! and is then overridden by environment variables:
//!
//! | variable               | field                  |
//! |------------------------|------------------------|
//! | `STARLINKS_BIND`       | `server.bind`          |
//! | `DATABASE_URL`         | `database.url`         |
//! | `GITHUB_CLIENT_ID`     | `oauth.client_id`      |
//! | `GITHUB_CLIENT_SECRET` | `oauth.client_secret`  |
//! | `GITHUB_REDIRECT_URI`  | `oauth.redirect_uri`   |

use crate::core::error::{ConfigError, StarlinksResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the YAML configuration file
pub const CONFIG_PATH_ENV: &str = "STARLINKS_CONFIG";

/// GitHub's OAuth access-token endpoint
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g., "0.0.0.0:4000")
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:4000".to_string()
}

/// Relational store settings
///
/// Without a `url` the service runs on the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

/// OAuth application registered with the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,

    pub client_secret: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default)]
    pub redirect_uri: Option<String>,
}

fn default_token_url() -> String {
    GITHUB_TOKEN_URL.to_string()
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarlinksConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// `/auth` answers 503 when absent
    #[serde(default)]
    pub oauth: Option<OAuthConfig>,
}

impl StarlinksConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> StarlinksResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::IoError {
                    message: e.to_string(),
                }
            }
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> StarlinksResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `STARLINKS_CONFIG` (if set) and apply environment overrides
    pub fn load() -> StarlinksResult<Self> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides supplied by `lookup`
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StarlinksResult<Self> {
        if let Some(bind) = lookup("STARLINKS_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }

        let client_id = lookup("GITHUB_CLIENT_ID");
        let client_secret = lookup("GITHUB_CLIENT_SECRET");
        match (self.oauth.as_mut(), client_id, client_secret) {
            (Some(oauth), id, secret) => {
                if let Some(id) = id {
                    oauth.client_id = id;
                }
                if let Some(secret) = secret {
                    oauth.client_secret = secret;
                }
            }
            (None, Some(client_id), Some(client_secret)) => {
                self.oauth = Some(OAuthConfig {
                    client_id,
                    client_secret,
                    token_url: default_token_url(),
                    redirect_uri: None,
                });
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    field: "oauth".to_string(),
                    message: "GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must be set together"
                        .to_string(),
                }
                .into());
            }
            (None, None, None) => {}
        }

        if let (Some(oauth), Some(redirect)) = (self.oauth.as_mut(), lookup("GITHUB_REDIRECT_URI"))
        {
            oauth.redirect_uri = Some(redirect);
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> StarlinksResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
