use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::job_service::JobServiceConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub job_service: JobServiceConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Single shared key, mapped to the user id `default`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-user keys. Each user's files are kept apart in the library.
    #[serde(default)]
    pub users: Vec<ApiKeyUser>,
}

impl AuthConfig {
    pub fn none() -> Self {
        Self {
            method: AuthMethod::None,
            api_key: None,
            users: Vec::new(),
        }
    }
}

/// An API key and the user it authenticates.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyUser {
    pub user_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::ApiKey => "api_key",
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("filedeck.db")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub job_service: SanitizedJobServiceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
    /// User ids only; keys are never echoed.
    pub users: Vec<String>,
}

/// Job service config with the API key hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJobServiceConfig {
    pub api_key_configured: bool,
    pub base_url: String,
    pub engine: String,
    pub request_timeout_secs: u64,
    pub wait_timeout_secs: u64,
    pub max_attempts: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let js = &config.job_service;
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method.as_str().to_string(),
                api_key_configured: config
                    .auth
                    .api_key
                    .as_deref()
                    .is_some_and(|k| !k.trim().is_empty()),
                users: config.auth.users.iter().map(|u| u.user_id.clone()).collect(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            job_service: SanitizedJobServiceConfig {
                api_key_configured: js.is_configured(),
                base_url: js.base_url.clone(),
                engine: js.engine.clone(),
                request_timeout_secs: js.request_timeout_secs,
                wait_timeout_secs: js.wait_timeout_secs,
                max_attempts: js.max_attempts,
            },
        }
    }
}
