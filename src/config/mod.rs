mod file_config;

pub use file_config::{CredentialsConfig, FileConfig};

use crate::auth::Credentials;
use crate::entity::EntityKind;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://mobilewebserver9-pokertest8ext.installprogram.eu/TestApi";
pub const DEFAULT_TOKEN_PATH: &str = "/token";
pub const DEFAULT_COLLECTIONS_PATH: &str = "/api/automation";

/// Env var holding the path of an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "ENTITY_API_CONFIG";
/// Env var overriding the base URL, applied after the file.
pub const BASE_URL_ENV: &str = "ENTITY_API_BASE_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token_path: String,
    pub collections_path: String,
    /// `None` keeps the transport's own default.
    pub request_timeout_sec: Option<u64>,
    pub credentials: Credentials,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            collections_path: DEFAULT_COLLECTIONS_PATH.to_string(),
            request_timeout_sec: None,
            credentials: Credentials::default(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Resolve configuration from defaults and optional TOML file config.
    /// TOML values override defaults where present.
    pub fn resolve(file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let defaults = Self::default();

        let base_url = normalize_base_url(&file.base_url.unwrap_or(defaults.base_url));
        if base_url.is_empty() {
            bail!("base_url must not be empty");
        }

        let token_path = file
            .token_path
            .map(|p| normalize_path(&p))
            .unwrap_or(defaults.token_path);
        let collections_path = file
            .collections_path
            .map(|p| normalize_path(&p))
            .unwrap_or(defaults.collections_path);

        let request_timeout_sec = match file.request_timeout_sec {
            Some(0) => bail!("request_timeout_sec must be greater than zero"),
            other => other,
        };

        let creds_file = file.credentials.unwrap_or_default();
        let default_creds = defaults.credentials;
        let credentials = Credentials {
            username: creds_file.username.or(default_creds.username),
            password: creds_file.password.or(default_creds.password),
            grant_type: creds_file.grant_type.unwrap_or(default_creds.grant_type),
        };
        if credentials.grant_type.is_empty() {
            bail!("credentials.grant_type must not be empty");
        }

        Ok(Self {
            base_url,
            token_path,
            collections_path,
            request_timeout_sec,
            credentials,
        })
    }

    /// Resolve from the file named by `ENTITY_API_CONFIG` (if set), then
    /// apply the `ENTITY_API_BASE_URL` override.
    pub fn from_env() -> Result<Self> {
        let file_config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(FileConfig::load(&PathBuf::from(path))?),
            None => None,
        };
        Self::resolve_with_overrides(file_config, std::env::var(BASE_URL_ENV).ok())
    }

    /// Like [`ClientConfig::resolve`], then applies a `base_url` override.
    /// A blank override is ignored.
    pub fn resolve_with_overrides(
        file_config: Option<FileConfig>,
        base_url: Option<String>,
    ) -> Result<Self> {
        let mut config = Self::resolve(file_config)?;
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            config.base_url = normalize_base_url(&base_url);
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_sec.map(Duration::from_secs)
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, self.token_path)
    }

    pub fn collection_url(&self, kind: EntityKind) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.collections_path,
            kind.collection_name()
        )
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
