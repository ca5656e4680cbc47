//! Application settings and the HTTP server configuration built from them.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use edumaster::outbound::persistence::DbPool;
use edumaster::outbound::text_generation::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, TextGenerationSettings,
};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const TEXT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind host {host}: {message}")]
    InvalidHost { host: String, message: String },
    #[error("unknown SameSite policy {0}; expected strict, lax, or none")]
    InvalidSameSite(String),
    #[error("invalid text generation endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Settings loaded from the command line, `EDUMASTER_*` environment
/// variables, and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EDUMASTER")]
pub struct AppSettings {
    /// Interface to bind, default `0.0.0.0`.
    pub host: Option<String>,
    /// Port to bind, default 4000.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server keeps state in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: Option<u32>,
    /// File holding the session signing and encryption key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `strict`, `lax` (default), or `none`.
    pub same_site: Option<String>,
    /// Allow a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
    /// API key for the text-generation provider; AI features are disabled
    /// without one.
    pub ai_api_key: Option<String>,
    /// Chat-completion endpoint override.
    pub ai_endpoint: Option<String>,
    /// Model name override.
    pub ai_model: Option<String>,
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(host) => host.parse().map_err(|err: std::net::AddrParseError| {
                SettingsError::InvalidHost {
                    host: host.to_owned(),
                    message: err.to_string(),
                }
            })?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Cookie `SameSite` policy.
    pub fn same_site(&self) -> Result<SameSite, SettingsError> {
        match self.same_site.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("lax") => Ok(SameSite::Lax),
            Some("strict") => Ok(SameSite::Strict),
            Some("none") => Ok(SameSite::None),
            Some(other) => Err(SettingsError::InvalidSameSite(other.to_owned())),
        }
    }

    /// Location of the session key file.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Provider settings when an API key is configured.
    pub fn text_generation(&self) -> Result<Option<TextGenerationSettings>, SettingsError> {
        let Some(api_key) = self.ai_api_key.as_ref().filter(|key| !key.trim().is_empty()) else {
            return Ok(None);
        };
        let raw_endpoint = self.ai_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(raw_endpoint).map_err(|err| SettingsError::InvalidEndpoint {
            endpoint: raw_endpoint.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Some(TextGenerationSettings {
            api_key: api_key.clone(),
            endpoint,
            model: self
                .ai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            timeout: TEXT_GENERATION_TIMEOUT,
        }))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) text_generation: Option<TextGenerationSettings>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            text_generation: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one the server keeps accounts, courses, and enrollments in
    /// process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Enable the text-generation provider.
    #[must_use]
    pub fn with_text_generation(mut self, settings: Option<TextGenerationSettings>) -> Self {
        self.text_generation = settings;
        self
    }
}
