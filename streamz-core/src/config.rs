//! Centralized configuration for TravelStreamz.
//!
//! All tunable parameters are defined here and resolved from the process
//! environment once at startup. Missing store credentials are a fatal startup
//! condition, never a per-request error.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Environment variable names understood by [`StreamzConfig::from_env`].
pub mod env {
    pub const SUPABASE_URL: &str = "SUPABASE_URL";
    pub const VITE_SUPABASE_URL: &str = "VITE_SUPABASE_URL";
    pub const SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
    pub const VIDEOS_TABLE: &str = "SUPABASE_VIDEOS_TABLE";
    pub const VIDEOS_BUCKET: &str = "SUPABASE_VIDEOS_BUCKET";
    pub const TIMEOUT_SECS: &str = "SUPABASE_TIMEOUT_SECS";
    pub const API_HOST: &str = "API_HOST";
    pub const API_PORT: &str = "API_PORT";
    pub const API_URL: &str = "API_URL";
    pub const LOG_DIR: &str = "STREAMZ_LOG_DIR";
    pub const LOG_FILE: &str = "STREAMZ_LOG_FILE";
}

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingVariable { name: &'static str },

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to initialize store client: {reason}")]
    ClientInit { reason: String },
}

/// Central configuration for all TravelStreamz components.
#[derive(Debug, Clone, Default)]
pub struct StreamzConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Managed database and object storage settings.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL of the Supabase project
    pub supabase_url: Option<Url>,
    /// Service role key used for server-side access
    pub service_role_key: Option<String>,
    /// Table holding video metadata rows
    pub videos_table: String,
    /// Storage bucket holding video payloads
    pub videos_bucket: String,
    /// Per-request timeout for store calls
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            service_role_key: None,
            videos_table: "videos".to_string(),
            videos_bucket: "videos".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("supabase_url", &self.supabase_url.as_ref().map(Url::as_str))
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "<redacted>"),
            )
            .field("videos_table", &self.videos_table)
            .field("videos_bucket", &self.videos_bucket)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Credentials required to talk to the managed store.
#[derive(Clone)]
pub struct SupabaseCredentials {
    pub url: Url,
    pub service_role_key: String,
}

impl StoreConfig {
    /// Returns the store credentials, failing if either half is missing.
    ///
    /// # Errors
    /// - `ConfigError::MissingVariable` - URL or service role key not configured
    pub fn credentials(&self) -> Result<SupabaseCredentials, ConfigError> {
        let url = self
            .supabase_url
            .clone()
            .ok_or(ConfigError::MissingVariable {
                name: env::VITE_SUPABASE_URL,
            })?;
        let service_role_key =
            self.service_role_key
                .clone()
                .ok_or(ConfigError::MissingVariable {
                    name: env::SERVICE_ROLE_KEY,
                })?;
        Ok(SupabaseCredentials {
            url,
            service_role_key,
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Externally reachable base URL used to build stream links
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Socket address the server listens on.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Base URL for stream links, without a trailing slash.
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

/// Where the full-trace log of the current run is written.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory holding the run log, created on startup if missing
    pub logs_dir: PathBuf,
    /// File name of the run log; truncated at every start
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            file_name: "streamz-last-run.log".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn log_file_path(&self) -> PathBuf {
        self.logs_dir.join(&self.file_name)
    }
}

impl StreamzConfig {
    /// Loads configuration from the process environment.
    ///
    /// Does not read `.env` files; the binary loads those before calling this.
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` - A variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` - A variable is set but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        let raw_url = lookup(env::VITE_SUPABASE_URL).or_else(|| lookup(env::SUPABASE_URL));
        if let Some(raw) = raw_url {
            let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                name: env::VITE_SUPABASE_URL,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            config.store.supabase_url = Some(url);
        }
        config.store.service_role_key = lookup(env::SERVICE_ROLE_KEY);

        if let Some(table) = lookup(env::VIDEOS_TABLE) {
            config.store.videos_table = table;
        }
        if let Some(bucket) = lookup(env::VIDEOS_BUCKET) {
            config.store.videos_bucket = bucket;
        }
        if let Some(raw) = lookup(env::TIMEOUT_SECS) {
            let secs = parse_value::<u64>(env::TIMEOUT_SECS, &raw)?;
            config.store.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(env::API_HOST) {
            config.server.host = parse_value(env::API_HOST, &raw)?;
        }
        if let Some(raw) = lookup(env::API_PORT) {
            config.server.port = parse_value(env::API_PORT, &raw)?;
        }
        config.server.public_url = lookup(env::API_URL);

        if let Some(dir) = lookup(env::LOG_DIR) {
            config.logging.logs_dir = PathBuf::from(dir.trim());
        }
        if let Some(name) = lookup(env::LOG_FILE) {
            let name = name.trim();
            if name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    name: env::LOG_FILE,
                    value: name.to_string(),
                    reason: "must be a bare file name; use STREAMZ_LOG_DIR for the directory"
                        .to_string(),
                });
            }
            config.logging.file_name = name.to_string();
        }

        Ok(config)
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StreamzConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StreamzConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.public_url(), "http://localhost:3001");
        assert_eq!(config.store.videos_table, "videos");
        assert_eq!(config.store.videos_bucket, "videos");
        assert!(config.store.supabase_url.is_none());
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let config = config_from(&[("SUPABASE_URL", "https://demo.supabase.co")]).unwrap();
        match config.store.credentials() {
            Err(ConfigError::MissingVariable { name }) => {
                assert_eq!(name, "SUPABASE_SERVICE_ROLE_KEY")
            }
            other => panic!("expected missing key, got {:?}", other.map(|c| c.url)),
        }
    }

    #[test]
    fn test_vite_url_takes_precedence() {
        let config = config_from(&[
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("SUPABASE_URL", "https://plain.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ])
        .unwrap();
        let credentials = config.store.credentials().unwrap();
        assert_eq!(credentials.url.host_str(), Some("vite.supabase.co"));
        assert_eq!(credentials.service_role_key, "secret");
    }

    #[test]
    fn test_server_overrides() {
        let config = config_from(&[
            ("API_HOST", "0.0.0.0"),
            ("API_PORT", "8080"),
            ("API_URL", "https://travelstreamz.example/"),
        ])
        .unwrap();
        assert_eq!(config.server.bind_address().to_string(), "0.0.0.0:8080");
        assert_eq!(config.server.public_url(), "https://travelstreamz.example");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = config_from(&[("API_PORT", "not-a-port")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "API_PORT", .. })
        ));
    }

    #[test]
    fn test_log_location_overrides() {
        let defaults = config_from(&[]).unwrap();
        assert_eq!(
            defaults.logging.log_file_path(),
            PathBuf::from("logs").join("streamz-last-run.log")
        );

        let config = config_from(&[
            ("STREAMZ_LOG_DIR", "/var/log/streamz"),
            ("STREAMZ_LOG_FILE", "api.log"),
        ])
        .unwrap();
        assert_eq!(
            config.logging.log_file_path(),
            PathBuf::from("/var/log/streamz/api.log")
        );
    }

    #[test]
    fn test_log_file_must_be_bare_name() {
        let result = config_from(&[("STREAMZ_LOG_FILE", "nested/api.log")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "STREAMZ_LOG_FILE", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let config = config_from(&[("SUPABASE_SERVICE_ROLE_KEY", "super-secret")]).unwrap();
        let rendered = format!("{:?}", config.store);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
