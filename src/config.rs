use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted cover upload size in MB
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,

    /// Directory where normalized cover images live; served at /images
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Path of the embedded redb database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Base URL used when building image URLs (e.g. "https://books.example.org").
    /// When unset, URLs are derived from the request's Host header over http.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// HMAC secret for signing session tokens. Required: every
    /// credential-dependent endpoint is unusable without it, so startup
    /// refuses to proceed when it is missing.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Rate limit: requests per minute per authenticated user
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_upload_size_mb: default_max_upload_size_mb(),
            image_dir: default_image_dir(),
            db_path: default_db_path(),
            public_base_url: None,
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("grimoire").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("GRIMOIRE").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Startup-time validation. Configuration is immutable afterwards.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.as_deref().is_none_or(str::is_empty) {
            anyhow::bail!(
                "missing JWT secret: set GRIMOIRE__JWT_SECRET; signup/login and all \
                 authenticated endpoints cannot operate without it"
            );
        }
        if self.max_upload_size_mb == 0 {
            anyhow::bail!("max_upload_size_mb must be at least 1");
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max upload size in bytes
    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_upload_size_mb() -> usize {
    20
}

fn default_image_dir() -> String {
    "images".to_string()
}

fn default_db_path() -> String {
    "grimoire.redb".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_rate_limit_per_minute() -> u32 {
    120
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
