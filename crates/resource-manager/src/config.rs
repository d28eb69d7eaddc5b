//! Server configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RESOURCE_SERVER_PORT` | 8080 | Server port |
//! | `RESOURCE_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `RESOURCE_LOG_LEVEL` | info | Log level |
//! | `RESOURCE_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `RESOURCE_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `RESOURCE_ENABLE_CORS` | true | Enable CORS |
//! | `RESOURCE_CORS_ORIGINS` | * | Allowed origins |
//! | `RESOURCE_CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `RESOURCE_CORS_HEADERS` | Content-Type,Accept,X-Request-Id | Allowed headers |
//! | `RESOURCE_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//!
//! # Example
//!
//! ```rust
//! use resource_manager::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(config.socket_addr(), "0.0.0.0:3000");
//! ```

use clap::Parser;

use crate::manager::{DEFAULT_BODY_LIMIT, ManagerConfig};

const DEFAULT_CORS_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const DEFAULT_CORS_HEADERS: &str = "Content-Type,Accept,X-Request-Id";

/// Server configuration.
///
/// Built from environment variables with [`ServerConfig::from_env`], from the
/// command line with [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "resource-server")]
#[command(about = "Generic resource CRUD server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "RESOURCE_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "RESOURCE_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "RESOURCE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "RESOURCE_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "RESOURCE_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "RESOURCE_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "RESOURCE_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "RESOURCE_CORS_METHODS", default_value = DEFAULT_CORS_METHODS)]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(long, env = "RESOURCE_CORS_HEADERS", default_value = DEFAULT_CORS_HEADERS)]
    pub cors_headers: String,

    /// Enable request ID tracking.
    #[arg(long, env = "RESOURCE_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: DEFAULT_BODY_LIMIT,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: DEFAULT_CORS_METHODS.to_string(),
            cors_headers: DEFAULT_CORS_HEADERS.to_string(),
            enable_request_id: true,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from environment variables, without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse_from(["resource-server"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// A [`ManagerConfig`] with this server's body limit.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            body_limit: self.max_body_size,
            ..Default::default()
        }
    }

    /// Validates the configuration, reporting every invalid field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.host.trim().is_empty() {
            errors.push("Host cannot be empty".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if !matches!(
            self.log_level.to_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses an ephemeral port, a short timeout, and no CORS or request id
    /// layers.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: DEFAULT_BODY_LIMIT,
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            enable_request_id: false,
        }
    }
}
