//! HTTP server configuration

use crate::error::ConfigResult;
use crate::validation::{validate_bind_address, validate_port_range, validate_required_string, Validatable};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to install the CORS layer
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_cors: bool,

    /// Whether to propagate or generate `X-Request-ID`
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_request_id: bool,

    /// Whether to install the HTTP tracing layer
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,

    /// Grace period for in-flight requests on shutdown
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins (`*` allows any)
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
            shutdown_timeout: default_shutdown_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn socket_address(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_bind_address(&self.bind_address, "bind_address", self.domain_name())?;
        validate_port_range(self.port, "port", self.domain_name())?;
        if self.shutdown_timeout.is_zero() {
            return Err(self.validation_error("shutdown_timeout must be greater than 0"));
        }
        self.cors.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

impl Validatable for CorsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.allowed_origins.is_empty() {
            return Err(self.validation_error("At least one allowed origin is required"));
        }

        for origin in &self.allowed_origins {
            validate_required_string(origin, "allowed_origins entry", self.domain_name())?;
            if origin != "*" && origin.parse::<HeaderValue>().is_err() {
                return Err(self.validation_error(format!("Invalid origin '{}'", origin.escape_debug())));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server.cors"
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
