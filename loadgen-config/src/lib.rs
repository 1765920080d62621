//! Domain-driven configuration management for loadgen
//!
//! Configuration is split into server, logging and runtime domains, each
//! with serde defaults and validation. [`ConfigLoader`] reads an optional
//! file and applies `LOADGEN_*` environment overrides on top.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    runtime::RuntimeConfig,
    server::{CorsConfig, ServerConfig},
    LoadgenConfig,
};
