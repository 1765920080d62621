//! Logging initialisation for loadgen
//!
//! Installs a global `tracing` subscriber configured from
//! [`loadgen_config::LoggingConfig`]: an `EnvFilter` for the level and one of
//! the text, JSON, compact or pretty formatters.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config};
