pub mod query;

// Re-export commonly used extractors
pub use query::WorkloadParams;
