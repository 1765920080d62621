pub mod health;
pub mod metrics;
pub mod workloads;

// Re-export handler functions
pub use health::*;
pub use metrics::*;
pub use workloads::*;
