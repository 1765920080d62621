//! Core workloads for loadgen
//!
//! This crate contains the numeric kernels and the synthetic workload
//! simulators served by the HTTP layer. It has no async or web
//! dependencies: every entry point is a synchronous, request-scoped
//! computation that owns all of its working data.

pub mod analysis;
pub mod cpu;
pub mod error;
pub mod kernels;
pub mod memory;
pub mod process;

// Re-export commonly used types at the crate root
pub use analysis::{analyze, AnalysisReport, Transaction, UserTotal};
pub use cpu::{simulate_cpu, CpuReport, DEFAULT_CPU_ITERATIONS};
pub use error::{AnalysisError, KernelError, WorkloadError, WorkloadResult};
pub use kernels::{generate_primes, multiply_matrices, pearson_correlation, series_stats, Matrix, SeriesStats};
pub use memory::{simulate_memory, MemoryReport, MemorySummary, DEFAULT_MEMORY_SIZE};
