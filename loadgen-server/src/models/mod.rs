pub mod common;
pub mod workloads;

pub use common::{EndpointInfo, HealthResponse, ServiceDescriptor};
pub use workloads::{AnalyzeRequest, CpuResponse, MemoryResponse};
