//! Workload request and response bodies

use loadgen_core::{CpuReport, MemoryReport, MemorySummary, Transaction};
use serde::{Deserialize, Serialize};

/// Response for `/cpu`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuResponse {
    /// Top-left element of each round's product, first rounds only
    pub result: Vec<f64>,
    pub operations: u64,
    pub elapsed_ms: f64,
}

impl From<CpuReport> for CpuResponse {
    fn from(report: CpuReport) -> Self {
        Self {
            result: report.sample,
            operations: report.operation_count,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// Response for `/memory`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub result: MemorySummary,
    pub allocated_mb: f64,
    pub structures_count: usize,
    pub elapsed_ms: f64,
}

impl From<MemoryReport> for MemoryResponse {
    fn from(report: MemoryReport) -> Self {
        Self {
            result: report.summary,
            allocated_mb: report.allocated_mb,
            structures_count: report.structure_count,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub transactions: Vec<Transaction>,
    #[serde(default = "default_expand_factor")]
    pub expand_factor: i64,
    #[serde(default)]
    pub heavy_agg: bool,
}

fn default_expand_factor() -> i64 {
    1
}
