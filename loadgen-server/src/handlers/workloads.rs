//! Workload endpoints
//!
//! Workloads are synchronous and CPU-bound, so each one runs on the blocking
//! pool. Query parameters never cause a rejection: missing or unusable values
//! fall back to the workload defaults.

use axum::{extract::rejection::JsonRejection, Json};
use loadgen_core::{analyze, simulate_cpu, simulate_memory, AnalysisReport, WorkloadError, DEFAULT_CPU_ITERATIONS, DEFAULT_MEMORY_SIZE};
use loadgen_web::{WebError, WebResult, WorkloadParams};
use tracing::{debug, error};

use crate::models::{AnalyzeRequest, CpuResponse, MemoryResponse};

/// Run a workload on the blocking pool, mapping a panicked task to a 500
async fn run_blocking<F, T>(task: &'static str, work: F) -> WebResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!(task, "Workload task failed: {}", e);
        WebError::internal(format!("{} workload failed", task))
    })
}

/// CPU workload: `iterations` rounds of scalar and matrix work
pub async fn cpu_workload(params: WorkloadParams) -> WebResult<Json<CpuResponse>> {
    let iterations = params.positive_int("iterations").unwrap_or(DEFAULT_CPU_ITERATIONS);
    debug!(iterations, "Running CPU workload");

    let report = run_blocking("cpu", move || simulate_cpu(iterations)).await??;
    Ok(Json(report.into()))
}

/// Memory workload: `size` synthetic records, optional heavy aggregation
pub async fn memory_workload(params: WorkloadParams) -> WebResult<Json<MemoryResponse>> {
    let size = params
        .positive_int("size")
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or(DEFAULT_MEMORY_SIZE);
    let heavy = params.flag("heavy_agg");
    debug!(size, heavy, "Running memory workload");

    let report = run_blocking("memory", move || simulate_memory(size, heavy)).await?;
    Ok(Json(report.into()))
}

/// Transaction analysis over a caller-supplied batch
pub async fn analyze_transactions(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> WebResult<Json<AnalysisReport>> {
    let Json(request) = payload.map_err(|rejection| WebError::bad_request(rejection.body_text()))?;
    debug!(
        transactions = request.transactions.len(),
        expand_factor = request.expand_factor,
        heavy_agg = request.heavy_agg,
        "Running transaction analysis"
    );

    let report = run_blocking("analyze", move || {
        analyze(&request.transactions, request.expand_factor, request.heavy_agg)
    })
    .await?
    .map_err(WorkloadError::from)?;

    Ok(Json(report))
}
