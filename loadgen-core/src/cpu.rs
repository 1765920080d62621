//! CPU-intensive workload simulator
//!
//! Each round runs a scalar transcendental loop over the first primes of a
//! fixed pool and multiplies two deterministic 50×50 matrices. Latency and
//! CPU time scale linearly with the number of rounds; there is no upper bound.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::WorkloadResult;
use crate::kernels::{generate_primes, multiply_matrices, Matrix};

/// Rounds used when the caller asks for zero
pub const DEFAULT_CPU_ITERATIONS: u64 = 100;

/// Upper bound of the prime pool generated once per run
pub const PRIME_POOL_LIMIT: usize = 10_000;

/// Primes consumed by the scalar loop in each round
pub const SCALAR_PASSES: usize = 100;

/// Side length of the matrices multiplied in each round
pub const MATRIX_DIM: usize = 50;

/// Maximum number of per-round samples returned
pub const MAX_SAMPLES: usize = 10;

/// Outcome of a CPU workload run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuReport {
    /// Top-left element of the first (at most ten) round results
    pub sample: Vec<f64>,
    /// Scalar passes plus multiply-adds over the whole run
    pub operation_count: u64,
    /// Wall time of the whole run
    pub elapsed_ms: f64,
}

/// Run `iterations` rounds of CPU work; zero means [`DEFAULT_CPU_ITERATIONS`].
pub fn simulate_cpu(iterations: u64) -> WorkloadResult<CpuReport> {
    let iterations = if iterations == 0 {
        DEFAULT_CPU_ITERATIONS
    } else {
        iterations
    };

    let start = Instant::now();
    let primes = generate_primes(PRIME_POOL_LIMIT);
    let scalar_primes = &primes[..SCALAR_PASSES.min(primes.len())];

    let mut sample = Vec::with_capacity(MAX_SAMPLES);
    let mut operation_count: u64 = 0;

    for round in 0..iterations {
        let mut value = round as f64;
        for &p in scalar_primes {
            value = (value.powf(1.01) + (p as f64).sin()).abs().sqrt();
            operation_count += 1;
        }
        std::hint::black_box(value);

        let (a, b) = round_matrices(round);
        let product = multiply_matrices(&a, &b)?;
        operation_count += (MATRIX_DIM * MATRIX_DIM * MATRIX_DIM) as u64;

        if sample.len() < MAX_SAMPLES {
            sample.push(product[0][0]);
        }
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(iterations, operation_count, elapsed_ms, "CPU workload finished");

    Ok(CpuReport {
        sample,
        operation_count,
        elapsed_ms,
    })
}

/// Deterministic operands for a round: `A[j][k] = j·k + i`, `B[j][k] = j + k + i`.
fn round_matrices(round: u64) -> (Matrix, Matrix) {
    let i = round as f64;
    let mut a = vec![vec![0.0; MATRIX_DIM]; MATRIX_DIM];
    let mut b = vec![vec![0.0; MATRIX_DIM]; MATRIX_DIM];

    for j in 0..MATRIX_DIM {
        for k in 0..MATRIX_DIM {
            a[j][k] = (j * k) as f64 + i;
            b[j][k] = (j + k) as f64 + i;
        }
    }

    (a, b)
}
