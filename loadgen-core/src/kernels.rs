//! Numeric kernels driven by the workload simulators
//!
//! Every function here is pure: no shared state, no I/O, deterministic output.

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Dense row-major matrix; all rows have equal length
pub type Matrix = Vec<Vec<f64>>;

/// Return every prime `<= limit` using a boolean sieve of size `limit + 1`.
pub fn generate_primes(limit: usize) -> Vec<usize> {
    if limit < 2 {
        return Vec::new();
    }

    let mut sieve = vec![true; limit + 1];
    sieve[0] = false;
    sieve[1] = false;

    let mut i = 2;
    while i * i <= limit {
        if sieve[i] {
            let mut j = i * i;
            while j <= limit {
                sieve[j] = false;
                j += i;
            }
        }
        i += 1;
    }

    sieve
        .iter()
        .enumerate()
        .filter_map(|(n, &is_prime)| is_prime.then_some(n))
        .collect()
}

/// Multiply `a` (m×n) by `b` (n×p), producing an m×p matrix.
///
/// Dimensions are checked up front: `b` must be non-empty and rectangular
/// and every row of `a` must have exactly `b.len()` entries.
pub fn multiply_matrices(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Matrix, KernelError> {
    let inner = b.len();
    let cols = b.first().map(Vec::len).ok_or(KernelError::EmptyMatrix)?;

    if let Some((row, actual)) = b
        .iter()
        .enumerate()
        .find_map(|(row, r)| (r.len() != cols).then_some((row, r.len())))
    {
        return Err(KernelError::RaggedMatrix {
            row,
            expected: cols,
            actual,
        });
    }

    if let Some(row) = a.iter().find(|row| row.len() != inner) {
        return Err(KernelError::DimensionMismatch {
            left_cols: row.len(),
            right_rows: inner,
        });
    }

    let result: Matrix = a
        .iter()
        .map(|a_row| {
            (0..cols)
                .map(|j| a_row.iter().zip(b).map(|(x, b_row)| x * b_row[j]).sum::<f64>())
                .collect()
        })
        .collect();

    Ok(result)
}

/// Pearson correlation coefficient of two series.
///
/// Returns 0 when the lengths differ, either series is empty, or either
/// series has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        numerator += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return 0.0;
    }

    numerator / (denom_x * denom_y).sqrt()
}

/// Mean and population standard deviation of a series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub stddev: f64,
}

/// Compute mean and population (divisor `n`) standard deviation.
pub fn series_stats(values: &[f64]) -> SeriesStats {
    if values.is_empty() {
        return SeriesStats::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    SeriesStats {
        mean,
        stddev: variance.sqrt(),
    }
}
