//! Memory-intensive workload simulator
//!
//! Builds a set of nested, reference-sharing structures sized by the caller:
//! a flat record list, per-category amount series, a per-user record index
//! and a dense numeric matrix. An optional heavy pass adds per-category
//! statistics and a pairwise correlation matrix over the category series.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Instant;

use crate::kernels::{pearson_correlation, series_stats, Matrix, SeriesStats};
use crate::process;

/// Records built when the caller asks for zero
pub const DEFAULT_MEMORY_SIZE: usize = 10_000;

/// Number of distinct record categories
pub const CATEGORY_COUNT: usize = 10;

/// Number of distinct record owners
pub const USER_COUNT: usize = 100;

/// Maximum row count of the dense matrix
pub const MATRIX_MAX_ROWS: usize = 1000;

/// Column count of the dense matrix
pub const MATRIX_COLS: usize = 100;

/// Maximum dimension of the correlation matrix
pub const CORRELATION_MAX_DIM: usize = 100;

const RECORD_TAGS: [&str; 3] = ["tag1", "tag2", "tag3"];

/// Synthetic record held by the flat list and the user index
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: usize,
    pub category: String,
    pub user_id: usize,
    pub amount: f64,
    pub metadata: RecordMetadata,
}

/// Nested per-record metadata
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMetadata {
    pub timestamp: i64,
    pub score: f64,
    pub tags: Vec<String>,
}

impl Record {
    fn synthetic(i: usize, timestamp: i64) -> Self {
        Self {
            id: i,
            category: format!("category_{}", i % CATEGORY_COUNT),
            user_id: i % USER_COUNT,
            amount: i as f64 * 1.5,
            metadata: RecordMetadata {
                timestamp,
                score: i as f64 * 2.3,
                tags: RECORD_TAGS.iter().map(|t| t.to_string()).collect(),
            },
        }
    }
}

/// Summary returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_items: usize,
    pub categories: usize,
    pub users: usize,
    pub category_totals: BTreeMap<String, f64>,
    pub matrix_size: usize,
    pub heavy_agg_done: bool,
    pub correlation_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_stats: Option<BTreeMap<String, SeriesStats>>,
}

/// Outcome of a memory workload run
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryReport {
    pub summary: MemorySummary,
    /// Whole-process resident memory sampled after the structures were built
    pub allocated_mb: f64,
    /// Records + categories + users
    pub structure_count: usize,
    pub elapsed_ms: f64,
    /// Pairwise category correlations; empty unless heavy aggregation ran
    pub correlation_matrix: Matrix,
}

/// Build `size` records and the derived structures; zero means [`DEFAULT_MEMORY_SIZE`].
pub fn simulate_memory(size: usize, heavy_aggregation: bool) -> MemoryReport {
    let size = if size == 0 { DEFAULT_MEMORY_SIZE } else { size };
    let start = Instant::now();
    let timestamp = chrono::Utc::now().timestamp();

    let mut records: Vec<Rc<Record>> = Vec::with_capacity(size);
    let mut category_series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut user_index: HashMap<usize, Vec<Rc<Record>>> = HashMap::new();

    for i in 0..size {
        let record = Rc::new(Record::synthetic(i, timestamp));

        category_series
            .entry(record.category.clone())
            .or_default()
            .push(record.amount);
        user_index
            .entry(record.user_id)
            .or_default()
            .push(Rc::clone(&record));
        records.push(record);
    }

    let matrix_size = size.min(MATRIX_MAX_ROWS);
    let transaction_matrix = dense_matrix(matrix_size);

    let category_totals: BTreeMap<String, f64> = category_series
        .iter()
        .map(|(category, amounts)| (category.clone(), amounts.iter().sum()))
        .collect();

    let (category_stats, correlation_matrix) = if heavy_aggregation {
        let stats: BTreeMap<String, SeriesStats> = category_series
            .iter()
            .map(|(category, amounts)| (category.clone(), series_stats(amounts)))
            .collect();
        (Some(stats), correlate_categories(&category_series))
    } else {
        (None, Matrix::new())
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let allocated_mb = process::resident_memory_mb();
    std::hint::black_box(&transaction_matrix);

    let summary = MemorySummary {
        total_items: records.len(),
        categories: category_series.len(),
        users: user_index.len(),
        category_totals,
        matrix_size: transaction_matrix.len(),
        heavy_agg_done: heavy_aggregation,
        correlation_size: correlation_matrix.len(),
        category_stats,
    };

    tracing::debug!(
        size,
        heavy_aggregation,
        elapsed_ms,
        allocated_mb,
        "Memory workload finished"
    );

    MemoryReport {
        structure_count: records.len() + category_series.len() + user_index.len(),
        summary,
        allocated_mb,
        elapsed_ms,
        correlation_matrix,
    }
}

fn dense_matrix(rows: usize) -> Matrix {
    (0..rows)
        .map(|i| (0..MATRIX_COLS).map(|j| (i * j) as f64 * 1.234).collect())
        .collect()
}

/// Pairwise Pearson correlation over the first categories in key order.
///
/// Self-pairs are computed like any other pair, so the diagonal is 1 only
/// where a series has nonzero variance.
fn correlate_categories(series: &BTreeMap<String, Vec<f64>>) -> Matrix {
    let selected: Vec<&[f64]> = series
        .values()
        .take(CORRELATION_MAX_DIM)
        .map(Vec::as_slice)
        .collect();

    selected
        .iter()
        .map(|x| selected.iter().map(|y| pearson_correlation(x, y)).collect())
        .collect()
}
