//! Transaction batch analysis workload
//!
//! Expands a caller-supplied batch, aggregates it per category and per user,
//! and materialises history and matrix structures whose size grows with the
//! expansion factor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::error::AnalysisError;
use crate::kernels::{series_stats, Matrix, SeriesStats};

pub const MIN_EXPAND_FACTOR: i64 = 1;
pub const MAX_EXPAND_FACTOR: i64 = 50;

/// Number of users reported in `top_users`
pub const TOP_USERS: usize = 10;

/// Width of each transaction matrix row
pub const MATRIX_ROW_WIDTH: usize = 100;

/// Cap on the outer-product matrix built by the heavy pass
pub const OUTER_PRODUCT_MAX_DIM: usize = 1000;

const TRANSACTION_BYTES: usize = 200;
const HISTORY_ENTRY_BYTES: usize = 150;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A single caller-supplied transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub user_id: i64,
    pub ts: String,
}

/// Aggregated spend of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTotal {
    pub user_id: i64,
    pub total: f64,
    pub count: usize,
}

/// Sizes of the structures materialised during analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuresCreated {
    pub category_history: usize,
    pub user_history: usize,
    pub transaction_matrix_rows: usize,
}

/// Outcome of a transaction analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub num_input: usize,
    pub expanded: usize,
    pub totals_by_category: BTreeMap<String, f64>,
    pub top_users: Vec<UserTotal>,
    pub elapsed_ms: f64,
    pub peak_memory_est_mb: f64,
    pub structures_created: StructuresCreated,
}

/// Key, amount, timestamp and a derived value kept per history entry
type HistoryEntry<'a> = (i64, f64, &'a str, f64);

/// Check that an expansion factor lies within the accepted range.
pub fn validate_expand_factor(expand_factor: i64) -> Result<usize, AnalysisError> {
    if !(MIN_EXPAND_FACTOR..=MAX_EXPAND_FACTOR).contains(&expand_factor) {
        return Err(AnalysisError::ExpandFactorOutOfRange {
            actual: expand_factor,
            min: MIN_EXPAND_FACTOR,
            max: MAX_EXPAND_FACTOR,
        });
    }
    Ok(expand_factor as usize)
}

/// Analyse `transactions` repeated `expand_factor` times.
pub fn analyze(
    transactions: &[Transaction],
    expand_factor: i64,
    heavy_agg: bool,
) -> Result<AnalysisReport, AnalysisError> {
    let factor = validate_expand_factor(expand_factor)?;
    let start = Instant::now();

    let expanded: Vec<&Transaction> = std::iter::repeat(transactions)
        .take(factor)
        .flatten()
        .collect();

    let mut totals_by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut per_user: HashMap<i64, (f64, usize)> = HashMap::new();
    let mut category_history: HashMap<&str, Vec<HistoryEntry<'_>>> = HashMap::new();
    let mut user_history: HashMap<i64, Vec<HistoryEntry<'_>>> = HashMap::new();

    for t in &expanded {
        *totals_by_category.entry(t.category.clone()).or_default() += t.amount;

        let user = per_user.entry(t.user_id).or_default();
        user.0 += t.amount;
        user.1 += 1;

        category_history
            .entry(t.category.as_str())
            .or_default()
            .push((t.user_id, t.amount, t.ts.as_str(), t.amount.powi(2)));
        user_history
            .entry(t.user_id)
            .or_default()
            .push((t.id, t.amount, t.ts.as_str(), t.amount.powi(3)));
    }

    let transaction_matrix: Matrix = expanded
        .iter()
        .map(|t| vec![t.amount; MATRIX_ROW_WIDTH])
        .collect();

    let mut top_users: Vec<UserTotal> = per_user
        .iter()
        .map(|(&user_id, &(total, count))| UserTotal {
            user_id,
            total,
            count,
        })
        .collect();
    top_users.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    top_users.truncate(TOP_USERS);

    if heavy_agg {
        let (bucket_stats, outer) = heavy_pass(&expanded, &per_user);
        std::hint::black_box((&bucket_stats, &outer));
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let history_entries: usize = category_history.values().map(Vec::len).sum();
    let user_history_entries: usize = user_history.values().map(Vec::len).sum();
    std::hint::black_box((&category_history, &user_history, &transaction_matrix));
    let peak_bytes = expanded.len() * TRANSACTION_BYTES
        + history_entries * HISTORY_ENTRY_BYTES
        + user_history_entries * HISTORY_ENTRY_BYTES
        + transaction_matrix.len() * MATRIX_ROW_WIDTH * std::mem::size_of::<f64>();

    tracing::debug!(
        num_input = transactions.len(),
        expanded = expanded.len(),
        heavy_agg,
        elapsed_ms,
        "Transaction analysis finished"
    );

    Ok(AnalysisReport {
        num_input: transactions.len(),
        expanded: expanded.len(),
        totals_by_category,
        top_users,
        elapsed_ms,
        peak_memory_est_mb: peak_bytes as f64 / BYTES_PER_MB,
        structures_created: StructuresCreated {
            category_history: category_history.len(),
            user_history: user_history.len(),
            transaction_matrix_rows: transaction_matrix.len(),
        },
    })
}

/// Per-(category, user) statistics plus an outer product over user totals.
fn heavy_pass(
    expanded: &[&Transaction],
    per_user: &HashMap<i64, (f64, usize)>,
) -> (HashMap<(String, i64), SeriesStats>, Matrix) {
    let mut buckets: HashMap<(String, i64), Vec<f64>> = HashMap::new();
    for t in expanded {
        buckets
            .entry((t.category.clone(), t.user_id))
            .or_default()
            .push(t.amount);
    }

    let stats = buckets
        .into_iter()
        .map(|(key, amounts)| (key, series_stats(&amounts)))
        .collect();

    let user_amounts: Vec<f64> = per_user
        .values()
        .map(|&(total, _)| total)
        .take(OUTER_PRODUCT_MAX_DIM)
        .collect();
    let outer = user_amounts
        .iter()
        .map(|a| user_amounts.iter().map(|b| a * b).collect())
        .collect();

    (stats, outer)
}
