//! Frequency tables and derived dashboard metrics.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::{Demand, UNASSIGNED};

/// Count records per distinct value of the selector.
///
/// Only values that actually occur appear in the output; the sum of all
/// counts equals `records.len()`.
pub fn count_by<T, K, F>(records: &[T], selector: F) -> HashMap<K, usize>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(selector(record)).or_insert(0) += 1;
    }
    counts
}

/// True when a demand has a real resource mapped (not empty, not the
/// "Unassigned" sentinel).
pub fn is_resource_mapped(demand: &Demand) -> bool {
    demand
        .resource_mapped
        .as_deref()
        .map(|r| !r.trim().is_empty() && r != UNASSIGNED)
        .unwrap_or(false)
}

/// Percentage of demands with a real resource mapped, rounded half-up.
/// Zero when the input is empty.
pub fn fulfillment_rate(demands: &[Demand]) -> u32 {
    let total = demands.len();
    if total == 0 {
        return 0;
    }
    let mapped = demands.iter().filter(|d| is_resource_mapped(d)).count();
    percent_round_half_up(mapped, total)
}

/// round(100 * part / whole), half rounding up. `whole` must be non-zero.
fn percent_round_half_up(part: usize, whole: usize) -> u32 {
    ((200 * part + whole) / (2 * whole)) as u32
}
