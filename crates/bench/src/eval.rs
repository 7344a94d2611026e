//! Recall and throughput evaluation.
//!
//! Recall follows the benchmark convention: the fraction of the first `k`
//! groundtruth ids that appear anywhere in the returned result set,
//! averaged over queries with a fixed denominator of `query_count * k`.

use std::collections::HashSet;

/// Recall@k of one query's result ids against its groundtruth row.
/// Counts true positives against the first `k` groundtruth entries.
pub fn true_positives(result_ids: &[u32], groundtruth: &[i32], k: usize) -> usize {
    let result_set: HashSet<i64> = result_ids.iter().map(|&id| id as i64).collect();
    groundtruth
        .iter()
        .take(k)
        .filter(|&&gt| result_set.contains(&(gt as i64)))
        .count()
}

/// Aggregate recall over a query batch: `total true positives / (queries * k)`.
pub fn recall(results: &[Vec<u32>], groundtruth: &[Vec<i32>], k: usize) -> f64 {
    if results.is_empty() || k == 0 {
        return 0.0;
    }
    let hits: usize = results
        .iter()
        .zip(groundtruth.iter())
        .map(|(res, gt)| true_positives(res, gt, k))
        .sum();
    hits as f64 / (results.len() * k) as f64
}

/// Queries per second over a measured wall-clock duration.
pub fn qps(query_count: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    query_count as f64 / elapsed_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_positives_order_independent() {
        assert_eq!(true_positives(&[3, 1, 2], &[1, 2, 3], 3), 3);
        assert_eq!(true_positives(&[9, 1], &[1, 2, 3], 3), 1);
        assert_eq!(true_positives(&[], &[1, 2, 3], 3), 0);
    }

    #[test]
    fn test_true_positives_ignores_groundtruth_tail() {
        // Only the first k groundtruth entries count.
        assert_eq!(true_positives(&[5], &[1, 2, 5], 2), 0);
    }

    #[test]
    fn test_recall_fixed_denominator() {
        let results = vec![vec![1, 2], vec![7, 8]];
        let gt = vec![vec![1, 2], vec![1, 2]];
        assert_eq!(recall(&results, &gt, 2), 0.5);
    }

    #[test]
    fn test_recall_short_groundtruth_row() {
        // A groundtruth row shorter than k still divides by k.
        let results = vec![vec![1]];
        let gt = vec![vec![1]];
        assert_eq!(recall(&results, &gt, 2), 0.5);
    }

    #[test]
    fn test_qps() {
        assert_eq!(qps(100, 2.0), 50.0);
        assert_eq!(qps(100, 0.0), 0.0);
    }
}
