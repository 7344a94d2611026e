//! End-to-end pipeline test: write benchmark input files, load them back,
//! build the index, and verify recall against exact groundtruth.

use rangehnsw_bench::{eval, io};
use rangehnsw_core::{BuildParams, RangeIndex};
use std::io::Write;
use std::path::Path;

fn write_fvecs(path: &Path, dim: usize, data: &[f32]) {
    let mut file = std::fs::File::create(path).unwrap();
    for row in data.chunks(dim) {
        file.write_all(&(dim as i32).to_le_bytes()).unwrap();
        for v in row {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
    }
}

fn write_ivecs(path: &Path, rows: &[Vec<i32>]) {
    let mut file = std::fs::File::create(path).unwrap();
    for row in rows {
        file.write_all(&(row.len() as i32).to_le_bytes()).unwrap();
        for v in row {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
    }
}

/// Deterministic pseudo-random f32 in [-1, 1).
fn noise(seed: usize) -> f32 {
    let x = seed.wrapping_mul(2654435761) % 100_000;
    x as f32 / 50_000.0 - 1.0
}

#[test]
fn files_to_recall_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (n, dim, query_count, k) = (400usize, 8usize, 20usize, 5usize);

    let vectors: Vec<f32> = (0..n * dim).map(noise).collect();
    let values: Vec<i32> = (0..n).map(|i| ((i * 37) % 500) as i32).collect();
    let queries: Vec<f32> = (0..query_count * dim).map(|i| noise(i + 999)).collect();
    let ranges: Vec<(i32, i32)> = (0..query_count)
        .map(|i| {
            let low = ((i * 53) % 300) as i32;
            (low, low + 150)
        })
        .collect();

    // Exact groundtruth by brute force over the eligible set.
    let groundtruth: Vec<Vec<i32>> = (0..query_count)
        .map(|qi| {
            let q = &queries[qi * dim..(qi + 1) * dim];
            let (low, high) = ranges[qi];
            let mut eligible: Vec<(f32, i32)> = (0..n)
                .filter(|&id| low <= values[id] && values[id] <= high)
                .map(|id| {
                    let row = &vectors[id * dim..(id + 1) * dim];
                    let dist: f32 = row.iter().zip(q).map(|(a, b)| (a - b) * (a - b)).sum();
                    (dist, id as i32)
                })
                .collect();
            eligible.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            eligible.into_iter().take(k).map(|(_, id)| id).collect()
        })
        .collect();

    // Write every input in its benchmark file format.
    let data_path = dir.path().join("base.fvecs");
    let query_path = dir.path().join("query.fvecs");
    let attr_path = dir.path().join("attrs.data");
    let ranges_path = dir.path().join("ranges.csv");
    let gt_path = dir.path().join("gt.ivecs");

    write_fvecs(&data_path, dim, &vectors);
    write_fvecs(&query_path, dim, &queries);
    write_ivecs(&gt_path, &groundtruth);
    {
        let mut f = std::fs::File::create(&attr_path).unwrap();
        writeln!(f, "key value").unwrap();
        for (i, v) in values.iter().enumerate() {
            writeln!(f, "{i} {v}").unwrap();
        }
    }
    {
        let mut f = std::fs::File::create(&ranges_path).unwrap();
        writeln!(f, "range").unwrap();
        for (low, high) in &ranges {
            writeln!(f, "{low}-{high}").unwrap();
        }
    }

    // Load back through the harness readers.
    let (file_dim, loaded_vectors) = io::read_fvecs(&data_path).unwrap();
    assert_eq!(file_dim, dim);
    assert_eq!(loaded_vectors, vectors);
    let (_, loaded_queries) = io::read_fvecs(&query_path).unwrap();
    let (keys, loaded_values) = io::read_attributes(&attr_path).unwrap();
    assert_eq!(loaded_values, values);
    let loaded_ranges = io::read_ranges(&ranges_path).unwrap();
    assert_eq!(loaded_ranges, ranges);
    let loaded_gt = io::read_ivecs(&gt_path).unwrap();
    assert_eq!(loaded_gt, groundtruth);

    // Build and query with a generous ef; recall on 400 points should be high.
    let params = BuildParams {
        m: 12,
        ef_construction: 80,
        workers: 2,
        ..BuildParams::default()
    };
    let index = RangeIndex::build(dim, &loaded_vectors, &keys, &loaded_values, &params).unwrap();

    let results: Vec<Vec<u32>> = loaded_ranges
        .iter()
        .enumerate()
        .map(|(i, &(low, high))| {
            let q = &loaded_queries[i * dim..(i + 1) * dim];
            index
                .query_range(q, low, high, k, 64)
                .unwrap()
                .into_iter()
                .map(|(id, _)| id)
                .collect()
        })
        .collect();

    let recall = eval::recall(&results, &loaded_gt, k);
    assert!(recall >= 0.95, "pipeline recall {recall}");
}
