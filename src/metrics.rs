//! Partition quality scores.

use crate::cluster::ClusterAssignment;
use crate::distance::DissimilarityMatrix;
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Silhouette coefficient `(b - a) / max(a, b)` of every record.
///
/// `a` is the mean distance to the rest of the record's cluster, `b` the smallest mean
/// distance to any other cluster. Records in singleton clusters, and records with no
/// other cluster to compare against (`k = 1`), score 0.
pub fn silhouette_samples(assignment: &ClusterAssignment, distances: &DissimilarityMatrix) -> Result<Vec<f64>> {
    let n = assignment.len();
    if n != distances.len() {
        return Err(Error::DimensionMismatch {
            expected: distances.len(),
            found: n,
        });
    }

    let labels = assignment.labels();
    let sizes = assignment.cluster_sizes();
    let k = assignment.k();

    let scores = (0..n)
        .into_par_iter()
        .map(|i| {
            let own = labels[i] - 1;
            if sizes[own] < 2 {
                return 0.0;
            }

            let mut sums = vec![0.0; k];
            for (j, &l) in labels.iter().enumerate() {
                if j != i {
                    sums[l - 1] += distances.get(i, j);
                }
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);
            if !b.is_finite() {
                return 0.0;
            }

            let denom = a.max(b);
            if denom > 0.0 { (b - a) / denom } else { 0.0 }
        })
        .collect();

    Ok(scores)
}

/// Mean silhouette coefficient over all records, in `[-1, 1]`.
pub fn silhouette_score(assignment: &ClusterAssignment, distances: &DissimilarityMatrix) -> Result<f64> {
    let samples = silhouette_samples(assignment, distances)?;
    if samples.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}
