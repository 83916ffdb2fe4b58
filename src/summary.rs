//! Per-cluster aggregates for interpreting a partition.
//!
//! Quality and origin are reported next to the feature means but never took part in
//! the clustering.

use crate::cluster::ClusterAssignment;
use crate::dataset::{Dataset, Origin};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub size: usize,
    /// Mean of each raw feature, in dataset column order.
    pub feature_means: Vec<f64>,
    pub quality_mean: f64,
    pub origin_counts: BTreeMap<Origin, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub feature_names: Vec<String>,
    pub profiles: Vec<ClusterProfile>,
}

impl ClusterSummary {
    pub fn new(dataset: &Dataset, assignment: &ClusterAssignment) -> Result<Self> {
        check_lengths(dataset, assignment)?;

        let k = assignment.k();
        let n_features = dataset.n_features();
        let mut sums = vec![vec![0.0; n_features]; k];
        let mut quality_sums = vec![0.0; k];
        let mut origin_counts = vec![BTreeMap::new(); k];
        let sizes = assignment.cluster_sizes();

        for (i, &label) in assignment.labels().iter().enumerate() {
            let c = label - 1;
            for (sum, value) in sums[c].iter_mut().zip(dataset.features().row(i)) {
                *sum += value;
            }
            quality_sums[c] += f64::from(dataset.quality()[i]);
            *origin_counts[c].entry(dataset.origins()[i]).or_insert(0) += 1;
        }

        let profiles = (0..k)
            .map(|c| {
                let size = sizes[c];
                let scale = if size > 0 { 1.0 / size as f64 } else { f64::NAN };
                ClusterProfile {
                    cluster: c + 1,
                    size,
                    feature_means: sums[c].iter().map(|s| s * scale).collect(),
                    quality_mean: quality_sums[c] * scale,
                    origin_counts: std::mem::take(&mut origin_counts[c]),
                }
            })
            .collect();

        Ok(Self {
            feature_names: dataset.feature_names().to_vec(),
            profiles,
        })
    }

    pub fn profile(&self, cluster: usize) -> Option<&ClusterProfile> {
        self.profiles.iter().find(|p| p.cluster == cluster)
    }

    /// Mean of the named feature in `cluster`.
    pub fn feature_mean(&self, cluster: usize, feature: &str) -> Option<f64> {
        let column = self.feature_names.iter().position(|name| name == feature)?;
        self.profile(cluster).map(|p| p.feature_means[column])
    }
}

/// Record counts by quality grade (rows) and cluster (columns).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityCrosstab {
    /// Distinct quality grades present, ascending.
    pub qualities: Vec<u8>,
    /// `counts[row][cluster - 1]`, rows following `qualities`.
    pub counts: Vec<Vec<usize>>,
}

impl QualityCrosstab {
    pub fn new(dataset: &Dataset, assignment: &ClusterAssignment) -> Result<Self> {
        check_lengths(dataset, assignment)?;

        let mut table: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
        for (&quality, &label) in dataset.quality().iter().zip(assignment.labels()) {
            table.entry(quality).or_insert_with(|| vec![0; assignment.k()])[label - 1] += 1;
        }

        let (qualities, counts): (Vec<u8>, Vec<Vec<usize>>) = table.into_iter().unzip();
        Ok(Self { qualities, counts })
    }

    pub fn get(&self, quality: u8, cluster: usize) -> usize {
        self.qualities
            .iter()
            .position(|&q| q == quality)
            .and_then(|row| self.counts[row].get(cluster.wrapping_sub(1)).copied())
            .unwrap_or(0)
    }
}

fn check_lengths(dataset: &Dataset, assignment: &ClusterAssignment) -> Result<()> {
    if dataset.n_samples() != assignment.len() {
        return Err(Error::DimensionMismatch {
            expected: dataset.n_samples(),
            found: assignment.len(),
        });
    }
    Ok(())
}
