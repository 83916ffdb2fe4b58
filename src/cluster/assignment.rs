use crate::error::{Error, Result};
use serde::Serialize;

/// Flat partition of `n` records into clusters numbered `1..=k`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    k: usize,
    labels: Vec<usize>,
}

impl ClusterAssignment {
    /// Builds from 1-based labels, checking every label lies in `1..=k`.
    pub fn new(labels: Vec<usize>, k: usize) -> Result<Self> {
        if k == 0 || k > labels.len() {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| l == 0 || l > k) {
            return Err(Error::InvalidParameter {
                name: "labels",
                message: format!("label {bad} outside 1..={k}"),
            });
        }
        Ok(Self { k, labels })
    }

    pub(crate) fn from_zero_based(labels: &[usize], k: usize) -> Self {
        Self {
            k,
            labels: labels.iter().map(|&l| l + 1).collect(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Cluster id of each record, in record order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied()
    }

    /// Record count per cluster; entry `c - 1` holds cluster `c`.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &l in &self.labels {
            sizes[l - 1] += 1;
        }
        sizes
    }

    /// Record indices assigned to `cluster`, ascending.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// True when both assignments group the records identically, whatever the ids.
    pub fn same_partition(&self, other: &ClusterAssignment) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut forward = vec![0; self.k + 1];
        let mut backward = vec![0; other.k + 1];
        for (&a, &b) in self.labels.iter().zip(&other.labels) {
            if forward[a] == 0 && backward[b] == 0 {
                forward[a] = b;
                backward[b] = a;
            } else if forward[a] != b || backward[b] != a {
                return false;
            }
        }
        true
    }
}
