//! Analysis options.
//!
//! Configuration is a JSON document; every field is optional and falls back to the
//! defaults below.
//!
//! ```rust
//! use vinoclust::{AnalysisConfig, Linkage};
//!
//! let config = AnalysisConfig::from_json_str(r#"{ "seed": 7, "k_max": 8, "linkage": "average" }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.k_range(), 2..=8);
//! assert_eq!(config.linkage, Linkage::Average);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Rule for the distance between two clusters during agglomerative merging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Minimum pairwise distance.
    Single,
    /// Maximum pairwise distance.
    #[default]
    Complete,
    /// Mean pairwise distance (UPGMA).
    Average,
}

/// Point-to-point distance used for the dissimilarity matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    pub fn distance(self, a: &ndarray::ArrayView1<f64>, b: &ndarray::ArrayView1<f64>) -> f64 {
        match self {
            Metric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Metric::Manhattan => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seed for centroid initialization.
    pub seed: u64,
    /// Smallest cluster count evaluated by a sweep.
    pub k_min: usize,
    /// Largest cluster count evaluated by a sweep (inclusive).
    pub k_max: usize,
    pub linkage: Linkage,
    pub metric: Metric,
    /// Lloyd iteration cap.
    pub max_iter: usize,
    pub red_path: Option<PathBuf>,
    pub white_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            k_min: 2,
            k_max: 20,
            linkage: Linkage::default(),
            metric: Metric::default(),
            max_iter: 300,
            red_path: None,
            white_path: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn k_range(&self) -> RangeInclusive<usize> {
        self.k_min..=self.k_max
    }

    pub fn with_k_range(mut self, range: RangeInclusive<usize>) -> Self {
        self.k_min = *range.start();
        self.k_max = *range.end();
        self
    }

    pub fn linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_min == 0 {
            return Err(Error::InvalidParameter {
                name: "k_min",
                message: "must be at least 1".to_string(),
            });
        }
        if self.k_min > self.k_max {
            return Err(Error::InvalidParameter {
                name: "k_max",
                message: format!("must be >= k_min ({}), got {}", self.k_min, self.k_max),
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
