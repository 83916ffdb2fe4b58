//! K-means evaluation over a range of cluster counts.
//!
//! ```rust
//! use vinoclust::{DissimilarityMatrix, Metric, StandardScaler, Sweep};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.2, 0.1], [9.0, 9.0], [9.1, 9.2], [4.0, 5.0]];
//! let scaled = StandardScaler::new().fit_transform(&x).unwrap();
//! let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);
//!
//! let points = Sweep::new(&scaled, &distances, 2..=4)
//!     .unwrap()
//!     .collect::<vinoclust::Result<Vec<_>>>()
//!     .unwrap();
//! assert_eq!(points.iter().map(|p| p.k).collect::<Vec<_>>(), vec![2, 3, 4]);
//! ```

use crate::cluster::KMeans;
use crate::distance::DissimilarityMatrix;
use crate::error::{Error, Result};
use crate::metrics::silhouette_score;
use crate::preprocessing::StandardizedFeatureMatrix;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Mean silhouette of the k-means partition at one cluster count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub k: usize,
    pub score: f64,
}

/// Lazy sequence of [`SweepPoint`]s, one per `k` in ascending order.
///
/// Nothing runs until the iterator is advanced. Cloning an unstarted sweep gives an
/// independent copy that yields the same points.
#[derive(Clone, Debug)]
pub struct Sweep<'a> {
    matrix: &'a StandardizedFeatureMatrix,
    distances: &'a DissimilarityMatrix,
    ks: RangeInclusive<usize>,
    seed: u64,
    max_iter: usize,
}

impl<'a> Sweep<'a> {
    pub fn new(
        matrix: &'a StandardizedFeatureMatrix,
        distances: &'a DissimilarityMatrix,
        k_range: RangeInclusive<usize>,
    ) -> Result<Self> {
        let n = matrix.nrows();
        if n != distances.len() {
            return Err(Error::DimensionMismatch {
                expected: distances.len(),
                found: n,
            });
        }
        if k_range.is_empty() {
            return Err(Error::InvalidParameter {
                name: "k_range",
                message: format!("{}..={} is empty", k_range.start(), k_range.end()),
            });
        }
        for k in [*k_range.start(), *k_range.end()] {
            if k == 0 || k > n {
                return Err(Error::InvalidClusterCount {
                    requested: k,
                    n_items: n,
                });
            }
        }

        Ok(Self {
            matrix,
            distances,
            ks: k_range,
            seed: 42,
            max_iter: 300,
        })
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn evaluate(&self, k: usize) -> Result<SweepPoint> {
        let assignment = KMeans::new(k)
            .seed(self.seed)
            .max_iter(self.max_iter)
            .run(self.matrix.as_matrix())?;
        let score = silhouette_score(&assignment, self.distances)?;
        tracing::debug!(k, score, "sweep point");
        Ok(SweepPoint { k, score })
    }
}

impl Iterator for Sweep<'_> {
    type Item = Result<SweepPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.ks.next()?;
        Some(self.evaluate(k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ks.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Metric;
    use crate::preprocessing::StandardScaler;
    use ndarray::array;

    #[test]
    fn test_sweep_is_lazy_and_restartable() {
        let x = array![[0.0, 0.0], [0.1, 0.1], [5.0, 5.0], [5.1, 5.0]];
        let scaled = StandardScaler::new().fit_transform(&x).unwrap();
        let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);

        let sweep = Sweep::new(&scaled, &distances, 2..=3).unwrap().seed(5);
        assert_eq!(sweep.size_hint(), (2, Some(2)));
        let first: Vec<SweepPoint> = sweep.clone().map(|p| p.unwrap()).collect();
        let second: Vec<SweepPoint> = sweep.map(|p| p.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_sweep_rejects_bad_range() {
        let x = array![[0.0], [1.0], [2.0]];
        let scaled = StandardScaler::new().fit_transform(&x).unwrap();
        let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);

        assert!(matches!(
            Sweep::new(&scaled, &distances, 2..=4),
            Err(Error::InvalidClusterCount { requested: 4, n_items: 3 })
        ));
        assert!(matches!(
            Sweep::new(&scaled, &distances, 0..=2),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let empty = 3..=2;
        assert!(matches!(
            Sweep::new(&scaled, &distances, empty),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
