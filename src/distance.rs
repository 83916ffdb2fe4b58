use crate::config::Metric;
use crate::Matrix;
use rayon::prelude::*;
use serde::Serialize;

/// Symmetric pairwise distances with a zero diagonal.
///
/// Only the strict upper triangle is stored, row-major: the pair `(i, j)` with
/// `i < j` lives at `n*i - i*(i+1)/2 + (j - i - 1)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DissimilarityMatrix {
    n: usize,
    metric: Metric,
    condensed: Vec<f64>,
}

impl DissimilarityMatrix {
    /// Computes every pairwise distance between the rows of `x`.
    pub fn build(x: &Matrix, metric: Metric) -> Self {
        let n = x.nrows();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let a = x.row(i);
                ((i + 1)..n).map(|j| metric.distance(&a, &x.row(j))).collect()
            })
            .collect();

        let condensed: Vec<f64> = rows.into_iter().flatten().collect();
        tracing::debug!(n, pairs = condensed.len(), ?metric, "built dissimilarity matrix");

        Self { n, metric, condensed }
    }

    /// Wraps precomputed condensed distances; `None` if the length does not fit any `n`.
    pub fn from_condensed(condensed: Vec<f64>, metric: Metric) -> Option<Self> {
        let m = condensed.len();
        // n*(n-1)/2 == m
        let n = ((1.0 + (1.0 + 8.0 * m as f64).sqrt()) / 2.0).round() as usize;
        if n * n.saturating_sub(1) / 2 != m {
            return None;
        }
        Some(Self { n, metric, condensed })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn condensed(&self) -> &[f64] {
        &self.condensed
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => self.condensed[condensed_index(self.n, i, j)],
            std::cmp::Ordering::Greater => self.condensed[condensed_index(self.n, j, i)],
        }
    }

    /// Expands to a dense `n x n` matrix.
    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_shape_fn((self.n, self.n), |(i, j)| self.get(i, j))
    }
}

pub(crate) fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    debug_assert!(i < j && j < n);
    n * i - i * (i + 1) / 2 + (j - i - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_symmetric_zero_diagonal() {
        let x = array![[0.0, 0.0], [3.0, 4.0], [6.0, 8.0], [1.0, 1.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        assert_eq!(d.len(), 4);
        assert_eq!(d.condensed().len(), 6);
        for i in 0..4 {
            assert_eq!(d.get(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(d.get(i, j), d.get(j, i));
            }
        }
        assert!((d.get(0, 1) - 5.0).abs() < 1e-12);
        assert!((d.get(2, 0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_manhattan() {
        let x = array![[0.0, 0.0], [3.0, 4.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Manhattan);
        assert!((d.get(0, 1) - 7.0).abs() < 1e-12);
        assert_eq!(d.metric(), Metric::Manhattan);
    }

    #[test]
    fn test_dense_matches_condensed() {
        let x = array![[1.0], [4.0], [9.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        let dense = d.to_matrix();
        assert_eq!(dense, array![[0.0, 3.0, 8.0], [3.0, 0.0, 5.0], [8.0, 5.0, 0.0]]);
    }

    #[test]
    fn test_from_condensed() {
        let d = DissimilarityMatrix::from_condensed(vec![1.0, 2.0, 3.0], Metric::Euclidean).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.get(1, 2), 3.0);
        assert!(DissimilarityMatrix::from_condensed(vec![1.0, 2.0], Metric::Euclidean).is_none());
    }

    #[test]
    fn test_single_point() {
        let x = array![[1.0, 2.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        assert_eq!(d.len(), 1);
        assert!(d.condensed().is_empty());
    }
}
