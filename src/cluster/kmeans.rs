use super::ClusterAssignment;
use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rayon::prelude::*;

/// Outcome of one k-means run.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub assignment: ClusterAssignment,
    /// One row per cluster; row `c - 1` is the centroid of cluster `c`.
    pub centroids: Matrix,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
    pub n_iter: usize,
    /// False when the iteration cap was hit before assignments settled.
    ///
    /// Also true when an empty-cluster repair restores the previous step's labels.
    /// In that case the centroids are the means of `assignment`, but some records may
    /// sit nearer another centroid than their own.
    pub converged: bool,
    /// Number of times an empty cluster was reseeded.
    pub repairs: usize,
}

impl KMeansFit {
    /// Nearest centroid for each row of `x`, as 1-based cluster ids.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        if x.ncols() != self.centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.ncols(),
                found: x.ncols(),
            });
        }
        Ok(assign(x, &self.centroids).into_iter().map(|l| l + 1).collect())
    }

    /// Euclidean distance from each row of `x` to each centroid.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        if x.ncols() != self.centroids.ncols() {
            return Err(Error::DimensionMismatch {
                expected: self.centroids.ncols(),
                found: x.ncols(),
            });
        }
        let k = self.centroids.nrows();
        Ok(Matrix::from_shape_fn((x.nrows(), k), |(i, c)| {
            squared_distance(&x.row(i), &self.centroids.row(c)).sqrt()
        }))
    }
}

/// Lloyd's k-means with seeded random initialization.
///
/// Initial centroids are `k` distinct rows drawn with `StdRng::seed_from_u64(seed)`,
/// so the same matrix, seed and `k` always give the same assignment. A row equidistant
/// to several centroids goes to the lowest-indexed one. A cluster left empty is
/// reseeded with the row furthest from every live centroid.
#[derive(Clone, Debug)]
pub struct KMeans {
    n_clusters: usize,
    max_iter: usize,
    seed: u64,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            seed: 42,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster assignment only; see [`KMeans::fit`] for centroids and diagnostics.
    pub fn run(&self, x: &Matrix) -> Result<ClusterAssignment> {
        self.fit(x).map(|fit| fit.assignment)
    }

    pub fn fit(&self, x: &Matrix) -> Result<KMeansFit> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        if self.n_clusters == 0 || self.n_clusters > x.nrows() {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items: x.nrows(),
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1".to_string(),
            });
        }

        let k = self.n_clusters;
        let mut centroids = self.initialize_centroids(x);
        let mut labels = assign(x, &centroids);
        let mut repairs = 0;
        let mut converged = false;
        let mut n_iter = 0;
        let mut previous: Option<Vec<usize>> = None;

        for iteration in 0..self.max_iter {
            n_iter = iteration + 1;
            repairs += repair_empty_clusters(x, &mut centroids, &mut labels, k);
            // Repair undid the last assignment step: centroids already match `labels`.
            if previous.as_ref() == Some(&labels) {
                converged = true;
                break;
            }
            update_centroids(x, &labels, &mut centroids);

            let next = assign(x, &centroids);
            let changed = next.iter().zip(&labels).filter(|(a, b)| a != b).count();
            tracing::debug!(k, iteration, changed, "lloyd iteration");
            if changed == 0 {
                converged = true;
                break;
            }
            previous = Some(std::mem::replace(&mut labels, next));
        }

        if !converged {
            tracing::warn!(k, max_iter = self.max_iter, "k-means hit the iteration cap before converging");
            let fixed = repair_empty_clusters(x, &mut centroids, &mut labels, k);
            if fixed > 0 {
                repairs += fixed;
                update_centroids(x, &labels, &mut centroids);
            }
        }

        let inertia: f64 = labels
            .iter()
            .enumerate()
            .map(|(i, &c)| squared_distance(&x.row(i), &centroids.row(c)))
            .sum();

        tracing::debug!(k, n_iter, converged, repairs, inertia, "k-means finished");

        Ok(KMeansFit {
            assignment: ClusterAssignment::from_zero_based(&labels, k),
            centroids,
            inertia,
            n_iter,
            converged,
            repairs,
        })
    }

    fn initialize_centroids(&self, x: &Matrix) -> Matrix {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let rows = index::sample(&mut rng, x.nrows(), self.n_clusters);

        let mut centroids = Matrix::zeros((self.n_clusters, x.ncols()));
        for (c, row) in rows.iter().enumerate() {
            centroids.row_mut(c).assign(&x.row(row));
        }
        centroids
    }
}

fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid for every row; ties go to the lower index.
fn assign(x: &Matrix, centroids: &Matrix) -> Vec<usize> {
    (0..x.nrows())
        .into_par_iter()
        .map(|i| {
            let row = x.row(i);
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, centroid) in centroids.outer_iter().enumerate() {
                let distance = squared_distance(&row, &centroid);
                if distance < best_distance {
                    best_distance = distance;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Moves each centroid to the mean of its rows. Centroids with no rows stay put.
fn update_centroids(x: &Matrix, labels: &[usize], centroids: &mut Matrix) {
    let k = centroids.nrows();
    let mut sums = Matrix::zeros((k, x.ncols()));
    let mut counts = vec![0usize; k];

    for (i, &c) in labels.iter().enumerate() {
        let mut sum = sums.row_mut(c);
        sum += &x.row(i);
        counts[c] += 1;
    }

    for (c, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mean: Vector = sums.row(c).mapv(|v| v / count as f64);
            centroids.row_mut(c).assign(&mean);
        }
    }
}

/// Reseeds every empty cluster with the row furthest from its nearest live centroid.
///
/// Only rows whose current cluster has at least two members are eligible, so a repair
/// never empties another cluster. With `k <= n` such a row always exists.
fn repair_empty_clusters(x: &Matrix, centroids: &mut Matrix, labels: &mut [usize], k: usize) -> usize {
    let mut sizes = vec![0usize; k];
    for &c in labels.iter() {
        sizes[c] += 1;
    }

    let mut repairs = 0;
    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }

        let mut furthest: Option<(usize, f64)> = None;
        for (i, &c) in labels.iter().enumerate() {
            if sizes[c] < 2 {
                continue;
            }
            let row = x.row(i);
            let nearest = (0..k)
                .filter(|&j| sizes[j] > 0)
                .map(|j| squared_distance(&row, &centroids.row(j)))
                .fold(f64::INFINITY, f64::min);
            if furthest.is_none_or(|(_, d)| nearest > d) {
                furthest = Some((i, nearest));
            }
        }

        let Some((row, distance)) = furthest else {
            break;
        };
        sizes[labels[row]] -= 1;
        labels[row] = empty;
        sizes[empty] = 1;
        centroids.row_mut(empty).assign(&x.row(row));
        repairs += 1;

        tracing::warn!(
            cluster = empty + 1,
            row,
            distance = distance.sqrt(),
            "empty cluster repaired"
        );
    }
    repairs
}
