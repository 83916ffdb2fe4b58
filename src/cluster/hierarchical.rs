use super::ClusterAssignment;
use crate::config::Linkage;
use crate::distance::{condensed_index, DissimilarityMatrix};
use crate::error::{Error, Result};
use serde::Serialize;

const NO_NEIGHBOR: usize = usize::MAX;

/// One agglomeration step.
///
/// Node ids follow the usual dendrogram numbering: leaves are `0..n`, the cluster
/// created by merge `s` is node `n + s`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Merge {
    /// Node holding the smaller original record index.
    pub left: usize,
    pub right: usize,
    /// Inter-cluster distance at which the two nodes were joined.
    pub height: f64,
    /// Number of records under the new node.
    pub size: usize,
}

/// Binary merge tree over `n` records; heights never decrease from first to last merge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeTree {
    n_leaves: usize,
    linkage: Linkage,
    merges: Vec<Merge>,
}

impl MergeTree {
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Merges in the order they happened; always `n_leaves - 1` of them.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn heights(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.height).collect()
    }

    /// Flat partition with exactly `k` clusters.
    ///
    /// Replays the first `n - k` merges. Clusters are numbered `1..=k` in order of
    /// their smallest record index.
    pub fn cut(&self, k: usize) -> Result<ClusterAssignment> {
        let n = self.n_leaves;
        if k == 0 || k > n {
            return Err(Error::InvalidCut {
                requested: k,
                n_leaves: n,
            });
        }

        // Smallest leaf under each node; leaves represent themselves.
        let mut representative: Vec<usize> = (0..n).collect();
        representative.reserve(self.merges.len());
        let mut parent: Vec<usize> = (0..n).collect();

        for merge in &self.merges[..n - k] {
            let a = find(&mut parent, representative[merge.left]);
            let b = find(&mut parent, representative[merge.right]);
            let (root, child) = if a < b { (a, b) } else { (b, a) };
            parent[child] = root;
            representative.push(root);
        }

        let mut ids = vec![0usize; n];
        let mut labels = Vec::with_capacity(n);
        let mut next = 0;
        for leaf in 0..n {
            let root = find(&mut parent, leaf);
            if ids[root] == 0 {
                next += 1;
                ids[root] = next;
            }
            labels.push(ids[root]);
        }

        ClusterAssignment::new(labels, k)
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Agglomerative clustering over a precomputed dissimilarity matrix.
///
/// Each step merges the closest pair of clusters under the linkage rule. Clusters are
/// keyed by their smallest record index, and a tie in distance goes to the pair with
/// the lowest `(smaller key, larger key)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Agglomerative {
    linkage: Linkage,
}

impl Agglomerative {
    pub fn new(linkage: Linkage) -> Self {
        Self { linkage }
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub fn build(&self, distances: &DissimilarityMatrix) -> Result<MergeTree> {
        let n = distances.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }

        let mut state = State::new(distances);
        let mut merges = Vec::with_capacity(n - 1);
        let mut last_height = f64::NEG_INFINITY;

        for step in 0..n - 1 {
            let (i, j) = state.closest_pair().ok_or(Error::EmptyInput)?;
            // Lance-Williams updates can round a hair below the previous height.
            let height = state.nn_dist[i].max(last_height);
            last_height = height;

            merges.push(Merge {
                left: state.node[i],
                right: state.node[j],
                height,
                size: state.size[i] + state.size[j],
            });
            state.merge(i, j, self.linkage);
            state.node[i] = n + step;
        }

        tracing::debug!(n, linkage = ?self.linkage, merges = merges.len(), "built merge tree");

        Ok(MergeTree {
            n_leaves: n,
            linkage: self.linkage,
            merges,
        })
    }
}

/// Working set for the agglomeration. Slot `i` holds the cluster whose smallest record is `i`.
struct State {
    n: usize,
    d: Vec<f64>,
    active: Vec<bool>,
    size: Vec<usize>,
    node: Vec<usize>,
    /// Nearest active slot above `i`, lowest index on ties.
    nn: Vec<usize>,
    nn_dist: Vec<f64>,
}

impl State {
    fn new(distances: &DissimilarityMatrix) -> Self {
        let n = distances.len();
        let mut state = Self {
            n,
            d: distances.condensed().to_vec(),
            active: vec![true; n],
            size: vec![1; n],
            node: (0..n).collect(),
            nn: vec![NO_NEIGHBOR; n],
            nn_dist: vec![f64::INFINITY; n],
        };
        for i in 0..n {
            state.refresh_neighbor(i);
        }
        state
    }

    fn dist(&self, i: usize, j: usize) -> f64 {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.d[condensed_index(self.n, a, b)]
    }

    fn set_dist(&mut self, i: usize, j: usize, value: f64) {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        let idx = condensed_index(self.n, a, b);
        self.d[idx] = value;
    }

    fn refresh_neighbor(&mut self, i: usize) {
        let mut best = NO_NEIGHBOR;
        let mut best_dist = f64::INFINITY;
        for j in (i + 1)..self.n {
            if !self.active[j] {
                continue;
            }
            let d = self.dist(i, j);
            if best == NO_NEIGHBOR || d < best_dist {
                best = j;
                best_dist = d;
            }
        }
        self.nn[i] = best;
        self.nn_dist[i] = best_dist;
    }

    fn closest_pair(&self) -> Option<(usize, usize)> {
        let mut best: Option<usize> = None;
        for i in 0..self.n {
            if !self.active[i] || self.nn[i] == NO_NEIGHBOR {
                continue;
            }
            if best.is_none_or(|b| self.nn_dist[i] < self.nn_dist[b]) {
                best = Some(i);
            }
        }
        best.map(|i| (i, self.nn[i]))
    }

    /// Folds slot `j` into slot `i` (`i < j`).
    fn merge(&mut self, i: usize, j: usize, linkage: Linkage) {
        let (size_i, size_j) = (self.size[i] as f64, self.size[j] as f64);
        self.active[j] = false;

        for k in 0..self.n {
            if !self.active[k] || k == i {
                continue;
            }
            let (dik, djk) = (self.dist(i, k), self.dist(j, k));
            let updated = match linkage {
                Linkage::Single => dik.min(djk),
                Linkage::Complete => dik.max(djk),
                Linkage::Average => (size_i * dik + size_j * djk) / (size_i + size_j),
            };
            self.set_dist(i, k, updated);
        }
        self.size[i] += self.size[j];
        self.nn[j] = NO_NEIGHBOR;
        self.nn_dist[j] = f64::INFINITY;

        for k in 0..i {
            if !self.active[k] {
                continue;
            }
            if self.nn[k] == i || self.nn[k] == j {
                self.refresh_neighbor(k);
            } else {
                let dki = self.dist(k, i);
                if dki < self.nn_dist[k] || (dki == self.nn_dist[k] && i < self.nn[k]) {
                    self.nn[k] = i;
                    self.nn_dist[k] = dki;
                }
            }
        }
        for k in (i + 1)..j {
            if self.active[k] && self.nn[k] == j {
                self.refresh_neighbor(k);
            }
        }
        self.refresh_neighbor(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Metric;
    use ndarray::array;

    fn line() -> DissimilarityMatrix {
        // 0 -- 1 ---- 2 -------- 3
        let x = array![[0.0], [1.0], [3.0], [7.0]];
        DissimilarityMatrix::build(&x, Metric::Euclidean)
    }

    #[test]
    fn test_single_linkage_heights() {
        let tree = Agglomerative::new(Linkage::Single).build(&line()).unwrap();
        assert_eq!(tree.heights(), vec![1.0, 2.0, 4.0]);
        assert_eq!(tree.merges()[0], Merge { left: 0, right: 1, height: 1.0, size: 2 });
        assert_eq!(tree.merges()[1].left, 4);
        assert_eq!(tree.merges()[1].right, 2);
        assert_eq!(tree.merges()[2].size, 4);
    }

    #[test]
    fn test_complete_and_average_heights() {
        let complete = Agglomerative::new(Linkage::Complete).build(&line()).unwrap();
        assert_eq!(complete.heights(), vec![1.0, 3.0, 7.0]);

        let average = Agglomerative::new(Linkage::Average).build(&line()).unwrap();
        let heights = average.heights();
        assert_eq!(heights[0], 1.0);
        assert!((heights[1] - 2.5).abs() < 1e-12);
        // mean of 7, 6, 4
        assert!((heights[2] - 17.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_merge_lowest_pair() {
        // Evenly spaced: every neighboring pair ties at 1.
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        let tree = Agglomerative::new(Linkage::Single).build(&d).unwrap();
        assert_eq!((tree.merges()[0].left, tree.merges()[0].right), (0, 1));
        assert_eq!((tree.merges()[1].left, tree.merges()[1].right), (4, 2));
        assert_eq!((tree.merges()[2].left, tree.merges()[2].right), (5, 3));
    }

    #[test]
    fn test_cut() {
        let tree = Agglomerative::new(Linkage::Single).build(&line()).unwrap();
        assert_eq!(tree.cut(1).unwrap().labels(), &[1, 1, 1, 1]);
        assert_eq!(tree.cut(2).unwrap().labels(), &[1, 1, 1, 2]);
        assert_eq!(tree.cut(3).unwrap().labels(), &[1, 1, 2, 3]);
        assert_eq!(tree.cut(4).unwrap().labels(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_invalid_cut() {
        let tree = Agglomerative::new(Linkage::Average).build(&line()).unwrap();
        assert!(matches!(tree.cut(0), Err(Error::InvalidCut { requested: 0, n_leaves: 4 })));
        assert!(matches!(tree.cut(5), Err(Error::InvalidCut { requested: 5, .. })));
    }

    #[test]
    fn test_single_leaf() {
        let x = array![[1.0, 1.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        let tree = Agglomerative::new(Linkage::Complete).build(&d).unwrap();
        assert!(tree.merges().is_empty());
        assert_eq!(tree.cut(1).unwrap().labels(), &[1]);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [5.0, 5.0]];
        let d = DissimilarityMatrix::build(&x, Metric::Euclidean);
        let builder = Agglomerative::new(Linkage::Average);
        assert_eq!(builder.build(&d).unwrap(), builder.build(&d).unwrap());
    }
}
