//! Clustering algorithms for unsupervised learning.
//!
//! This module provides:
//! - `KMeans`: partitional clustering using centroids (Lloyd's method)
//! - `Agglomerative`: hierarchical clustering producing a `MergeTree`
//!
//! Both produce a `ClusterAssignment` whose ids run from 1 to k.
//!
//! # Examples
//!
//! ## K-Means Clustering
//! ```rust
//! use vinoclust::KMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let fit = KMeans::new(2).max_iter(100).seed(42).fit(&x).unwrap();
//! println!("Cluster centers: {:?}", fit.centroids);
//! println!("Inertia: {:.4}", fit.inertia);
//! assert_eq!(fit.assignment.len(), 6);
//! ```
//!
//! ## Agglomerative Clustering
//! ```rust
//! use vinoclust::{Agglomerative, DissimilarityMatrix, Linkage, Metric};
//! use ndarray::array;
//!
//! let x = array![[1.0, 1.0], [1.2, 1.1], [8.0, 8.0], [8.1, 8.1]];
//! let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);
//!
//! let tree = Agglomerative::new(Linkage::Complete).build(&distances).unwrap();
//! assert_eq!(tree.merges().len(), 3);
//! assert_eq!(tree.cut(2).unwrap().labels(), &[1, 1, 2, 2]);
//! ```

mod assignment;
mod hierarchical;
mod kmeans;

pub use assignment::ClusterAssignment;
pub use hierarchical::{Agglomerative, Merge, MergeTree};
pub use kmeans::{KMeans, KMeansFit};
