//! Clustering analysis for tabular wine-quality data.
//!
//! The pipeline standardizes the numeric features, builds one pairwise dissimilarity
//! matrix over the raw features, and evaluates two clusterings against it:
//! - [`KMeans`]: Lloyd iterations on the standardized features, scored by silhouette
//! - [`Agglomerative`]: a merge tree over the raw-feature distances, cut into flat partitions
//!
//! ```rust
//! use vinoclust::{Agglomerative, DissimilarityMatrix, KMeans, Linkage, Metric, StandardScaler};
//! use ndarray::array;
//!
//! let x = array![
//!     [0.0, 0.0],
//!     [0.1, 0.0],
//!     [0.0, 0.1],
//!     [10.0, 10.0],
//!     [10.1, 10.0],
//!     [10.0, 10.1]
//! ];
//!
//! let scaled = StandardScaler::new().fit_transform(&x).unwrap();
//! let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);
//!
//! let labels = KMeans::new(2).seed(7).run(scaled.as_matrix()).unwrap();
//! let score = vinoclust::metrics::silhouette_score(&labels, &distances).unwrap();
//! assert!(score > 0.9);
//!
//! let tree = Agglomerative::new(Linkage::Average).build(&distances).unwrap();
//! let flat = tree.cut(2).unwrap();
//! assert_eq!(flat.labels()[0], flat.labels()[1]);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod summary;
pub mod sweep;

pub use cluster::{Agglomerative, ClusterAssignment, KMeans, KMeansFit, Merge, MergeTree};
pub use config::{AnalysisConfig, Linkage, Metric};
pub use dataset::{Dataset, Origin, Record, WINE_FEATURES};
pub use distance::DissimilarityMatrix;
pub use error::{Error, Result};
pub use pipeline::Analysis;
pub use preprocessing::{StandardScaler, StandardizedFeatureMatrix};
pub use summary::{ClusterProfile, ClusterSummary, QualityCrosstab};
pub use sweep::{Sweep, SweepPoint};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_types_work() {
        let vec = Vector::zeros(5);
        let mat = Matrix::zeros((3, 4));
        assert_eq!(vec.len(), 5);
        assert_eq!(mat.shape(), &[3, 4]);
    }
}
