use crate::cluster::{Agglomerative, ClusterAssignment, KMeans, KMeansFit, MergeTree};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::distance::DissimilarityMatrix;
use crate::error::Result;
use crate::metrics::silhouette_score;
use crate::preprocessing::{standardize, StandardScaler, StandardizedFeatureMatrix};
use crate::summary::{ClusterSummary, QualityCrosstab};
use crate::sweep::Sweep;
use crate::Matrix;
use std::sync::OnceLock;

/// Driver tying the stages together for one dataset.
///
/// K-means runs on the standardized features. Silhouette scores and the merge tree
/// use the raw-feature dissimilarity matrix, which is built on first use and then
/// shared. Nothing here mutates the dataset.
#[derive(Debug)]
pub struct Analysis<'a> {
    dataset: &'a Dataset,
    config: AnalysisConfig,
    scaler: StandardScaler,
    standardized: StandardizedFeatureMatrix,
    distances: OnceLock<DissimilarityMatrix>,
    tree: OnceLock<MergeTree>,
}

impl<'a> Analysis<'a> {
    pub fn new(dataset: &'a Dataset, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let (scaler, standardized) = standardize(dataset)?;
        tracing::debug!(
            records = dataset.n_samples(),
            features = dataset.n_features(),
            "standardized dataset"
        );

        Ok(Self {
            dataset,
            config,
            scaler,
            standardized,
            distances: OnceLock::new(),
            tree: OnceLock::new(),
        })
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn standardized(&self) -> &StandardizedFeatureMatrix {
        &self.standardized
    }

    pub fn distances(&self) -> &DissimilarityMatrix {
        self.distances
            .get_or_init(|| DissimilarityMatrix::build(self.dataset.features(), self.config.metric))
    }

    /// Silhouette of k-means at every `k` in the configured range.
    pub fn sweep(&self) -> Result<Sweep<'_>> {
        Ok(Sweep::new(&self.standardized, self.distances(), self.config.k_range())?
            .seed(self.config.seed)
            .max_iter(self.config.max_iter))
    }

    pub fn kmeans(&self, k: usize) -> Result<KMeansFit> {
        KMeans::new(k)
            .seed(self.config.seed)
            .max_iter(self.config.max_iter)
            .fit(self.standardized.as_matrix())
    }

    /// K-means centroids in raw feature units.
    pub fn raw_centroids(&self, fit: &KMeansFit) -> Result<Matrix> {
        self.scaler.inverse_transform(&fit.centroids)
    }

    pub fn merge_tree(&self) -> Result<&MergeTree> {
        if let Some(tree) = self.tree.get() {
            return Ok(tree);
        }
        let tree = Agglomerative::new(self.config.linkage).build(self.distances())?;
        Ok(self.tree.get_or_init(|| tree))
    }

    pub fn hierarchical(&self, k: usize) -> Result<ClusterAssignment> {
        self.merge_tree()?.cut(k)
    }

    pub fn score(&self, assignment: &ClusterAssignment) -> Result<f64> {
        silhouette_score(assignment, self.distances())
    }

    pub fn summary(&self, assignment: &ClusterAssignment) -> Result<ClusterSummary> {
        ClusterSummary::new(self.dataset, assignment)
    }

    pub fn crosstab(&self, assignment: &ClusterAssignment) -> Result<QualityCrosstab> {
        QualityCrosstab::new(self.dataset, assignment)
    }
}
