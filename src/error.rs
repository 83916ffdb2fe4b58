use thiserror::Error;

/// Errors returned by the analysis pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Input has no rows or no feature columns.
    #[error("empty input")]
    EmptyInput,

    /// A feature column has zero standard deviation and cannot be standardized.
    #[error("feature column {column} ({name}) has zero standard deviation")]
    DegenerateFeature {
        /// Column index in the feature matrix.
        column: usize,
        /// Column name, or the index rendered as text when unnamed.
        name: String,
    },

    /// Requested cluster count lies outside `[1, n_items]`.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Requested dendrogram cut lies outside `[1, n_leaves]`.
    #[error("invalid cut: requested {requested} clusters from a tree with {n_leaves} leaves")]
    InvalidCut {
        /// Requested number of flat clusters.
        requested: usize,
        /// Number of leaves in the merge tree.
        n_leaves: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// Lengths or shapes disagree.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected size.
        expected: usize,
        /// Found size.
        found: usize,
    },

    /// Two sources disagree on their feature columns.
    #[error("schema mismatch: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        /// Feature names of the dataset being extended.
        expected: Vec<String>,
        /// Feature names of the incoming source.
        found: Vec<String>,
    },

    /// A required column is absent from the header row.
    #[error("missing column {0:?}")]
    MissingColumn(String),

    /// A field could not be parsed as a number.
    #[error("line {line}: cannot parse {value:?} in column {column:?}")]
    Parse {
        /// 1-based line number in the source, header included.
        line: u64,
        /// Column name.
        column: String,
        /// Raw field text.
        value: String,
    },

    /// A quality label lies outside `0..=10`.
    #[error("line {line}: quality {value} outside 0..=10")]
    QualityOutOfRange {
        /// 1-based line number in the source, header included.
        line: u64,
        /// Parsed quality value.
        value: i64,
    },

    /// Malformed CSV.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// I/O failure while reading a source or configuration file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed configuration document.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
