//! Runs the full clustering analysis on the red and white wine-quality files.
//!
//! ```text
//! cargo run --example wine_pipeline -- \
//!     --red winequality-red.csv --white winequality-white.csv --clusters 3
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vinoclust::dataset::CsvOptions;
use vinoclust::{
    Analysis, AnalysisConfig, ClusterAssignment, ClusterSummary, Dataset, Linkage, QualityCrosstab, SweepPoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LinkageArg {
    Single,
    Complete,
    Average,
}

impl From<LinkageArg> for Linkage {
    fn from(arg: LinkageArg) -> Self {
        match arg {
            LinkageArg::Single => Linkage::Single,
            LinkageArg::Complete => Linkage::Complete,
            LinkageArg::Average => Linkage::Average,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "wine_pipeline", about = "K-means and hierarchical clustering of wine-quality data")]
struct Args {
    /// Semicolon-delimited red wine source.
    #[arg(long)]
    red: Option<PathBuf>,

    /// Semicolon-delimited white wine source.
    #[arg(long)]
    white: Option<PathBuf>,

    /// JSON configuration; command-line values override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    k_min: Option<usize>,

    #[arg(long)]
    k_max: Option<usize>,

    #[arg(long, value_enum)]
    linkage: Option<LinkageArg>,

    /// Cluster count used for the final assignments and summaries.
    #[arg(long, default_value_t = 2)]
    clusters: usize,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a AnalysisConfig,
    sweep: Vec<SweepPoint>,
    kmeans: AlgorithmReport,
    hierarchical: AlgorithmReport,
}

#[derive(Serialize)]
struct AlgorithmReport {
    score: f64,
    assignment: ClusterAssignment,
    summary: ClusterSummary,
    crosstab: QualityCrosstab,
}

fn evaluate(analysis: &Analysis<'_>, assignment: ClusterAssignment) -> vinoclust::Result<AlgorithmReport> {
    Ok(AlgorithmReport {
        score: analysis.score(&assignment)?,
        summary: analysis.summary(&assignment)?,
        crosstab: analysis.crosstab(&assignment)?,
        assignment,
    })
}

fn print_algorithm(name: &str, report: &AlgorithmReport) {
    println!("\n=== {name} (silhouette {:.4}) ===", report.score);
    print!("{:>8} {:>6} {:>8}", "cluster", "size", "quality");
    for feature in &report.summary.feature_names {
        print!(" {:>12.12}", feature);
    }
    println!();
    for profile in &report.summary.profiles {
        print!("{:>8} {:>6} {:>8.3}", profile.cluster, profile.size, profile.quality_mean);
        for mean in &profile.feature_means {
            print!(" {:>12.4}", mean);
        }
        println!();
    }

    println!("\nquality x cluster");
    for (quality, counts) in report.crosstab.qualities.iter().zip(&report.crosstab.counts) {
        let row: Vec<String> = counts.iter().map(|c| format!("{c:>6}")).collect();
        println!("{quality:>8} {}", row.join(" "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(k_min) = args.k_min {
        config.k_min = k_min;
    }
    if let Some(k_max) = args.k_max {
        config.k_max = k_max;
    }
    if let Some(linkage) = args.linkage {
        config.linkage = linkage.into();
    }
    if args.red.is_some() {
        config.red_path = args.red.clone();
    }
    if args.white.is_some() {
        config.white_path = args.white.clone();
    }

    let (Some(red), Some(white)) = (config.red_path.clone(), config.white_path.clone()) else {
        return Err("both --red and --white (or red_path/white_path in --config) are required".into());
    };

    let dataset = Dataset::load_wine_pair(&red, &white, &CsvOptions::default())?;
    let analysis = Analysis::new(&dataset, config)?;

    let sweep = analysis.sweep()?.collect::<vinoclust::Result<Vec<_>>>()?;
    let kmeans = evaluate(&analysis, analysis.kmeans(args.clusters)?.assignment)?;
    let hierarchical = evaluate(&analysis, analysis.hierarchical(args.clusters)?)?;

    let report = Report {
        config: analysis.config(),
        sweep,
        kmeans,
        hierarchical,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Dataset: {} records ({} features)",
        dataset.n_samples(),
        dataset.n_features()
    );
    println!("\n=== Silhouette by k (k-means, standardized features) ===");
    for point in &report.sweep {
        println!("k={:<3} {:.4}", point.k, point.score);
    }
    print_algorithm("K-Means", &report.kmeans);
    print_algorithm("Hierarchical", &report.hierarchical);

    Ok(())
}
