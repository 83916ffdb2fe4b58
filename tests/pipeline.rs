use ndarray::array;
use vinoclust::dataset::CsvOptions;
use vinoclust::metrics::silhouette_score;
use vinoclust::{
    Agglomerative, Analysis, AnalysisConfig, Dataset, DissimilarityMatrix, Error, KMeans, Linkage, Matrix, Metric,
    Origin, Record, StandardScaler, SweepPoint,
};

fn two_groups() -> Matrix {
    array![
        [0.0, 0.0],
        [0.2, 0.1],
        [0.1, 0.3],
        [10.0, 10.0],
        [10.2, 9.9],
        [9.9, 10.1]
    ]
}

fn two_group_dataset() -> Dataset {
    let x = two_groups();
    let records = x
        .outer_iter()
        .enumerate()
        .map(|(i, row)| Record {
            id: i.to_string(),
            features: row.to_vec(),
            origin: if i % 2 == 0 { Origin::Red } else { Origin::White },
            quality: 5 + (i as u8 % 3),
        })
        .collect();
    Dataset::new(vec!["a".to_string(), "b".to_string()], records).unwrap()
}

#[test]
fn kmeans_recovers_two_groups() {
    let x = two_groups();
    let scaled = StandardScaler::new().fit_transform(&x).unwrap();
    let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);

    let assignment = KMeans::new(2).seed(42).run(scaled.as_matrix()).unwrap();
    let labels = assignment.labels();
    assert!(labels[..3].iter().all(|&l| l == labels[0]));
    assert!(labels[3..].iter().all(|&l| l == labels[3]));
    assert_ne!(labels[0], labels[3]);

    let score = silhouette_score(&assignment, &distances).unwrap();
    assert!(score > 0.9, "silhouette {score}");
}

#[test]
fn sweep_prefers_two_clusters() {
    let x = two_groups();
    let scaled = StandardScaler::new().fit_transform(&x).unwrap();
    let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);

    let points: Vec<SweepPoint> = vinoclust::Sweep::new(&scaled, &distances, 2..=5)
        .unwrap()
        .collect::<vinoclust::Result<_>>()
        .unwrap();

    assert_eq!(points.len(), 4);
    assert_eq!(points.iter().map(|p| p.k).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    let best = points
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .unwrap();
    assert_eq!(best.k, 2);
}

#[test]
fn hierarchical_matches_kmeans() {
    let x = two_groups();
    let scaled = StandardScaler::new().fit_transform(&x).unwrap();
    let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);
    let kmeans = KMeans::new(2).seed(42).run(scaled.as_matrix()).unwrap();

    for linkage in [Linkage::Single, Linkage::Complete, Linkage::Average] {
        let tree = Agglomerative::new(linkage).build(&distances).unwrap();
        let flat = tree.cut(2).unwrap();
        assert_eq!(flat.labels(), &[1, 1, 1, 2, 2, 2]);
        assert!(flat.same_partition(&kmeans));
    }
}

#[test]
fn build_is_repeatable() {
    let distances = DissimilarityMatrix::build(&two_groups(), Metric::Euclidean);
    let builder = Agglomerative::new(Linkage::Complete);
    let first = builder.build(&distances).unwrap();
    let second = builder.build(&distances).unwrap();
    assert_eq!(first.heights(), second.heights());
    assert_eq!(first.merges(), second.merges());
}

#[test]
fn analysis_end_to_end() {
    let data = two_group_dataset();
    let config = AnalysisConfig::default()
        .seed(9)
        .with_k_range(2..=5)
        .linkage(Linkage::Average);
    let analysis = Analysis::new(&data, config).unwrap();

    let points = analysis
        .sweep()
        .unwrap()
        .collect::<vinoclust::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(points.len(), 4);

    let fit = analysis.kmeans(2).unwrap();
    let tree = analysis.hierarchical(2).unwrap();
    assert!(fit.assignment.same_partition(&tree));

    let table = analysis.crosstab(&tree).unwrap();
    assert_eq!(table.counts.iter().flatten().sum::<usize>(), 6);

    let summary = analysis.summary(&fit.assignment).unwrap();
    let sizes: Vec<usize> = summary.profiles.iter().map(|p| p.size).collect();
    assert_eq!(sizes, vec![3, 3]);
}

#[test]
fn out_of_range_requests_fail() {
    let data = two_group_dataset();
    let analysis = Analysis::new(&data, AnalysisConfig::default()).unwrap();

    assert!(matches!(
        analysis.kmeans(7),
        Err(Error::InvalidClusterCount { requested: 7, n_items: 6 })
    ));
    assert!(matches!(
        analysis.hierarchical(0),
        Err(Error::InvalidCut { requested: 0, n_leaves: 6 })
    ));
    // Default range 2..=20 does not fit six records.
    assert!(matches!(analysis.sweep(), Err(Error::InvalidClusterCount { requested: 20, .. })));
}

#[test]
fn csv_sources_flow_through() {
    let red = "\"alcohol\";\"pH\";\"quality\"\n9.4;3.51;5\n9.8;3.20;5\n9.6;3.26;6\n";
    let white = "\"alcohol\";\"pH\";\"quality\"\n12.8;3.00;7\n12.6;3.18;8\n12.9;3.10;7\n";
    let options = CsvOptions::default();

    let data = Dataset::from_csv_reader(red.as_bytes(), Origin::Red, &options)
        .unwrap()
        .concat(Dataset::from_csv_reader(white.as_bytes(), Origin::White, &options).unwrap())
        .unwrap();
    assert_eq!(data.n_samples(), 6);

    let config = AnalysisConfig::default().with_k_range(2..=3);
    let analysis = Analysis::new(&data, config).unwrap();
    let tree = analysis.hierarchical(2).unwrap();

    let table = analysis.crosstab(&tree).unwrap();
    assert_eq!(table.qualities, vec![5, 6, 7, 8]);

    let summary = analysis.summary(&tree).unwrap();
    let red_cluster = tree.labels()[0];
    let profile = summary.profile(red_cluster).unwrap();
    assert_eq!(profile.origin_counts.get(&Origin::Red), Some(&3));
    assert!((summary.feature_mean(red_cluster, "alcohol").unwrap() - 9.6).abs() < 1e-9);
}

#[test]
fn constant_feature_is_reported() {
    let records = (0..4)
        .map(|i| Record {
            id: i.to_string(),
            features: vec![i as f64, 0.5],
            origin: Origin::White,
            quality: 6,
        })
        .collect();
    let data = Dataset::new(vec!["sugar".to_string(), "chlorides".to_string()], records).unwrap();

    match Analysis::new(&data, AnalysisConfig::default()) {
        Err(Error::DegenerateFeature { column, name }) => {
            assert_eq!(column, 1);
            assert_eq!(name, "chlorides");
        }
        other => panic!("expected degenerate feature, got {other:?}"),
    }
}
