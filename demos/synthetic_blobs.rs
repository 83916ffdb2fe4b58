use ndarray::{concatenate, Array2, Axis};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use vinoclust::metrics::silhouette_score;
use vinoclust::{Agglomerative, DissimilarityMatrix, KMeans, Linkage, Metric, StandardScaler, Sweep};

fn blob(center: [f64; 2], n: usize, rng: &mut StdRng) -> Array2<f64> {
    let mut points = Array2::random_using((n, 2), Normal::new(0.0, 0.4).unwrap(), rng);
    for mut row in points.axis_iter_mut(Axis(0)) {
        row[0] += center[0];
        row[1] += center[1];
    }
    points
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Clustering Three Synthetic Blobs ===\n");

    let mut rng = StdRng::seed_from_u64(7);
    let x = concatenate(
        Axis(0),
        &[
            blob([2.0, 2.0], 20, &mut rng).view(),
            blob([8.0, 8.0], 20, &mut rng).view(),
            blob([2.0, 8.0], 20, &mut rng).view(),
        ],
    )?;
    println!("Dataset: {} samples, {} features", x.nrows(), x.ncols());

    let scaled = StandardScaler::new().fit_transform(&x)?;
    let distances = DissimilarityMatrix::build(&x, Metric::Euclidean);

    println!("\n=== K-Means silhouette sweep ===");
    for point in Sweep::new(&scaled, &distances, 2..=6)?.seed(7) {
        let point = point?;
        println!("k={}: {:.4}", point.k, point.score);
    }

    let fit = KMeans::new(3).seed(7).fit(scaled.as_matrix())?;
    println!("\nK-Means (k=3):");
    println!("  Converged: {} after {} iterations", fit.converged, fit.n_iter);
    println!("  Inertia: {:.4}", fit.inertia);
    println!("  Cluster sizes: {:?}", fit.assignment.cluster_sizes());

    println!("\n=== Agglomerative clustering (k=3) ===");
    for linkage in [Linkage::Single, Linkage::Complete, Linkage::Average] {
        let tree = Agglomerative::new(linkage).build(&distances)?;
        let flat = tree.cut(3)?;
        println!(
            "{:?}: sizes {:?}, silhouette {:.4}, agrees with k-means: {}",
            linkage,
            flat.cluster_sizes(),
            silhouette_score(&flat, &distances)?,
            flat.same_partition(&fit.assignment)
        );
    }

    Ok(())
}
