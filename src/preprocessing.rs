use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use ndarray::{ArrayView2, Axis};

/// Features rescaled column-wise to zero mean and unit sample variance.
///
/// Row order matches the matrix it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardizedFeatureMatrix(Matrix);

impl StandardizedFeatureMatrix {
    pub fn as_matrix(&self) -> &Matrix {
        &self.0
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    pub fn into_inner(self) -> Matrix {
        self.0
    }

    pub fn nrows(&self) -> usize {
        self.0.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.0.ncols()
    }
}

/// Per-column `(value - mean) / std` with the sample (N - 1) standard deviation.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn mean(&self) -> Option<&Vector> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Vector> {
        self.std.as_ref()
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(Error::EmptyInput);
        }

        // A single row has no sample variance; every column is degenerate.
        if data.nrows() < 2 {
            return Err(Error::DegenerateFeature {
                column: 0,
                name: "0".to_string(),
            });
        }

        let mean = data.mean_axis(Axis(0)).ok_or(Error::EmptyInput)?;
        let std = data.std_axis(Axis(0), 1.0);

        for (column, values) in data.axis_iter(Axis(1)).enumerate() {
            let first = values[0];
            let constant = values.iter().all(|&v| v == first);
            let s = std[column];
            if constant || !s.is_finite() || s == 0.0 {
                return Err(Error::DegenerateFeature {
                    column,
                    name: column.to_string(),
                });
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<StandardizedFeatureMatrix> {
        let (mean, std) = self.params()?;
        if data.ncols() != mean.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                found: data.ncols(),
            });
        }

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row -= mean;
            row /= std;
        }

        Ok(StandardizedFeatureMatrix(result))
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<StandardizedFeatureMatrix> {
        self.fit(data)?;
        self.transform(data)
    }

    /// Maps standardized rows (e.g. k-means centroids) back to raw feature units.
    pub fn inverse_transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = self.params()?;
        if data.ncols() != mean.len() {
            return Err(Error::DimensionMismatch {
                expected: mean.len(),
                found: data.ncols(),
            });
        }

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row *= std;
            row += mean;
        }
        Ok(result)
    }

    fn params(&self) -> Result<(&Vector, &Vector)> {
        match (self.mean.as_ref(), self.std.as_ref()) {
            (Some(mean), Some(std)) => Ok((mean, std)),
            _ => Err(Error::InvalidParameter {
                name: "scaler",
                message: "not fitted; call fit() first".to_string(),
            }),
        }
    }
}

/// Standardizes the feature columns of `dataset`, naming any degenerate column.
pub fn standardize(dataset: &Dataset) -> Result<(StandardScaler, StandardizedFeatureMatrix)> {
    let mut scaler = StandardScaler::new();
    let scaled = scaler.fit_transform(dataset.features()).map_err(|err| match err {
        Error::DegenerateFeature { column, .. } => Error::DegenerateFeature {
            column,
            name: dataset
                .feature_names()
                .get(column)
                .cloned()
                .unwrap_or_else(|| column.to_string()),
        },
        other => other,
    })?;
    Ok((scaler, scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let mut scaler = StandardScaler::new();

        let scaled = scaler.fit_transform(&data).unwrap();
        assert_eq!(scaled.as_matrix().shape(), data.shape());

        for column in scaled.as_matrix().axis_iter(Axis(1)) {
            let mean = column.mean().unwrap();
            let var = column.var(1.0);
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
        // sample std of [1, 3, 5] is 2
        assert!((scaled.as_matrix()[[0, 0]] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        let data = array![[1.0, 0.1], [2.0, 0.1], [3.0, 0.1]];
        let mut scaler = StandardScaler::new();
        assert!(matches!(
            scaler.fit(&data),
            Err(Error::DegenerateFeature { column: 1, .. })
        ));
    }

    #[test]
    fn test_single_row_is_degenerate() {
        let data = array![[1.0, 2.0]];
        assert!(matches!(
            StandardScaler::new().fit(&data),
            Err(Error::DegenerateFeature { .. })
        ));
    }

    #[test]
    fn test_transform_without_fit() {
        let data = array![[1.0, 2.0]];
        assert!(StandardScaler::new().transform(&data).is_err());
    }

    #[test]
    fn test_inverse_transform_restores_values() {
        let data = array![[1.0, 10.0], [2.0, 30.0], [6.0, 20.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&data).unwrap();
        let restored = scaler.inverse_transform(scaled.as_matrix()).unwrap();
        for (a, b) in restored.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_standardize_names_degenerate_column() {
        use crate::dataset::{Origin, Record};
        let names = vec!["pH".to_string(), "density".to_string()];
        let records = (0..3)
            .map(|i| Record {
                id: i.to_string(),
                features: vec![3.0 + i as f64, 0.99],
                origin: Origin::Red,
                quality: 5,
            })
            .collect();
        let dataset = Dataset::new(names, records).unwrap();
        match standardize(&dataset) {
            Err(Error::DegenerateFeature { column, name }) => {
                assert_eq!(column, 1);
                assert_eq!(name, "density");
            }
            other => panic!("expected degenerate feature, got {other:?}"),
        }
    }
}
