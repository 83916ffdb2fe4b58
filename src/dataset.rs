use crate::error::{Error, Result};
use crate::Matrix;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

/// Physicochemical feature columns of the wine-quality sources, in file order.
pub const WINE_FEATURES: [&str; 11] = [
    "fixed acidity",
    "volatile acidity",
    "citric acid",
    "residual sugar",
    "chlorides",
    "free sulfur dioxide",
    "total sulfur dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

/// Highest quality grade accepted by the loader.
pub const MAX_QUALITY: u8 = 10;

/// Source a record was loaded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Red,
    White,
}

impl Origin {
    pub const ALL: [Origin; 2] = [Origin::Red, Origin::White];

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Red => "red",
            Origin::White => "white",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample, detached from its dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: String,
    pub features: Vec<f64>,
    pub origin: Origin,
    pub quality: u8,
}

/// Column layout of a delimited source.
#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Header of the identifier column. Without one, the 0-based row index is the identifier.
    pub id_column: Option<String>,
    pub quality_column: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            id_column: None,
            quality_column: "quality".to_string(),
        }
    }
}

impl CsvOptions {
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn id_column(mut self, name: &str) -> Self {
        self.id_column = Some(name.to_string());
        self
    }
}

/// Records sharing one ordered feature schema.
///
/// Row `i` of [`Dataset::features`] belongs to `ids()[i]`, `origins()[i]` and
/// `quality()[i]`. Quality never enters the feature matrix.
#[derive(Clone, Debug)]
pub struct Dataset {
    feature_names: Vec<String>,
    ids: Vec<String>,
    features: Matrix,
    origins: Vec<Origin>,
    quality: Vec<u8>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, records: Vec<Record>) -> Result<Self> {
        if records.is_empty() || feature_names.is_empty() {
            return Err(Error::EmptyInput);
        }

        let n_features = feature_names.len();
        let mut flat = Vec::with_capacity(records.len() * n_features);
        let mut ids = Vec::with_capacity(records.len());
        let mut origins = Vec::with_capacity(records.len());
        let mut quality = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if record.features.len() != n_features {
                return Err(Error::DimensionMismatch {
                    expected: n_features,
                    found: record.features.len(),
                });
            }
            if record.quality > MAX_QUALITY {
                return Err(Error::InvalidParameter {
                    name: "quality",
                    message: format!("record {index}: quality {} outside 0..={MAX_QUALITY}", record.quality),
                });
            }
            flat.extend(record.features);
            ids.push(record.id);
            origins.push(record.origin);
            quality.push(record.quality);
        }

        let features = Array2::from_shape_vec((ids.len(), n_features), flat).map_err(|_| {
            Error::DimensionMismatch {
                expected: ids.len() * n_features,
                found: 0,
            }
        })?;

        Ok(Self {
            feature_names,
            ids,
            features,
            origins,
            quality,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw, unstandardized features; one row per record.
    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn quality(&self) -> &[u8] {
        &self.quality
    }

    pub fn record(&self, index: usize) -> Option<Record> {
        if index >= self.n_samples() {
            return None;
        }
        Some(Record {
            id: self.ids[index].clone(),
            features: self.features.row(index).to_vec(),
            origin: self.origins[index],
            quality: self.quality[index],
        })
    }

    /// Appends the records of `other`, keeping each record's origin.
    pub fn concat(self, other: Dataset) -> Result<Self> {
        if self.feature_names != other.feature_names {
            return Err(Error::SchemaMismatch {
                expected: self.feature_names,
                found: other.feature_names,
            });
        }

        let features = ndarray::concatenate(Axis(0), &[self.features.view(), other.features.view()])
            .map_err(|_| Error::DimensionMismatch {
                expected: self.features.ncols(),
                found: other.features.ncols(),
            })?;

        let mut ids = self.ids;
        ids.extend(other.ids);
        let mut origins = self.origins;
        origins.extend(other.origins);
        let mut quality = self.quality;
        quality.extend(other.quality);

        Ok(Self {
            feature_names: self.feature_names,
            ids,
            features,
            origins,
            quality,
        })
    }

    /// Reads one delimited source with a header row, tagging every record with `origin`.
    pub fn from_csv_reader<R: io::Read>(reader: R, origin: Origin, options: &CsvOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let quality_idx = headers
            .iter()
            .position(|h| *h == options.quality_column)
            .ok_or_else(|| Error::MissingColumn(options.quality_column.clone()))?;
        let id_idx = match &options.id_column {
            Some(name) => Some(
                headers
                    .iter()
                    .position(|h| h == name)
                    .ok_or_else(|| Error::MissingColumn(name.clone()))?,
            ),
            None => None,
        };
        let feature_idx: Vec<usize> = (0..headers.len())
            .filter(|&i| i != quality_idx && Some(i) != id_idx)
            .collect();
        let feature_names: Vec<String> = feature_idx.iter().map(|&i| headers[i].clone()).collect();

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);

            let features = feature_idx
                .iter()
                .map(|&i| {
                    let field = record.get(i).unwrap_or("");
                    field.parse::<f64>().map_err(|_| Error::Parse {
                        line,
                        column: headers[i].clone(),
                        value: field.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            let raw_quality = record.get(quality_idx).unwrap_or("");
            let value = raw_quality.parse::<i64>().map_err(|_| Error::Parse {
                line,
                column: options.quality_column.clone(),
                value: raw_quality.to_string(),
            })?;
            let quality = u8::try_from(value)
                .ok()
                .filter(|q| *q <= MAX_QUALITY)
                .ok_or(Error::QualityOutOfRange { line, value })?;

            let id = match id_idx {
                Some(i) => record.get(i).unwrap_or("").to_string(),
                None => row.to_string(),
            };

            records.push(Record {
                id,
                features,
                origin,
                quality,
            });
        }

        let dataset = Self::new(feature_names, records)?;
        tracing::info!(
            origin = %origin,
            records = dataset.n_samples(),
            features = dataset.n_features(),
            "loaded source"
        );
        Ok(dataset)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P, origin: Origin, options: &CsvOptions) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(io::BufReader::new(file), origin, options)
    }

    /// Loads the red and white sources and concatenates them, red first.
    ///
    /// Both sources must carry exactly the [`WINE_FEATURES`] columns, in that order.
    pub fn load_wine_pair<P: AsRef<Path>, Q: AsRef<Path>>(red: P, white: Q, options: &CsvOptions) -> Result<Self> {
        let red = std::fs::File::open(red)?;
        let white = std::fs::File::open(white)?;
        Self::from_wine_readers(io::BufReader::new(red), io::BufReader::new(white), options)
    }

    /// Reader-based form of [`Dataset::load_wine_pair`].
    pub fn from_wine_readers<R: io::Read, W: io::Read>(red: R, white: W, options: &CsvOptions) -> Result<Self> {
        let red = Self::from_csv_reader(red, Origin::Red, options)?;
        red.check_wine_schema()?;
        let white = Self::from_csv_reader(white, Origin::White, options)?;
        white.check_wine_schema()?;
        red.concat(white)
    }

    fn check_wine_schema(&self) -> Result<()> {
        if self.feature_names.iter().map(String::as_str).ne(WINE_FEATURES) {
            return Err(Error::SchemaMismatch {
                expected: WINE_FEATURES.iter().map(|name| name.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }
        Ok(())
    }
}
