//! Fitted pipeline state and the transform path.
//!
//! A [`FittedPipeline`] is immutable once built. It can be shared across
//! threads behind an `Arc` and serialized to JSON so a service can load the
//! statistics learned offline instead of fitting per request.

use polars::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cleaner::ColumnCleaner;
use crate::config::PipelineConfig;
use crate::encoders::{FrequencyEncoder, OrdinalEncoder};
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::ClipBounds;
use crate::pipeline::router::{column_names, ensure_columns, lookup, scale_optional};
use crate::pipeline::scaler::MinMaxScaler;
use crate::schema::{ColumnGroup, ColumnSchema};
use crate::types::{FeatureMatrix, PreprocessedBatch};
use crate::utils::{category_values, numeric_values};

/// Statistics of a duration-like column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationColumn {
    pub column: String,
    /// Range of the extracted leading numbers.
    pub scaler: MinMaxScaler,
    /// Median of the scaled values, used when the column is not also numeric.
    pub median: f64,
}

/// Statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    pub bounds: ClipBounds,
    pub median: f64,
    pub scaler: MinMaxScaler,
}

/// Fitted encoder of a low-cardinality column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalColumn {
    pub column: String,
    pub encoder: OrdinalEncoder,
}

/// Fitted frequency map of a high-cardinality column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyColumn {
    pub column: String,
    pub encoder: FrequencyEncoder,
}

/// How a trailing (remainder) feature is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderKind {
    /// Unclassified numeric column, copied as-is. Nulls become NaN.
    Passthrough,
    /// High-cardinality column, frequency-encoded in place.
    Frequency,
    /// Duration column not listed as numeric; scaled leading number.
    Duration,
}

/// Every statistic learned at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    config: PipelineConfig,
    durations: Vec<DurationColumn>,
    numeric: Vec<NumericColumn>,
    low_cardinality: Vec<OrdinalColumn>,
    high_cardinality: Vec<FrequencyColumn>,
    remainder: Vec<(String, RemainderKind)>,
    feature_names: Vec<String>,
}

static_assertions::assert_impl_all!(FittedPipeline: Send, Sync);

impl FittedPipeline {
    pub(crate) fn assemble(
        config: PipelineConfig,
        durations: Vec<DurationColumn>,
        numeric: Vec<NumericColumn>,
        low_cardinality: Vec<OrdinalColumn>,
        high_cardinality: Vec<FrequencyColumn>,
        remainder: Vec<(String, RemainderKind)>,
    ) -> Self {
        let feature_names = numeric
            .iter()
            .map(|c| c.column.clone())
            .chain(low_cardinality.iter().map(|c| c.column.clone()))
            .chain(remainder.iter().map(|(name, _)| name.clone()))
            .collect();

        Self {
            config,
            durations,
            numeric,
            low_cardinality,
            high_cardinality,
            remainder,
            feature_names,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.config.schema
    }

    /// Output feature names in matrix order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn durations(&self) -> &[DurationColumn] {
        &self.durations
    }

    pub fn numeric_columns(&self) -> &[NumericColumn] {
        &self.numeric
    }

    pub fn numeric_column(&self, name: &str) -> Option<&NumericColumn> {
        self.numeric.iter().find(|c| c.column == name)
    }

    pub fn ordinal_columns(&self) -> &[OrdinalColumn] {
        &self.low_cardinality
    }

    pub fn frequency_columns(&self) -> &[FrequencyColumn] {
        &self.high_cardinality
    }

    pub fn frequency_column(&self, name: &str) -> Option<&FrequencyColumn> {
        self.high_cardinality.iter().find(|c| c.column == name)
    }

    pub fn remainder(&self) -> &[(String, RemainderKind)] {
        &self.remainder
    }

    /// Transform a raw batch into the fitted feature space.
    ///
    /// `rng` drives the sampling imputation of high-cardinality columns; pass
    /// a seeded RNG for reproducible output.
    pub fn transform<R: Rng + ?Sized>(
        &self,
        df: &DataFrame,
        rng: &mut R,
    ) -> Result<PreprocessedBatch> {
        let start = Instant::now();
        let schema = &self.config.schema;
        let cleaner = ColumnCleaner::from_config(&self.config);
        let policy = self.config.unseen_category;

        ensure_columns(df, schema.required_columns())?;
        ensure_columns(df, self.remainder.iter().map(|(name, _)| name.as_str()))?;
        self.warn_ignored_columns(df);

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.n_features());

        let mut derived = Vec::with_capacity(self.durations.len());
        for duration in &self.durations {
            let raw = cleaner.extract_durations(lookup(df, &duration.column)?)?;
            derived.push((duration, scale_optional(&raw, &duration.scaler)));
        }
        let derived_of = |name: &str| {
            derived
                .iter()
                .find(|(d, _)| d.column == name)
                .map(|(d, values)| (*d, values))
        };

        for numeric in &self.numeric {
            let mut values = match derived_of(numeric.column.as_str()) {
                Some((_, values)) => values.clone(),
                None => cleaner
                    .clean_series(lookup(df, &numeric.column)?)
                    .context(format!("While cleaning '{}'", numeric.column))?,
            };

            let clipped = numeric.bounds.clip(&mut values);
            let filled = StatisticalImputer::fill_numeric(&mut values, numeric.median);
            if clipped + filled > 0 {
                debug!(
                    "Numeric '{}': clipped {} values, imputed {} nulls",
                    numeric.column, clipped, filled
                );
            }

            columns.push(
                values
                    .into_iter()
                    .map(|v| numeric.scaler.scale(v.unwrap_or(numeric.median)))
                    .collect(),
            );
        }

        for ordinal in &self.low_cardinality {
            let values = category_values(lookup(df, &ordinal.column)?)?;
            columns.push(ordinal.encoder.transform(&ordinal.column, values, policy)?);
        }

        for (name, kind) in &self.remainder {
            let column = match kind {
                RemainderKind::Frequency => {
                    let encoder = self
                        .frequency_column(name)
                        .ok_or_else(|| PreprocessingError::ColumnNotFound(name.clone()))?;
                    let values = category_values(lookup(df, name)?)?;
                    encoder.encoder.transform(name, values, policy, rng)?
                }
                RemainderKind::Duration => {
                    let (duration, values) = derived_of(name.as_str())
                        .ok_or_else(|| PreprocessingError::ColumnNotFound(name.clone()))?;
                    values
                        .iter()
                        .map(|v| v.unwrap_or(duration.median))
                        .collect()
                }
                RemainderKind::Passthrough => numeric_values(lookup(df, name)?)?
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect(),
            };
            columns.push(column);
        }

        let labels = self.extract_labels(df)?;
        let features = FeatureMatrix::from_columns(self.feature_names.clone(), columns)?;

        info!(
            "Transformed {} rows into {} features in {:?}",
            features.n_rows(),
            features.n_cols(),
            start.elapsed()
        );
        Ok(PreprocessedBatch { features, labels })
    }

    /// Map the label column, when present, to class codes.
    fn extract_labels(&self, df: &DataFrame) -> Result<Option<Vec<Option<u32>>>> {
        let Some(label) = &self.config.schema.label else {
            return Ok(None);
        };
        let Ok(series) = lookup(df, &label.column) else {
            return Ok(None);
        };

        let codes: Vec<Option<u32>> = category_values(series)?
            .iter()
            .map(|v| v.as_deref().and_then(|s| label.code_of(s)))
            .collect();

        let unknown = codes.iter().filter(|c| c.is_none()).count();
        if unknown > 0 {
            warn!(
                "Label column '{}': {} rows with missing or unknown class",
                label.column, unknown
            );
        }

        Ok(Some(codes))
    }

    /// Columns that are neither in the schema nor in the fitted remainder are dropped.
    fn warn_ignored_columns(&self, df: &DataFrame) {
        let known: HashSet<&str> = self.remainder.iter().map(|(n, _)| n.as_str()).collect();
        let ignored: Vec<String> = column_names(df)
            .into_iter()
            .filter(|name| {
                self.config.schema.group_of(name) == ColumnGroup::Remainder
                    && !self.config.schema.is_duration(name)
                    && !known.contains(name.as_str())
            })
            .collect();

        if !ignored.is_empty() {
            warn!("Ignoring columns unknown at fit time: {:?}", ignored);
        }
    }

    /// Write the fitted state as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a fitted state written by [`FittedPipeline::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let fitted: FittedPipeline = serde_json::from_reader(reader)?;
        fitted
            .config
            .validate()
            .map_err(|e| PreprocessingError::InvalidConfig(e.to_string()))?;
        Ok(fitted)
    }
}
