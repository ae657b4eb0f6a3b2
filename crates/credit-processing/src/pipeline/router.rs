//! Column router: fits every branch of the preprocessing pipeline.
//!
//! Columns are dispatched by static schema membership:
//!
//! ```text
//! raw batch ──► drop irrelevant ──► duration columns: leading number ─► min-max
//!                                  ├─► numeric:  clean ─► clip ─► median ─► min-max
//!                                  ├─► low-card: mode ─► ordinal code
//!                                  ├─► high-card: sampled fill ─► fit-time frequency
//!                                  └─► remainder: passthrough
//! ```
//!
//! Output column order is numeric branch, then low-cardinality branch, then
//! remainder columns in dataset order. Frequency-encoded columns are encoded
//! in place and travel with the remainder.

use polars::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::cleaner::ColumnCleaner;
use crate::config::PipelineConfig;
use crate::encoders::{FrequencyEncoder, OrdinalEncoder};
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::ClipBounds;
use crate::pipeline::scaler::MinMaxScaler;
use crate::pipeline::state::{
    DurationColumn, FittedPipeline, FrequencyColumn, NumericColumn, OrdinalColumn, RemainderKind,
};
use crate::schema::{ColumnGroup, ColumnSchema};
use crate::types::PreprocessedBatch;
use crate::utils::{category_values, is_numeric_dtype};

/// Unfitted preprocessing pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use credit_processing::{PipelineConfig, PreprocessingPipeline};
/// use rand::SeedableRng;
///
/// let pipeline = PreprocessingPipeline::new(PipelineConfig::default())?;
/// let fitted = pipeline.fit(&training_df)?;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let batch = fitted.transform(&request_df, &mut rng)?;
/// println!("{} x {}", batch.features.n_rows(), batch.features.n_cols());
/// ```
#[derive(Debug, Clone)]
pub struct PreprocessingPipeline {
    config: PipelineConfig,
    cleaner: ColumnCleaner,
}

impl PreprocessingPipeline {
    /// Create a pipeline from a validated configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PreprocessingError::InvalidConfig(e.to_string()))?;
        let cleaner = ColumnCleaner::from_config(&config);
        Ok(Self { config, cleaner })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Learn every per-column statistic from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPipeline> {
        let start = Instant::now();
        let schema = &self.config.schema;
        info!(
            "Fitting preprocessing pipeline on {} rows x {} columns",
            df.height(),
            df.width()
        );

        ensure_columns(df, schema.required_columns())?;

        let dropped = column_names(df)
            .iter()
            .filter(|c| schema.group_of(c) == ColumnGroup::Irrelevant)
            .count();
        debug!("Dropping {} irrelevant columns", dropped);

        // Duration columns: leading number, scaled on its own.
        let mut durations = Vec::with_capacity(schema.duration.len());
        let mut derived: HashMap<String, Vec<Option<f64>>> = HashMap::new();
        for name in &schema.duration {
            let raw = self.cleaner.extract_durations(lookup(df, name)?)?;
            let scaler = MinMaxScaler::fit(&raw)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;
            let scaled = scale_optional(&raw, &scaler);
            let median = StatisticalImputer::fit_median(&scaled).unwrap_or(0.0);
            debug!(
                "Duration '{}': min={} max={} median={:.4}",
                name, scaler.min, scaler.max, median
            );
            derived.insert(name.clone(), scaled);
            durations.push(DurationColumn {
                column: name.clone(),
                scaler,
                median,
            });
        }

        // Numeric branch: clean, clip, impute, scale.
        let mut numeric = Vec::with_capacity(schema.numeric.len());
        for name in &schema.numeric {
            let mut values = match derived.get(name) {
                Some(values) => values.clone(),
                None => self
                    .cleaner
                    .clean_series(lookup(df, name)?)
                    .context(format!("While cleaning '{}'", name))?,
            };

            let bounds = ClipBounds::fit(&values, self.config.iqr_multiplier)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;
            bounds.clip(&mut values);

            let median = StatisticalImputer::fit_median(&values)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;
            StatisticalImputer::fill_numeric(&mut values, median);

            let scaler = MinMaxScaler::fit(&values)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;

            debug!(
                "Numeric '{}': clip=[{:.4}, {:.4}] median={:.4} range=[{:.4}, {:.4}]",
                name, bounds.lower, bounds.upper, median, scaler.min, scaler.max
            );
            numeric.push(NumericColumn {
                column: name.clone(),
                bounds,
                median,
                scaler,
            });
        }

        // Low-cardinality branch.
        let mut low_cardinality = Vec::with_capacity(schema.low_cardinality.len());
        for name in &schema.low_cardinality {
            let values = category_values(lookup(df, name)?)?;
            let encoder = OrdinalEncoder::fit(&values)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;
            debug!(
                "Categorical '{}': mode='{}' {} categories",
                name,
                encoder.mode,
                encoder.categories.len()
            );
            low_cardinality.push(OrdinalColumn {
                column: name.clone(),
                encoder,
            });
        }

        // High-cardinality branch.
        let mut high_cardinality = Vec::with_capacity(schema.high_cardinality.len());
        for name in &schema.high_cardinality {
            let values = category_values(lookup(df, name)?)?;
            let encoder = FrequencyEncoder::fit(&values)
                .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;
            debug!(
                "Frequency '{}': {} categories",
                name,
                encoder.frequencies.len()
            );
            high_cardinality.push(FrequencyColumn {
                column: name.clone(),
                encoder,
            });
        }

        let remainder = fit_remainder(df, schema)?;

        let fitted = FittedPipeline::assemble(
            self.config.clone(),
            durations,
            numeric,
            low_cardinality,
            high_cardinality,
            remainder,
        );

        info!(
            "Pipeline fitted: {} features in {:?}",
            fitted.n_features(),
            start.elapsed()
        );
        Ok(fitted)
    }

    /// Fit on `df` and transform the same batch.
    pub fn fit_transform<R: Rng + ?Sized>(
        &self,
        df: &DataFrame,
        rng: &mut R,
    ) -> Result<(FittedPipeline, PreprocessedBatch)> {
        let fitted = self.fit(df)?;
        let batch = fitted.transform(df, rng)?;
        Ok((fitted, batch))
    }
}

/// Remainder columns in dataset order with how each one is produced.
fn fit_remainder(df: &DataFrame, schema: &ColumnSchema) -> Result<Vec<(String, RemainderKind)>> {
    let mut remainder = Vec::new();
    for name in column_names(df) {
        match schema.group_of(&name) {
            ColumnGroup::HighCardinality => {
                remainder.push((name, RemainderKind::Frequency));
            }
            ColumnGroup::Remainder if schema.is_duration(&name) => {
                remainder.push((name, RemainderKind::Duration));
            }
            ColumnGroup::Remainder => {
                let series = lookup(df, &name)?;
                if !is_numeric_dtype(series.dtype()) {
                    return Err(PreprocessingError::NonNumericRemainder {
                        column: name,
                        dtype: series.dtype().to_string(),
                    });
                }
                remainder.push((name, RemainderKind::Passthrough));
            }
            _ => {}
        }
    }
    Ok(remainder)
}

/// Column names of a frame as owned strings.
pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Look up a column as a Series, mapping absence to `ColumnNotFound`.
pub(crate) fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PreprocessingError::ColumnNotFound(name.to_string()))
}

/// Fail on the first name that is not a column of `df`.
pub(crate) fn ensure_columns<'a>(
    df: &DataFrame,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for name in names {
        lookup(df, name)?;
    }
    Ok(())
}

/// Apply a scaler to the non-null values, leaving nulls in place.
pub(crate) fn scale_optional(values: &[Option<f64>], scaler: &MinMaxScaler) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(|x| scaler.scale(x))).collect()
}
