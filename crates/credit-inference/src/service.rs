//! The inference service: sample, preprocess, classify.

use chrono::Utc;
use credit_processing::{
    ColumnSchema, FittedPipeline, PipelineConfig, PreprocessedBatch, PreprocessingPipeline,
};
use polars::prelude::DataFrame;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{InferenceError, Result};
use crate::model::{Classifier, argmax};
use crate::sampling::sample_rows;
use crate::store::PipelineStore;
use crate::types::{PredictionResponse, dataframe_to_records};

/// Serves predictions for uploaded batches.
///
/// The classifier and pipeline configuration are injected at construction and
/// never change. The fitted preprocessing state lives in a [`PipelineStore`];
/// when the store is empty each request fits the pipeline on its own sample.
#[derive(Debug, Clone)]
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
    config: PipelineConfig,
    store: Arc<PipelineStore>,
}

static_assertions::assert_impl_all!(InferenceService: Send, Sync);

impl InferenceService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        config: PipelineConfig,
        store: Arc<PipelineStore>,
    ) -> Result<Self> {
        let schema_classes = config.schema.class_names();
        if !schema_classes.is_empty() && schema_classes.as_slice() != classifier.classes() {
            return Err(InferenceError::InvalidModel(format!(
                "model classes {:?} differ from schema label classes {:?}",
                classifier.classes(),
                schema_classes
            )));
        }

        if let Some(fitted) = store.current() {
            check_width(classifier.as_ref(), fitted.n_features())?;
        }

        Ok(Self {
            classifier,
            config,
            store,
        })
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.config.schema
    }

    pub fn store(&self) -> &Arc<PipelineStore> {
        &self.store
    }

    /// Sample `sample_count` rows of `df`, preprocess them and classify.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        df: &DataFrame,
        sample_count: usize,
        rng: &mut R,
    ) -> Result<PredictionResponse> {
        let start = Instant::now();

        let sample = sample_rows(df, sample_count, rng)?;
        let batch = self.preprocess(&sample, rng)?;

        let features = &batch.features;
        check_width(self.classifier.as_ref(), features.n_cols())?;
        if let Some(expected) = self.classifier.feature_names()
            && expected != features.feature_names()
        {
            warn!(
                "Feature names differ from the ones the model was trained on: {:?}",
                features.feature_names()
            );
        }

        let probabilities = self.classifier.predict_proba(features)?;
        let classes = self.classifier.classes().to_vec();
        let predictions: Vec<u32> = probabilities
            .iter()
            .map(|row| argmax(row) as u32)
            .collect();
        let labels = predictions
            .iter()
            .map(|&code| {
                classes.get(code as usize).cloned().ok_or_else(|| {
                    InferenceError::Internal(format!("class code {} out of range", code))
                })
            })
            .collect::<Result<Vec<String>>>()?;

        let samples = dataframe_to_records(&sample)?;

        info!(
            "Predicted {} of {} rows in {:?}",
            sample_count,
            df.height(),
            start.elapsed()
        );

        Ok(PredictionResponse {
            samples,
            predictions,
            labels,
            probabilities,
            classes,
            generated_at: Utc::now(),
        })
    }

    /// Refit the cached state on a training batch.
    ///
    /// A new state that does not produce the width the classifier expects is
    /// rejected and the previous state stays in place.
    pub fn refit(&self, df: &DataFrame) -> Result<Arc<FittedPipeline>> {
        let classifier = self.classifier.as_ref();
        self.store
            .refit_checked(self.config.clone(), df, |fitted| {
                check_width(classifier, fitted.n_features())
            })
    }

    fn preprocess<R: Rng + ?Sized>(
        &self,
        sample: &DataFrame,
        rng: &mut R,
    ) -> Result<PreprocessedBatch> {
        match self.store.current() {
            Some(fitted) => Ok(fitted.transform(sample, rng)?),
            None => {
                debug!("No cached pipeline state; fitting on the sample");
                let (_, batch) =
                    PreprocessingPipeline::new(self.config.clone())?.fit_transform(sample, rng)?;
                Ok(batch)
            }
        }
    }
}

fn check_width(classifier: &dyn Classifier, actual: usize) -> Result<()> {
    if classifier.n_features() != actual {
        return Err(InferenceError::FeatureWidthMismatch {
            expected: classifier.n_features(),
            actual,
        });
    }
    Ok(())
}
