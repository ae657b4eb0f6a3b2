//! Shared fitted preprocessing state.
//!
//! Readers clone the current `Arc<FittedPipeline>` and release the lock before
//! transforming, so a refit never blocks an in-flight prediction and readers
//! never observe a half-built state.

use credit_processing::{FittedPipeline, PipelineConfig, PreprocessingPipeline};
use parking_lot::{Mutex, RwLock};
use polars::prelude::DataFrame;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::Result;

/// Holder of the cached fitted state, if any.
#[derive(Debug, Default)]
pub struct PipelineStore {
    current: RwLock<Option<Arc<FittedPipeline>>>,
    /// Serializes refits; at most one fit runs at a time.
    refit_lock: Mutex<()>,
}

static_assertions::assert_impl_all!(PipelineStore: Send, Sync);

impl PipelineStore {
    /// A store with no cached state; every request fits on its own sample.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store seeded with an already fitted state.
    pub fn with_fitted(fitted: FittedPipeline) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(fitted))),
            refit_lock: Mutex::new(()),
        }
    }

    /// Load a fitted state saved as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let fitted = FittedPipeline::load(path.as_ref())?;
        info!(
            "Loaded fitted pipeline from {} ({} features)",
            path.as_ref().display(),
            fitted.n_features()
        );
        Ok(Self::with_fitted(fitted))
    }

    /// The current fitted state.
    pub fn current(&self) -> Option<Arc<FittedPipeline>> {
        self.current.read().clone()
    }

    pub fn is_fitted(&self) -> bool {
        self.current.read().is_some()
    }

    /// Fit a new state on `df` and swap it in.
    ///
    /// The fit runs without holding the read/write lock; only the final swap
    /// takes the write lock. If fitting fails the previous state is kept.
    pub fn refit(&self, config: PipelineConfig, df: &DataFrame) -> Result<Arc<FittedPipeline>> {
        self.refit_checked(config, df, |_| Ok(()))
    }

    /// Like [`PipelineStore::refit`], but `accept` must approve the new state
    /// before it replaces the current one.
    pub fn refit_checked<F>(
        &self,
        config: PipelineConfig,
        df: &DataFrame,
        accept: F,
    ) -> Result<Arc<FittedPipeline>>
    where
        F: FnOnce(&FittedPipeline) -> Result<()>,
    {
        let _guard = self.refit_lock.lock();
        let start = Instant::now();

        let fitted = PreprocessingPipeline::new(config)?.fit(df)?;
        accept(&fitted)?;

        let fitted = Arc::new(fitted);
        *self.current.write() = Some(Arc::clone(&fitted));

        info!(
            "Refitted pipeline on {} rows in {:?}",
            df.height(),
            start.elapsed()
        );
        Ok(fitted)
    }

    /// Drop the cached state.
    pub fn clear(&self) {
        let _guard = self.refit_lock.lock();
        *self.current.write() = None;
    }
}
