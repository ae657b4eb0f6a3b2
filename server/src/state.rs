//! Shared application state.
//!
//! One `AppState` is built at startup and shared by every handler through an
//! `Arc`. The classifier and pipeline configuration never change after
//! startup; the fitted pipeline state lives in the service's
//! [`PipelineStore`] and may be swapped by `/refit`.

use credit_inference::{InferenceService, PipelineStore, Result, load_classifier};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};

pub struct AppState {
    pub service: InferenceService,
    pub version: String,
    pub started: Instant,
    pub max_upload_bytes: usize,
    /// Source of per-request seeds. Seeded from `--seed` when given, so a
    /// restarted server replays the same sequence of samples.
    rng: Mutex<StdRng>,
}

static_assertions::assert_impl_all!(AppState: Send, Sync);

impl AppState {
    pub fn new(service: InferenceService, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started: Instant::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Load the classifier, schema and optional fitted state named by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let classifier = load_classifier(&config.model)?;

        let (pipeline_config, store) = match &config.pipeline {
            Some(path) => {
                let store = PipelineStore::load(path)?;
                // the saved state carries the config it was fitted with
                let fitted_config = match store.current() {
                    Some(fitted) => fitted.config().clone(),
                    None => config.pipeline_config()?,
                };
                if config.schema.is_some() {
                    warn!("--schema is ignored when a fitted pipeline state is loaded");
                }
                (fitted_config, store)
            }
            None => {
                info!("No fitted pipeline state; each request fits on its own sample");
                (config.pipeline_config()?, PipelineStore::empty())
            }
        };

        let service = InferenceService::new(classifier, pipeline_config, Arc::new(store))?;
        Ok(Self::new(service, config.seed).with_max_upload_bytes(config.max_upload_bytes))
    }

    /// A fresh generator for one request.
    pub fn request_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().next_u64())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
