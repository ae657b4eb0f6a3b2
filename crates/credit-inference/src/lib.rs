//! credit-inference: credit score predictions for uploaded batches.
//!
//! This crate sits between the preprocessing pipeline
//! ([`credit_processing`]) and any presentation layer. It samples rows from an
//! uploaded dataset, turns them into features with a fitted pipeline state and
//! asks an injected [`Classifier`] for class probabilities.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use credit_inference::{InferenceService, PipelineStore, load_classifier};
//! use credit_processing::PipelineConfig;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let classifier = load_classifier("model.json")?;
//! let store = Arc::new(PipelineStore::load("pipeline.json")?);
//! let service = InferenceService::new(classifier, PipelineConfig::default(), store)?;
//!
//! let upload = credit_processing::io::read_csv_path("test.csv")?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let response = service.predict(&upload, 5, &mut rng)?;
//! for (label, proba) in response.labels.iter().zip(&response.probabilities) {
//!     println!("{label}: {proba:?}");
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! upload ──► sample_rows ──► FittedPipeline::transform ──► Classifier::predict_proba
//!                                   ▲                                │
//!                             PipelineStore                  PredictionResponse
//!                       (cached state, refit under lock)
//! ```
//!
//! # Thread Safety
//!
//! [`InferenceService`] is `Send + Sync` and cheap to clone. The classifier
//! is immutable; the fitted state is swapped atomically by
//! [`PipelineStore::refit`].

mod error;
mod model;
mod sampling;
mod service;
mod store;
mod types;

// Error types
pub use error::{InferenceError, Result};
// Model types
pub use model::{
    Classifier, ModelSpec, SoftVotingClassifier, SoftmaxClassifier, VotingMember, argmax,
    load_classifier,
};
// Sampling
pub use sampling::sample_rows;
// Service and shared state
pub use service::InferenceService;
pub use store::PipelineStore;
// Response types
pub use types::{PredictionResponse, any_value_to_json, dataframe_to_records};
