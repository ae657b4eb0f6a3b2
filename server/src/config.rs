//! Server configuration.
//!
//! Every option can come from a command-line flag or from an environment
//! variable; `main` loads a `.env` file first, so the variables may live there.

use clap::Parser;
use credit_processing::{
    ColumnSchema, PipelineConfig, PreprocessingError, PreprocessingResult, UnseenCategoryPolicy,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload limit: 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "credit-server",
    version,
    about = "Serves credit score predictions for uploaded CSV batches",
    long_about = "Loads a classifier and, optionally, a fitted preprocessing state, then \
                  serves predictions over HTTP.\n\n\
                  EXAMPLES:\n  \
                  credit-server --model model.json\n  \
                  credit-server --model model.json --pipeline pipeline.json --seed 42\n  \
                  CREDIT_MODEL_PATH=model.json CREDIT_BIND=0.0.0.0:8080 credit-server"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CREDIT_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Classifier JSON
    #[arg(long, env = "CREDIT_MODEL_PATH")]
    pub model: PathBuf,

    /// Column schema JSON; the built-in credit schema when omitted
    #[arg(long, env = "CREDIT_SCHEMA_PATH")]
    pub schema: Option<PathBuf>,

    /// Saved fitted pipeline state; without it every request fits on its own sample
    #[arg(long, env = "CREDIT_PIPELINE_PATH")]
    pub pipeline: Option<PathBuf>,

    /// Fixed seed for sampling and imputation
    #[arg(long, env = "CREDIT_SEED")]
    pub seed: Option<u64>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "CREDIT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Fail on categories not seen during fit instead of reserving a code
    #[arg(long, env = "CREDIT_REJECT_UNSEEN")]
    pub reject_unseen: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Pipeline configuration for per-request fits and refits.
    pub fn pipeline_config(&self) -> PreprocessingResult<PipelineConfig> {
        let schema = match &self.schema {
            Some(path) => ColumnSchema::load(path)?,
            None => ColumnSchema::credit_score(),
        };
        let policy = if self.reject_unseen {
            UnseenCategoryPolicy::Reject
        } else {
            UnseenCategoryPolicy::Reserved
        };
        PipelineConfig::builder()
            .schema(schema)
            .unseen_category(policy)
            .build()
            .map_err(|e| PreprocessingError::InvalidConfig(e.to_string()))
    }
}
