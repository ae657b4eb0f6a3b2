//! Request handlers.
//!
//! - **predict**: `POST /predict` (sample and classify) and `POST /refit`
//! - **meta**: `GET /schema` and `GET /health`
//! - **upload**: multipart parsing shared by the two upload routes

pub mod meta;
pub mod predict;
pub mod upload;

pub use meta::{HealthResponse, SchemaResponse, health, schema};
pub use predict::{RefitResponse, predict, refit};
