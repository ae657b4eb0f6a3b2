//! Multipart upload parsing shared by `/predict` and `/refit`.

use axum::body::Bytes;
use axum::extract::Multipart;
use credit_inference::InferenceError;
use tracing::debug;

use crate::error::ApiError;

/// Form part carrying the CSV.
pub const FILE_FIELD: &str = "file";
/// Form field carrying the requested number of rows.
pub const SAMPLES_FIELD: &str = "number_of_samples";

/// The parts of an upload form this service reads.
#[derive(Debug, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub file: Option<Bytes>,
    pub number_of_samples: Option<String>,
}

impl Upload {
    /// Drain the form, keeping the parts we know and skipping the rest.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(FILE_FIELD) => {
                    upload.file_name = field.file_name().map(str::to_owned);
                    upload.file = Some(field.bytes().await?);
                }
                Some(SAMPLES_FIELD) => {
                    upload.number_of_samples = Some(field.text().await?);
                }
                other => debug!("Ignoring form field {:?}", other),
            }
        }
        Ok(upload)
    }

    /// The CSV bytes, or `NoInput` when no file was selected.
    ///
    /// A `file` part without a file name is a plain form value, not an upload.
    pub fn csv(&self) -> Result<&Bytes, InferenceError> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| InferenceError::NoInput(format!("missing '{}' part", FILE_FIELD)))?;
        if self.file_name.as_deref().unwrap_or("").is_empty() {
            return Err(InferenceError::NoInput("no file selected".to_string()));
        }
        if file.is_empty() {
            return Err(InferenceError::EmptyDataset);
        }
        Ok(file)
    }

    /// Requested row count; 1 when the field is absent or blank.
    pub fn sample_count(&self) -> Result<usize, InferenceError> {
        let Some(raw) = self.number_of_samples.as_deref().map(str::trim) else {
            return Ok(1);
        };
        if raw.is_empty() {
            return Ok(1);
        }
        match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(InferenceError::InvalidSampleCount(format!(
                "'{}' is not a positive integer",
                raw
            ))),
            Ok(n) => Ok(n),
        }
    }
}
