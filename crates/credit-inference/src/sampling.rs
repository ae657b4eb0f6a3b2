//! Uniform row sampling without replacement.

use polars::prelude::*;
use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::error::{InferenceError, Result};

/// Draw `n` distinct rows uniformly at random.
///
/// Rows come back in draw order, not dataset order. Asking for more rows than
/// the frame holds is an error; the sample is never silently truncated.
pub fn sample_rows<R: Rng + ?Sized>(df: &DataFrame, n: usize, rng: &mut R) -> Result<DataFrame> {
    if n == 0 {
        return Err(InferenceError::InvalidSampleCount(
            "at least one sample is required".to_string(),
        ));
    }

    let available = df.height();
    if available == 0 {
        return Err(InferenceError::EmptyDataset);
    }
    if n > available {
        return Err(InferenceError::SampleSizeExceeded {
            requested: n,
            available,
        });
    }

    let picked: Vec<IdxSize> = index::sample(rng, available, n)
        .into_iter()
        .map(|i| i as IdxSize)
        .collect();
    debug!("Sampled {} of {} rows", n, available);

    Ok(df.take(&IdxCa::from_vec("idx".into(), picked))?)
}
