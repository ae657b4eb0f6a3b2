//! Shared utilities for the preprocessing pipeline.
//!
//! Column extraction helpers turn polars columns of any supported dtype into
//! plain `Vec<Option<_>>` buffers; statistics helpers work on those buffers.

use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Read a numeric Series as `f64` values. NaN is treated as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    if matches!(series.dtype(), DataType::Null) {
        return Ok(vec![None; series.len()]);
    }

    let cast = series.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Render a number the way it is used as a category key.
///
/// Integral floats drop the fractional part so `4.0` and `4` share a key
/// regardless of how the CSV reader typed the column.
pub fn canonical_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Read any Series as category keys.
pub fn category_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let dtype = series.dtype();

    if matches!(dtype, DataType::Null) {
        return Ok(vec![None; series.len()]);
    }

    if dtype == &DataType::String {
        return Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect());
    }

    if is_numeric_dtype(dtype) {
        return Ok(numeric_values(series)?
            .into_iter()
            .map(|v| v.map(canonical_number))
            .collect());
    }

    if dtype == &DataType::Boolean {
        return Ok(series
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect());
    }

    let cast = series.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// =============================================================================
// Statistics
// =============================================================================

/// Sorted non-null values.
pub fn sorted_non_null(values: &[Option<f64>]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of sorted data using linear interpolation between order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let weight = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Median of the non-null values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    quantile_sorted(&sorted_non_null(values), 0.5)
}

/// Minimum and maximum of the non-null values.
pub fn min_max(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Occurrence counts of the non-null categories, in category order.
pub fn value_counts(values: &[Option<String>]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most frequent non-null category. Ties resolve to the smallest category.
pub fn string_mode(values: &[Option<String>]) -> Option<String> {
    let mut best: Option<(String, usize)> = None;
    for (value, count) in value_counts(values) {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_values_from_ints() {
        let series = Series::new("n".into(), &[Some(1i64), None, Some(3)]);
        assert_eq!(
            numeric_values(&series).unwrap(),
            vec![Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn test_numeric_values_nan_is_missing() {
        let series = Series::new("n".into(), &[1.0, f64::NAN]);
        assert_eq!(numeric_values(&series).unwrap(), vec![Some(1.0), None]);
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number(4.0), "4");
        assert_eq!(canonical_number(-2.0), "-2");
        assert_eq!(canonical_number(2.5), "2.5");
    }

    #[test]
    fn test_category_values_float_and_int_agree() {
        let floats = Series::new("c".into(), &[Some(4.0), None]);
        let ints = Series::new("c".into(), &[Some(4i64), None]);
        assert_eq!(
            category_values(&floats).unwrap(),
            category_values(&ints).unwrap()
        );
    }

    #[test]
    fn test_category_values_strings() {
        let series = Series::new("c".into(), &[Some("Lawyer"), None]);
        assert_eq!(
            category_values(&series).unwrap(),
            vec![Some("Lawyer".to_string()), None]
        );
    }

    #[test]
    fn test_quantile_linear() {
        let sorted = [100.0, 200.0, 300.0, 400.0, 1200.0];
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(200.0));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(400.0));

        let even = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&even, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&even, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_median_ignores_nulls() {
        assert_eq!(median(&[Some(1.0), None, Some(3.0), Some(5.0)]), Some(3.0));
        assert_eq!(median(&[None, None]), None);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[Some(3.0), None, Some(-1.0)]), Some((-1.0, 3.0)));
        assert_eq!(min_max(&[None]), None);
    }

    #[test]
    fn test_string_mode_tie_breaks_smallest() {
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            Some("a".to_string()),
            None,
        ];
        assert_eq!(string_mode(&values), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode() {
        let values: Vec<Option<String>> = ["a", "b", "a", "c", "a"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(string_mode(&values), Some("a".to_string()));
        assert_eq!(string_mode(&[None]), None);
    }
}
