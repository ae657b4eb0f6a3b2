//! Response types and the DataFrame to JSON conversion used to echo samples.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Result of one prediction request.
///
/// Rows of `samples`, `predictions`, `labels` and `probabilities` line up:
/// entry `i` of each describes the same sampled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// The sampled raw records, one JSON object per row, original column names.
    pub samples: Vec<Map<String, Value>>,

    /// Predicted class code per row.
    pub predictions: Vec<u32>,

    /// Predicted class name per row.
    pub labels: Vec<String>,

    /// Class probabilities per row, in class-code order.
    pub probabilities: Vec<Vec<f64>>,

    /// Class names in code order; index `k` names `probabilities[_][k]`.
    pub classes: Vec<String>,

    pub generated_at: DateTime<Utc>,
}

/// Converts a Polars `AnyValue` to a JSON value.
///
/// NaN and infinite floats become `null`; types without a JSON counterpart
/// (dates, lists, structs) are stringified.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),

        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),

        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),

        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),

        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),

        _ => Value::String(format!("{}", value)),
    }
}

/// Every row of `df` as a JSON object keyed by column name.
pub fn dataframe_to_records(df: &DataFrame) -> PolarsResult<Vec<Map<String, Value>>> {
    let columns = df.get_columns();
    let mut records = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let mut record = Map::with_capacity(columns.len());
        for column in columns {
            record.insert(column.name().to_string(), any_value_to_json(column.get(i)?));
        }
        records.push(record);
    }

    Ok(records)
}
