//! Integration tests for the credit score preprocessing pipeline.
//!
//! These tests fit the pipeline on synthetic batches shaped like the credit
//! score dataset, dirty values included, and check the transform contract.

use credit_processing::{
    ColumnSchema, FittedPipeline, PipelineConfig, PreprocessingError, PreprocessingPipeline,
    UnseenCategoryPolicy, io,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// Helper Functions
// ============================================================================

const NUMERIC: [&str; 16] = [
    "Age",
    "Annual_Income",
    "Monthly_Inhand_Salary",
    "Num_Bank_Accounts",
    "Num_Credit_Card",
    "Interest_Rate",
    "Num_of_Loan",
    "Num_of_Delayed_Payment",
    "Changed_Credit_Limit",
    "Outstanding_Debt",
    "Credit_History_Age",
    "Credit_Utilization_Ratio",
    "Total_EMI_per_month",
    "Amount_invested_monthly",
    "Monthly_Balance",
    "Delay_from_due_date",
];

fn col<T, V>(name: &str, values: V) -> Column
where
    Series: NamedFrom<V, T>,
    T: ?Sized,
{
    Series::new(name.into(), values).into_column()
}

/// A credit-like batch with separator artifacts, placeholders and nulls.
fn credit_frame(n: usize) -> DataFrame {
    let idx: Vec<usize> = (0..n).collect();
    let text = |f: &dyn Fn(usize) -> Option<String>| -> Vec<Option<String>> {
        idx.iter().map(|&i| f(i)).collect()
    };

    let columns = vec![
        col("ID", text(&|i| Some(format!("0x{:x}", 0x1600 + i)))),
        col("Customer_ID", text(&|i| Some(format!("CUS_{}", i / 3)))),
        col("Month", text(&|i| Some(["January", "February", "March"][i % 3].to_string()))),
        col("Name", text(&|i| Some(format!("Name {}", i)))),
        col(
            "Age",
            text(&|i| {
                let age = 21 + (i * 7) % 40;
                Some(if i % 4 == 0 { format!("{}_", age) } else { age.to_string() })
            }),
        ),
        col("SSN", text(&|i| Some(format!("821-00-{:04}", i)))),
        col(
            "Occupation",
            text(&|i| match i % 5 {
                1 => None,
                3 => Some("_______".to_string()),
                k => Some(["Lawyer", "Engineer", "Doctor", "", "Teacher"][k].to_string()),
            }),
        ),
        col(
            "Annual_Income",
            text(&|i| {
                let income = 19_000.0 + 3_250.5 * i as f64;
                Some(if i % 6 == 5 { format!("{}_", income) } else { income.to_string() })
            }),
        ),
        col(
            "Monthly_Inhand_Salary",
            idx.iter()
                .map(|&i| (i % 5 != 2).then(|| 1_500.0 + 120.0 * i as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        col(
            "Num_Bank_Accounts",
            idx.iter().map(|&i| (i % 8) as i64).collect::<Vec<i64>>(),
        ),
        col(
            "Num_Credit_Card",
            idx.iter().map(|&i| 3 + (i % 4) as i64).collect::<Vec<i64>>(),
        ),
        col(
            "Interest_Rate",
            idx.iter()
                .map(|&i| if i == 7 { 5_000 } else { 3 + (i % 20) as i64 })
                .collect::<Vec<i64>>(),
        ),
        col("Num_of_Loan", text(&|i| Some(if i % 7 == 3 { "-100".to_string() } else { (i % 5).to_string() }))),
        col(
            "Type_of_Loan",
            text(&|i| (i % 4 != 0).then(|| "Auto Loan, and Home Equity Loan".to_string())),
        ),
        col("Delay_from_due_date", idx.iter().map(|&i| (i * 3 % 30) as i64).collect::<Vec<i64>>()),
        col(
            "Num_of_Delayed_Payment",
            text(&|i| match i % 6 {
                2 => None,
                4 => Some(format!("{}_", 10 + i)),
                _ => Some((5 + i % 9).to_string()),
            }),
        ),
        col(
            "Changed_Credit_Limit",
            text(&|i| Some(if i % 5 == 4 { "_".to_string() } else { format!("{:.2}", 1.5 + i as f64) })),
        ),
        col(
            "Num_Credit_Inquiries",
            idx.iter()
                .map(|&i| (i % 7 != 6).then(|| (i % 4) as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        col(
            "Credit_Mix",
            text(&|i| match i % 5 {
                4 => None,
                k => Some(["Good", "Standard", "Bad", "_"][k].to_string()),
            }),
        ),
        col("Outstanding_Debt", text(&|i| Some(format!("{:.2}", 800.0 + 97.3 * i as f64)))),
        col(
            "Credit_Utilization_Ratio",
            idx.iter().map(|&i| 22.5 + (i % 11) as f64).collect::<Vec<f64>>(),
        ),
        col(
            "Credit_History_Age",
            text(&|i| (i % 6 != 1).then(|| format!("{} Years and {} Months", 2 + (i * 5) % 30, i % 12))),
        ),
        col(
            "Payment_of_Min_Amount",
            text(&|i| Some(["Yes", "No", "NM"][i % 3].to_string())),
        ),
        col(
            "Total_EMI_per_month",
            idx.iter().map(|&i| 49.5 + 10.0 * i as f64).collect::<Vec<f64>>(),
        ),
        col(
            "Amount_invested_monthly",
            text(&|i| Some(if i % 9 == 8 { "__10000__".to_string() } else { format!("{:.3}", 80.0 + 3.0 * i as f64) })),
        ),
        col(
            "Payment_Behaviour",
            text(&|i| Some(if i % 2 == 0 { "High_spent_Small_value_payments".to_string() } else { "!@9#%8".to_string() })),
        ),
        col(
            "Monthly_Balance",
            idx.iter()
                .map(|&i| (i % 10 != 9).then(|| 250.0 + 31.0 * i as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        col(
            "Credit_Score",
            text(&|i| Some(["Good", "Standard", "Poor"][i % 3].to_string())),
        ),
    ];

    DataFrame::new(columns).unwrap()
}

fn fit_credit(df: &DataFrame) -> FittedPipeline {
    PreprocessingPipeline::new(PipelineConfig::default())
        .unwrap()
        .fit(df)
        .unwrap()
}

fn income_only_schema() -> ColumnSchema {
    ColumnSchema {
        version: 1,
        irrelevant: vec![],
        numeric: vec!["Annual_Income".to_string()],
        low_cardinality: vec![],
        high_cardinality: vec![],
        duration: vec![],
        label: None,
    }
}

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn test_credit_feature_layout() {
    let df = credit_frame(24);
    let fitted = fit_credit(&df);

    let mut expected: Vec<String> = NUMERIC.iter().map(|s| s.to_string()).collect();
    expected.push("Credit_Mix".to_string());
    expected.push("Payment_of_Min_Amount".to_string());
    // high-cardinality columns travel with the remainder in dataset order
    expected.push("Occupation".to_string());
    expected.push("Num_Credit_Inquiries".to_string());

    assert_eq!(fitted.feature_names(), expected.as_slice());
    assert_eq!(fitted.n_features(), 20);
}

#[test]
fn test_credit_fit_transform_end_to_end() {
    let df = credit_frame(24);
    let mut rng = StdRng::seed_from_u64(42);
    let (fitted, batch) = PreprocessingPipeline::new(PipelineConfig::default())
        .unwrap()
        .fit_transform(&df, &mut rng)
        .unwrap();

    assert_eq!(batch.features.n_rows(), 24);
    assert_eq!(batch.features.n_cols(), fitted.n_features());

    // every feature is a finite number after imputation
    for row in batch.features.rows() {
        assert!(row.iter().all(|v| v.is_finite()));
    }

    let labels = batch.labels.unwrap();
    assert_eq!(labels.len(), 24);
    assert_eq!(&labels[..3], &[Some(2), Some(0), Some(1)]);
}

#[test]
fn test_numeric_branch_in_unit_interval_on_fit_data() {
    let df = credit_frame(30);
    let fitted = fit_credit(&df);
    let batch = fitted
        .transform(&df, &mut StdRng::seed_from_u64(1))
        .unwrap();

    for name in NUMERIC {
        let j = batch.features.position(name).unwrap();
        for v in batch.features.column(j) {
            assert!((0.0..=1.0).contains(&v), "{} produced {}", name, v);
        }
    }
}

#[test]
fn test_outlier_clipped_before_scaling() {
    let df = credit_frame(30);
    let fitted = fit_credit(&df);
    let rate = fitted.numeric_column("Interest_Rate").unwrap();

    // the 5000% rate is far above Q3 + 1.5 * IQR
    assert!(rate.bounds.upper < 5_000.0);
    assert_eq!(rate.scaler.max, rate.bounds.upper);
}

#[test]
fn test_frequency_maps_sum_to_one() {
    let fitted = fit_credit(&credit_frame(40));
    for column in fitted.frequency_columns() {
        let sum: f64 = column.encoder.frequencies.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", column.column, sum);
    }
}

#[test]
fn test_width_depends_only_on_fitted_state() {
    let df = credit_frame(30);
    let fitted = fit_credit(&df);
    let mut rng = StdRng::seed_from_u64(3);

    for n in [1, 2, 7, 30] {
        let batch = fitted.transform(&df.head(Some(n)), &mut rng).unwrap();
        assert_eq!(batch.features.n_rows(), n);
        assert_eq!(batch.features.n_cols(), 20);
    }
}

#[test]
fn test_separator_value_cleaned_and_clipped() {
    let df = df![
        "Annual_Income" => ["1_200", "100", "200", "300", "400"],
    ]
    .unwrap();
    let config = PipelineConfig::builder()
        .schema(income_only_schema())
        .build()
        .unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let (fitted, batch) = PreprocessingPipeline::new(config)
        .unwrap()
        .fit_transform(&df, &mut rng)
        .unwrap();

    let income = fitted.numeric_column("Annual_Income").unwrap();
    assert_eq!(income.bounds.upper, 700.0);
    assert_eq!(income.scaler.min, 100.0);
    assert_eq!(income.scaler.max, 700.0);

    // 1200 -> 700 -> 1.0
    assert_eq!(batch.features.column(0)[0], 1.0);
    assert_eq!(batch.features.column(0)[1], 0.0);
    assert!(batch.labels.is_none());
}

#[test]
fn test_out_of_range_values_not_reclipped_after_scaling() {
    let train = df!["Annual_Income" => [100.0, 200.0, 300.0, 400.0]].unwrap();
    let config = PipelineConfig::builder()
        .schema(income_only_schema())
        .build()
        .unwrap();
    let fitted = PreprocessingPipeline::new(config)
        .unwrap()
        .fit(&train)
        .unwrap();

    let request = df!["Annual_Income" => [50.0]].unwrap();
    let batch = fitted
        .transform(&request, &mut StdRng::seed_from_u64(0))
        .unwrap();
    // 50 is inside the clip bounds but below the fitted minimum
    assert!(batch.features.row(0)[0] < 0.0);
}

// ============================================================================
// Encoding Determinism
// ============================================================================

#[test]
fn test_low_cardinality_codes_deterministic() {
    let df = credit_frame(20);
    let fitted = fit_credit(&df);

    let mask = df.column("Credit_Mix").unwrap().is_not_null();
    let complete = df.filter(&mask).unwrap();

    let a = fitted
        .transform(&complete, &mut StdRng::seed_from_u64(1))
        .unwrap();
    let b = fitted
        .transform(&complete, &mut StdRng::seed_from_u64(999))
        .unwrap();

    for name in ["Credit_Mix", "Payment_of_Min_Amount"] {
        let j = a.features.position(name).unwrap();
        assert_eq!(a.features.column(j), b.features.column(j));
    }
}

#[test]
fn test_high_cardinality_non_null_cells_stable() {
    let df = credit_frame(25);
    let fitted = fit_credit(&df);

    let a = fitted
        .transform(&df, &mut StdRng::seed_from_u64(10))
        .unwrap();
    let b = fitted
        .transform(&df, &mut StdRng::seed_from_u64(20))
        .unwrap();

    let occupation = df.column("Occupation").unwrap().str().unwrap();
    let j = a.features.position("Occupation").unwrap();
    let (ca, cb) = (a.features.column(j), b.features.column(j));
    for (i, raw) in occupation.into_iter().enumerate() {
        if raw.is_some() {
            assert_eq!(ca[i], cb[i], "row {} changed between calls", i);
        }
    }
}

#[test]
fn test_same_seed_same_output() {
    let df = credit_frame(25);
    let fitted = fit_credit(&df);
    let a = fitted
        .transform(&df, &mut StdRng::seed_from_u64(7))
        .unwrap();
    let b = fitted
        .transform(&df, &mut StdRng::seed_from_u64(7))
        .unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Error Conditions
// ============================================================================

#[test]
fn test_missing_required_column() {
    let df = credit_frame(10).drop("Credit_Mix").unwrap();
    let err = PreprocessingPipeline::new(PipelineConfig::default())
        .unwrap()
        .fit(&df)
        .unwrap_err();
    assert!(matches!(err, PreprocessingError::ColumnNotFound(ref c) if c == "Credit_Mix"));
}

#[test]
fn test_reject_policy_on_unseen_category() {
    let train = credit_frame(10);
    let config = PipelineConfig::builder()
        .unseen_category(UnseenCategoryPolicy::Reject)
        .build()
        .unwrap();
    let fitted = PreprocessingPipeline::new(config)
        .unwrap()
        .fit(&train)
        .unwrap();

    let mut request = credit_frame(3);
    request
        .with_column(Series::new(
            "Payment_of_Min_Amount".into(),
            ["Yes", "Maybe", "No"],
        ))
        .unwrap();

    let err = fitted
        .transform(&request, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSEEN_CATEGORY");
}

// ============================================================================
// Persistence and IO
// ============================================================================

#[test]
fn test_saved_state_transforms_identically() {
    let df = credit_frame(18);
    let fitted = fit_credit(&df);

    let path = std::env::temp_dir().join(format!(
        "credit_pipeline_it_{}.json",
        std::process::id()
    ));
    fitted.save(&path).unwrap();
    let loaded = FittedPipeline::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let a = fitted
        .transform(&df, &mut StdRng::seed_from_u64(5))
        .unwrap();
    let b = loaded
        .transform(&df, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_fit_from_csv_bytes() {
    let mut df = credit_frame(15);
    let path = std::env::temp_dir().join(format!("credit_frame_it_{}.csv", std::process::id()));
    io::write_csv(&mut df, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let parsed = io::read_csv_bytes(&bytes).unwrap();
    assert_eq!(parsed.height(), 15);

    let fitted = fit_credit(&parsed);
    let batch = fitted
        .transform(&parsed, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(batch.features.n_cols(), 20);
}
