//! Imputation module for handling missing values.
//!
//! Provides median/mode imputation with fitted statistics and
//! distribution-preserving imputation by weighted sampling.

pub mod distribution;
pub mod statistical;

pub use distribution::CategoryDistribution;
pub use statistical::StatisticalImputer;
