#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cvr-analysis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod comparison;
pub mod dates;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod merge;
pub mod schema;
pub mod screening;
pub mod source;

// Re-export core types
pub use comparison::{
    CompanyPair, CompanySeries, DatePoint, Metric, Ratio, YearPoint, compare_companies_profit,
    compare_company_metric, compare_current_ratio, compare_revenue_profit_loss, compare_roa,
    compare_solvency_ratio, compare_total_employee_count,
};
pub use diagnostics::{ColumnCardinality, MissingColumn, missing_data, unique_values};
pub use error::{AnalysisError, Result};
pub use loader::{Relations, load};
pub use merge::{CompanySet, MergeStats, MergedDataset, apply_filter, merge};
pub use screening::{
    Criterion, CriterionKind, CriterionRegistry, ScreeningConfig, ScreeningOutcome,
    ScreeningReport, analyze,
};
pub use source::{InMemorySource, RelationSource, SqliteSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
