//! Core trait definitions for screening criteria.
//!
//! All criteria implement [`Criterion`], which evaluates a merged dataset to
//! the set of companies satisfying it.

use crate::{AnalysisError, CompanySet, MergedDataset, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The screening criteria a caller can select.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    /// Debt-to-equity below a threshold in at least one year
    #[display("low_debt")]
    LowDebt,
    /// Profitable period followed by a loss-making window
    #[display("declining")]
    Declining,
    /// Profit in at least a minimum number of years
    #[display("profitable")]
    Profitable,
}

impl CriterionKind {
    /// Every criterion, in a stable order.
    pub const ALL: [Self; 3] = [Self::LowDebt, Self::Declining, Self::Profitable];

    /// Stable snake_case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LowDebt => "low_debt",
            Self::Declining => "declining",
            Self::Profitable => "profitable",
        }
    }
}

impl FromStr for CriterionKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| AnalysisError::UnknownCriterion(s.to_string()))
    }
}

/// A named boolean predicate over each company's multi-year history.
pub trait Criterion: Send + Sync + std::fmt::Debug {
    /// Which criterion this is.
    fn kind(&self) -> CriterionKind;

    /// Human-readable description of what qualifies a company.
    fn description(&self) -> &str;

    /// Columns the dataset must carry for evaluation.
    fn required_columns(&self) -> &[&str];

    /// Compute the qualifying companies, assuming the required columns exist.
    fn evaluate_raw(&self, data: &MergedDataset) -> Result<CompanySet>;

    /// Compute the qualifying companies.
    ///
    /// Fails with [`AnalysisError::MissingColumns`] when the dataset lacks any
    /// required column; that failure concerns this criterion only.
    fn evaluate(&self, data: &MergedDataset) -> Result<CompanySet> {
        let missing: Vec<String> = self
            .required_columns()
            .iter()
            .filter(|name| !data.has_column(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MissingColumns {
                criterion: self.kind().to_string(),
                columns: missing,
            });
        }
        self.evaluate_raw(data)
    }
}

/// A criterion that supports runtime configuration.
pub trait ConfigurableCriterion: Criterion {
    /// Configuration type for this criterion.
    type Config: Default + Clone + Send + Sync + std::fmt::Debug;

    /// Create a criterion with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("low_debt", CriterionKind::LowDebt)]
    #[case("declining", CriterionKind::Declining)]
    #[case(" profitable ", CriterionKind::Profitable)]
    fn test_parse_criterion(#[case] raw: &str, #[case] expected: CriterionKind) {
        assert_eq!(raw.parse::<CriterionKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_criterion() {
        let err = "cheap".parse::<CriterionKind>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownCriterion(name) if name == "cheap"));
    }

    #[test]
    fn test_display_matches_name() {
        for kind in CriterionKind::ALL {
            assert_eq!(kind.to_string(), kind.name());
        }
    }
}
