//! Low leverage criterion.

use super::traits::{ConfigurableCriterion, Criterion, CriterionKind};
use crate::{
    CompanySet, MergedDataset, Result,
    merge::company_ids,
    schema::{CVR, DEBT_OBLIGATIONS, EQUITY},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the low-debt criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowDebtConfig {
    /// Exclusive upper bound on debt-to-equity (default: 0.4)
    pub max_debt_to_equity: f64,
}

impl Default for LowDebtConfig {
    fn default() -> Self {
        Self {
            max_debt_to_equity: 0.4,
        }
    }
}

/// Companies with a low debt-to-equity ratio in at least one row.
///
/// ```text
/// Debt-to-Equity = Debt Obligations / Equity
/// ```
///
/// Zero equity yields an infinite or NaN ratio, which never qualifies unless
/// the debt is negative.
#[derive(Debug, Clone, Default)]
pub struct LowDebt {
    config: LowDebtConfig,
}

impl Criterion for LowDebt {
    fn kind(&self) -> CriterionKind {
        CriterionKind::LowDebt
    }

    fn description(&self) -> &str {
        "Low debt - debt obligations divided by equity below the threshold in any year"
    }

    fn required_columns(&self) -> &[&str] {
        &[CVR, DEBT_OBLIGATIONS, EQUITY]
    }

    fn evaluate_raw(&self, data: &MergedDataset) -> Result<CompanySet> {
        let qualifying = data
            .lazy()
            .with_column(
                (col(DEBT_OBLIGATIONS).cast(DataType::Float64)
                    / col(EQUITY).cast(DataType::Float64))
                .alias("debt_to_equity"),
            )
            .filter(col("debt_to_equity").lt(lit(self.config.max_debt_to_equity)))
            .select([col(CVR)])
            .collect()?;

        company_ids(&qualifying)
    }
}

impl ConfigurableCriterion for LowDebt {
    type Config = LowDebtConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
