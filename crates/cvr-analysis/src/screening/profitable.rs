//! Sustained profitability criterion.

use super::traits::{ConfigurableCriterion, Criterion, CriterionKind};
use crate::{
    CompanySet, MergedDataset, Result,
    merge::company_ids,
    schema::{CVR, PROFIT_LOSS, YEAR},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the profitability criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitableConfig {
    /// Minimum number of profitable years, inclusive (default: 5)
    pub min_profitable_years: u32,
}

impl Default for ProfitableConfig {
    fn default() -> Self {
        Self {
            min_profitable_years: 5,
        }
    }
}

/// Companies with profit in at least `min_profitable_years` distinct years.
///
/// A year counts when any of the company's rows for it has
/// `profit_loss > 0`, so duplicate rows per year are counted once.
#[derive(Debug, Clone, Default)]
pub struct Profitable {
    config: ProfitableConfig,
}

impl Criterion for Profitable {
    fn kind(&self) -> CriterionKind {
        CriterionKind::Profitable
    }

    fn description(&self) -> &str {
        "Profitable - positive profit/loss in at least the configured number of years"
    }

    fn required_columns(&self) -> &[&str] {
        &[CVR, YEAR, PROFIT_LOSS]
    }

    fn evaluate_raw(&self, data: &MergedDataset) -> Result<CompanySet> {
        let qualifying = data
            .lazy()
            .group_by([col(CVR), col(YEAR)])
            .agg([col(PROFIT_LOSS).gt(lit(0.0)).sum().alias("profitable_rows")])
            .filter(col("profitable_rows").gt(lit(0)))
            .group_by([col(CVR)])
            .agg([len().alias("profitable_years")])
            .filter(col("profitable_years").gt_eq(lit(self.config.min_profitable_years)))
            .select([col(CVR)])
            .collect()?;

        company_ids(&qualifying)
    }
}

impl ConfigurableCriterion for Profitable {
    type Config = ProfitableConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
