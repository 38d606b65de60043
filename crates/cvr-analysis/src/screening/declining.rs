//! Profit decline criterion.
//!
//! Each company's rows are ordered by publication date and treated as a list.
//! The window and the period before it are picked by list position counted
//! from the end, not by calendar duration.

use super::traits::{ConfigurableCriterion, Criterion, CriterionKind};
use crate::{
    CompanySet, MergedDataset, Result,
    schema::{CVR, PROFIT_LOSS, PUBLICATION_DATE},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the decline criterion.
///
/// Bounds are list-style indices; negative values count from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecliningConfig {
    /// Inclusive window start (default: -8)
    pub window_start: isize,
    /// Exclusive window end (default: -2)
    pub window_end: isize,
}

impl Default for DecliningConfig {
    fn default() -> Self {
        Self {
            window_start: -8,
            window_end: -2,
        }
    }
}

/// Companies that were profitable right before a loss-making window.
///
/// A company qualifies when it has at least `|window_start|` rows, the summed
/// `profit_loss` over the window is negative and the single row preceding the
/// window is positive.
#[derive(Debug, Clone, Default)]
pub struct Declining {
    config: DecliningConfig,
}

impl Declining {
    /// Whether one company's chronologically ordered profits show a decline.
    pub fn is_declining(&self, history: &[f64]) -> bool {
        let DecliningConfig {
            window_start,
            window_end,
        } = self.config;
        if history.len() < window_start.unsigned_abs() {
            return false;
        }

        let window: f64 = slice(history, window_start, window_end).iter().sum();
        let before: f64 = slice(history, window_start - 1, window_start).iter().sum();
        window < 0.0 && before > 0.0
    }
}

impl Criterion for Declining {
    fn kind(&self) -> CriterionKind {
        CriterionKind::Declining
    }

    fn description(&self) -> &str {
        "Declining - net loss over the recent window after a profitable period"
    }

    fn required_columns(&self) -> &[&str] {
        &[CVR, PUBLICATION_DATE, PROFIT_LOSS]
    }

    fn evaluate_raw(&self, data: &MergedDataset) -> Result<CompanySet> {
        let sorted = data
            .lazy()
            .select([col(CVR), col(PUBLICATION_DATE), col(PROFIT_LOSS)])
            .sort(
                [CVR, PUBLICATION_DATE],
                SortMultipleOptions::default()
                    .with_maintain_order(true)
                    .with_nulls_last(true),
            )
            .collect()?;

        let ids = sorted.column(CVR)?.str()?;
        let profits = sorted.column(PROFIT_LOSS)?.f64()?;
        let rows: Vec<(Option<&str>, f64)> = ids
            .into_iter()
            .zip(profits)
            .map(|(id, profit)| (id, profit.unwrap_or(0.0)))
            .collect();

        let mut declining = CompanySet::new();
        for group in rows.chunk_by(|a, b| a.0 == b.0) {
            let Some(id) = group[0].0 else { continue };
            let history: Vec<f64> = group.iter().map(|(_, profit)| *profit).collect();
            if self.is_declining(&history) {
                declining.insert(id.to_string());
            }
        }
        Ok(declining)
    }
}

impl ConfigurableCriterion for Declining {
    type Config = DecliningConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

/// List slice `values[start..end]` with negative indices counted from the end
/// and out-of-range bounds clamped, yielding an empty slice when crossed.
fn slice(values: &[f64], start: isize, end: isize) -> &[f64] {
    let resolve = |index: isize| {
        if index < 0 {
            values.len().saturating_sub(index.unsigned_abs())
        } else {
            index.unsigned_abs().min(values.len())
        }
    };
    let (lo, hi) = (resolve(start), resolve(end));
    if lo < hi { &values[lo..hi] } else { &[] }
}
