//! The merged per-company-per-year dataset.
//!
//! [`merge`] inner-joins financials, observations and the company registry on
//! `cvr` and zero-fills every numeric column, so screening and comparison code
//! can treat arithmetic on the result as total. Companies missing from any of
//! the three relations are dropped by the joins; [`MergeStats`] reports them.

use crate::{
    AnalysisError, Result,
    loader::Relations,
    schema::{CVR, YEAR},
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// A set of company identifiers.
pub type CompanySet = BTreeSet<String>;

/// Canonical analysis dataset: one row per joined (company, year) record.
///
/// Immutable once built. Narrowing produces a new dataset.
#[derive(Debug, Clone)]
pub struct MergedDataset {
    frame: DataFrame,
}

impl MergedDataset {
    /// Wrap an already joined frame, coercing `cvr` to strings and zero-filling.
    pub fn new(frame: DataFrame) -> Result<Self> {
        if frame.get_column_index(CVR).is_none() {
            return Err(AnalysisError::unavailable(
                "dataset",
                format!("missing identifier column '{CVR}'"),
            ));
        }
        let frame = frame
            .lazy()
            .with_column(col(CVR).cast(DataType::String))
            .collect()?;
        Ok(Self {
            frame: zero_fill(frame)?,
        })
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Lazy view for query building.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Whether a column is present.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Distinct company identifiers.
    pub fn company_ids(&self) -> Result<CompanySet> {
        company_ids(&self.frame)
    }

    /// Rows whose company identifier is in `ids`.
    pub fn apply_filter(&self, ids: &CompanySet) -> Result<Self> {
        let frame = self.filter_by(|id| ids.contains(id))?;
        Ok(Self { frame })
    }

    /// All rows of one company; empty when the company is absent.
    pub fn company_slice(&self, id: &str) -> Result<DataFrame> {
        self.filter_by(|candidate| candidate == id)
    }

    fn filter_by(&self, keep: impl Fn(&str) -> bool) -> Result<DataFrame> {
        let ids = self.frame.column(CVR)?.str()?;
        let mask: BooleanChunked = ids.into_iter().map(|id| id.is_some_and(&keep)).collect();
        Ok(self.frame.filter(&mask)?)
    }
}

/// Row counts around a merge and the companies the inner joins dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Rows in the financials relation
    pub financials_rows: usize,
    /// Rows in the observations relation
    pub observations_rows: usize,
    /// Rows in the company registry
    pub company_rows: usize,
    /// Rows in the merged dataset
    pub merged_rows: usize,
    /// Companies present in some relation but absent from the merge, sorted
    pub dropped_companies: Vec<String>,
}

impl MergeStats {
    /// Compare the inputs of a merge with its output.
    pub fn of(relations: &Relations, merged: &MergedDataset) -> Result<Self> {
        let kept = merged.company_ids()?;
        let mut seen = company_ids(&relations.financials)?;
        seen.extend(company_ids(&relations.observations)?);
        seen.extend(company_ids(&relations.company)?);

        Ok(Self {
            financials_rows: relations.financials.height(),
            observations_rows: relations.observations.height(),
            company_rows: relations.company.height(),
            merged_rows: merged.height(),
            dropped_companies: seen.difference(&kept).cloned().collect(),
        })
    }
}

/// Join the three relations into the canonical dataset.
///
/// Financials join observations on `cvr`, or on (`cvr`, `year`) when both carry
/// a year; the result joins the registry on `cvr`. All joins are inner.
pub fn merge(relations: &Relations) -> Result<MergedDataset> {
    let has_year = |frame: &DataFrame| frame.get_column_index(YEAR).is_some();
    let observation_keys = if has_year(&relations.financials) && has_year(&relations.observations) {
        vec![col(CVR), col(YEAR)]
    } else {
        vec![col(CVR)]
    };

    let frame = relations
        .financials
        .clone()
        .lazy()
        .join(
            relations.observations.clone().lazy(),
            observation_keys.clone(),
            observation_keys,
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            relations.company.clone().lazy(),
            [col(CVR)],
            [col(CVR)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let merged = MergedDataset {
        frame: zero_fill(frame)?,
    };

    let stats = MergeStats::of(relations, &merged)?;
    info!(
        rows = stats.merged_rows,
        companies = merged.company_ids()?.len(),
        "merged base relations"
    );
    if !stats.dropped_companies.is_empty() {
        warn!(
            dropped = stats.dropped_companies.len(),
            "companies missing from at least one relation were dropped by the merge"
        );
    }
    Ok(merged)
}

/// Narrow a dataset to the given companies.
pub fn apply_filter(ids: &CompanySet, dataset: &MergedDataset) -> Result<MergedDataset> {
    dataset.apply_filter(ids)
}

/// Replace nulls with zero-like values: 0 for numbers (NaN included), "0" for
/// strings, false for booleans. Dates are left untouched.
fn zero_fill(frame: DataFrame) -> Result<DataFrame> {
    let exprs: Vec<Expr> = frame
        .get_columns()
        .iter()
        .filter_map(|column| {
            let dtype = column.dtype().clone();
            let expr = col(column.name().clone());
            if dtype.is_float() {
                Some(expr.fill_nan(lit(0.0)).fill_null(lit(0.0)).cast(dtype))
            } else if dtype.is_integer() {
                Some(expr.fill_null(lit(0)).cast(dtype))
            } else {
                match dtype {
                    DataType::String => Some(expr.fill_null(lit("0"))),
                    DataType::Boolean => Some(expr.fill_null(lit(false))),
                    _ => None,
                }
            }
        })
        .collect();

    Ok(frame.lazy().with_columns(exprs).collect()?)
}

pub(crate) fn company_ids(frame: &DataFrame) -> Result<CompanySet> {
    Ok(frame
        .column(CVR)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_owned)
        .collect())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::schema::{CURRENT_RATIO, PROFIT_LOSS, REVENUE};

    fn relations() -> Relations {
        Relations::from_frames(
            df![
                "cvr" => [1i64, 1, 2, 3],
                "year" => [2020i64, 2021, 2021, 2021],
                "profit_loss" => [Some(10.0), None, Some(-3.0), Some(1.0)],
                "revenue" => [Some(100.0), Some(f64::NAN), None, Some(5.0)]
            ]
            .unwrap(),
            df![
                "cvr" => ["1", "1", "2"],
                "year" => [2020i64, 2021, 2021],
                "current_ratio" => [Some(1.5), None, Some(0.8)],
                "industry_code" => [Some("4711"), Some("4711"), None]
            ]
            .unwrap(),
            df![
                "cvr_number" => [1i64, 2, 4],
                "name" => ["One", "Two", "Four"]
            ]
            .unwrap(),
        )
        .unwrap()
    }

    fn keys(dataset: &MergedDataset) -> Vec<(String, i32)> {
        let frame = dataset.frame();
        let cvr = frame.column(CVR).unwrap().str().unwrap();
        let year = frame.column(YEAR).unwrap().i32().unwrap();
        let mut keys: Vec<_> = cvr
            .into_iter()
            .zip(year)
            .map(|(c, y)| (c.unwrap().to_string(), y.unwrap()))
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_merge_is_deterministic() {
        let relations = relations();
        let first = merge(&relations).unwrap();
        let second = merge(&relations).unwrap();

        assert_eq!(keys(&first), keys(&second));
        assert_eq!(
            keys(&first),
            vec![
                ("1".to_string(), 2020),
                ("1".to_string(), 2021),
                ("2".to_string(), 2021)
            ]
        );
    }

    #[test]
    fn test_merge_zero_fills_numeric_columns() {
        let merged = merge(&relations()).unwrap();

        for name in [PROFIT_LOSS, REVENUE, CURRENT_RATIO] {
            let values = merged.frame().column(name).unwrap().f64().unwrap();
            assert_eq!(values.null_count(), 0, "{name} has nulls");
            assert!(values.into_iter().flatten().all(|v| !v.is_nan()));
        }
        let industry = merged.frame().column("industry_code").unwrap().str().unwrap();
        assert_eq!(industry.null_count(), 0);
    }

    #[test]
    fn test_merge_reports_dropped_companies() {
        let relations = relations();
        let merged = merge(&relations).unwrap();
        let stats = MergeStats::of(&relations, &merged).unwrap();

        assert_eq!(stats.financials_rows, 4);
        assert_eq!(stats.merged_rows, 3);
        assert_eq!(stats.dropped_companies, vec!["3".to_string(), "4".to_string()]);
    }

    #[test]
    fn test_merge_without_observation_year_joins_on_cvr() {
        let merged = merged(
            df![
                "cvr" => ["7", "7"],
                "year" => [2020i64, 2021],
                "profit_loss" => [1.0, 2.0]
            ]
            .unwrap(),
            df![
                "cvr" => ["7"],
                "return_on_assets" => [0.1]
            ]
            .unwrap(),
            registry(&["7"]),
        );

        assert_eq!(merged.height(), 2);
        assert_eq!(merged.frame().column(YEAR).unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn test_apply_filter_keeps_only_selected() {
        let merged = merge(&relations()).unwrap();
        let ids: CompanySet = ["2".to_string(), "99".to_string()].into();

        let narrowed = apply_filter(&ids, &merged).unwrap();
        assert_eq!(narrowed.height(), 1);
        assert_eq!(narrowed.company_ids().unwrap(), ["2".to_string()].into());

        let nothing = apply_filter(&CompanySet::new(), &merged).unwrap();
        assert!(nothing.is_empty());
    }

    #[test]
    fn test_company_slice_absent_company() {
        let merged = merge(&relations()).unwrap();
        assert_eq!(merged.company_slice("1").unwrap().height(), 2);
        assert_eq!(merged.company_slice("404").unwrap().height(), 0);
    }

    #[test]
    fn test_dataset_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MergedDataset>();
    }
}
