//! Pairwise company comparisons - chart-ready series for exactly two CVRs
//!
//! Every operation validates its identifiers through [`CompanyPair`] before
//! touching the data. A company with no rows in the dataset gets an empty
//! series rather than an error. Rows that share an x value (duplicates from
//! the merge) are averaged, and points are ordered by x.

pub mod employees;
pub mod ratios;
pub mod revenue;
pub mod roa;
pub mod trend;

pub use employees::{EmployeeComparison, EmployeeTotal, compare_total_employee_count};
pub use ratios::{
    CombinedPoint, Ratio, RatioComparison, SOLVENCY_THRESHOLD, compare_current_ratio,
    compare_solvency_ratio,
};
pub use revenue::{
    RevenueProfitComparison, RevenuePoint, RevenueProfitSeries, compare_revenue_profit_loss,
};
pub use roa::{RoaComparison, RoaSeries, compare_roa};
pub use trend::{Metric, TrendComparison, compare_company_metric, compare_companies_profit};

use crate::{
    AnalysisError, Result, dates,
    schema::{PUBLICATION_DATE, YEAR},
};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

/// Exactly two company identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyPair {
    first: String,
    second: String,
}

impl CompanyPair {
    /// Validate a list of identifiers.
    ///
    /// Fails with [`AnalysisError::InvalidComparisonArity`] unless exactly two
    /// are given.
    pub fn try_new<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        match ids {
            [first, second] => Ok(Self {
                first: first.as_ref().to_string(),
                second: second.as_ref().to_string(),
            }),
            _ => Err(AnalysisError::InvalidComparisonArity(ids.len())),
        }
    }

    /// The two identifiers, in the order given.
    pub fn ids(&self) -> [&str; 2] {
        [&self.first, &self.second]
    }

    /// Apply `f` to each identifier in order.
    pub(crate) fn try_map<T>(&self, mut f: impl FnMut(&str) -> Result<T>) -> Result<[T; 2]> {
        Ok([f(&self.first)?, f(&self.second)?])
    }
}

/// One value for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    /// Reporting year
    pub year: i32,
    /// Mean value over the company's rows for the year
    pub value: f64,
}

/// One value at one publication date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatePoint {
    /// Publication date
    pub date: NaiveDate,
    /// Mean value over the company's rows for the date
    pub value: f64,
}

/// A series of points for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySeries<P> {
    /// Company identifier
    pub cvr: String,
    /// Points ordered by x
    pub points: Vec<P>,
}

impl<P> CompanySeries<P> {
    /// Whether the company had no rows.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Mean of `values` per year, ordered by year.
pub(crate) fn by_year(slice: DataFrame, values: &[&str]) -> Result<DataFrame> {
    Ok(slice
        .lazy()
        .group_by([col(YEAR).cast(DataType::Int32)])
        .agg(mean_of(values))
        .sort([YEAR], SortMultipleOptions::default())
        .collect()?)
}

/// Mean of `values` per publication date, ordered by date.
///
/// Rows without a parsed publication date are left out.
pub(crate) fn by_date(slice: DataFrame, values: &[&str]) -> Result<DataFrame> {
    Ok(slice
        .lazy()
        .filter(col(PUBLICATION_DATE).is_not_null())
        .group_by([col(PUBLICATION_DATE)])
        .agg(mean_of(values))
        .sort([PUBLICATION_DATE], SortMultipleOptions::default())
        .with_column(col(PUBLICATION_DATE).cast(DataType::Int32))
        .collect()?)
}

fn mean_of(values: &[&str]) -> Vec<Expr> {
    values
        .iter()
        .map(|&name| col(name).cast(DataType::Float64).mean())
        .collect()
}

/// Values of a float column; nulls (from an all-null group) read as zero.
pub(crate) fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(frame
        .column(name)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

pub(crate) fn year_values(frame: &DataFrame) -> Result<Vec<i32>> {
    Ok(frame.column(YEAR)?.i32()?.into_iter().flatten().collect())
}

/// Dates of a frame produced by [`by_date`].
pub(crate) fn date_values(frame: &DataFrame) -> Result<Vec<NaiveDate>> {
    Ok(frame
        .column(PUBLICATION_DATE)?
        .i32()?
        .into_iter()
        .flatten()
        .filter_map(dates::from_epoch_days)
        .collect())
}

/// Yearly series of one column for one company.
pub(crate) fn yearly_series(
    slice: DataFrame,
    cvr: &str,
    value: &str,
) -> Result<CompanySeries<YearPoint>> {
    let grouped = by_year(slice, &[value])?;
    let points = year_values(&grouped)?
        .into_iter()
        .zip(float_values(&grouped, value)?)
        .map(|(year, value)| YearPoint { year, value })
        .collect();
    Ok(CompanySeries {
        cvr: cvr.to_string(),
        points,
    })
}

/// Date-indexed series of one column for one company.
pub(crate) fn dated_series(
    slice: DataFrame,
    cvr: &str,
    value: &str,
) -> Result<CompanySeries<DatePoint>> {
    let grouped = by_date(slice, &[value])?;
    let points = date_values(&grouped)?
        .into_iter()
        .zip(float_values(&grouped, value)?)
        .map(|(date, value)| DatePoint { date, value })
        .collect();
    Ok(CompanySeries {
        cvr: cvr.to_string(),
        points,
    })
}
