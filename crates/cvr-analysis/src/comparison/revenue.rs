//! Revenue against profit/loss, for correlation viewing.

use super::{CompanyPair, by_date, date_values, float_values};
use crate::{
    MergedDataset, Result,
    schema::{PROFIT_LOSS, REVENUE},
};
use chrono::NaiveDate;
use serde::Serialize;

/// Revenue and profit/loss at one publication date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenuePoint {
    /// Publication date
    pub date: NaiveDate,
    /// Revenue
    pub revenue: f64,
    /// Profit or loss
    pub profit_loss: f64,
}

/// Parallel revenue and profit/loss series for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueProfitSeries {
    /// Company identifier
    pub cvr: String,
    /// Points ordered by date
    pub points: Vec<RevenuePoint>,
}

/// Revenue vs. profit/loss for two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueProfitComparison {
    /// Chart title
    pub title: String,
    /// One entry per company, in the order requested
    pub companies: [RevenueProfitSeries; 2],
}

/// Revenue and profit/loss over time for two companies.
pub fn compare_revenue_profit_loss<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
) -> Result<RevenueProfitComparison> {
    let pair = CompanyPair::try_new(cvrs)?;

    let companies = pair.try_map(|cvr| {
        let grouped = by_date(data.company_slice(cvr)?, &[REVENUE, PROFIT_LOSS])?;
        let points = date_values(&grouped)?
            .into_iter()
            .zip(float_values(&grouped, REVENUE)?)
            .zip(float_values(&grouped, PROFIT_LOSS)?)
            .map(|((date, revenue), profit_loss)| RevenuePoint {
                date,
                revenue,
                profit_loss,
            })
            .collect();
        Ok(RevenueProfitSeries {
            cvr: cvr.to_string(),
            points,
        })
    })?;

    Ok(RevenueProfitComparison {
        title: "Comparison of Revenue vs. Profit/Loss".to_string(),
        companies,
    })
}
