//! Yearly trend of a financial metric for two companies.

use super::{CompanyPair, CompanySeries, YearPoint, yearly_series};
use crate::{AnalysisError, MergedDataset, Result, schema};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Metrics that can be compared as a yearly trend.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Net profit or loss
    #[default]
    #[display("profit_loss")]
    ProfitLoss,
    /// Revenue
    #[display("revenue")]
    Revenue,
    /// External expenses
    #[display("external_expenses")]
    ExternalExpenses,
    /// Debt obligations
    #[display("debt_obligations")]
    DebtObligations,
    /// Equity
    #[display("equity")]
    Equity,
    /// Number of employees
    #[display("employee_count")]
    EmployeeCount,
    /// Return on assets
    #[display("return_on_assets")]
    ReturnOnAssets,
    /// Current ratio
    #[display("current_ratio")]
    CurrentRatio,
    /// Solvency ratio
    #[display("solvency_ratio")]
    SolvencyRatio,
}

impl Metric {
    /// Every allowed metric.
    pub const ALL: [Self; 9] = [
        Self::ProfitLoss,
        Self::Revenue,
        Self::ExternalExpenses,
        Self::DebtObligations,
        Self::Equity,
        Self::EmployeeCount,
        Self::ReturnOnAssets,
        Self::CurrentRatio,
        Self::SolvencyRatio,
    ];

    /// Column holding the metric.
    pub const fn column(self) -> &'static str {
        match self {
            Self::ProfitLoss => schema::PROFIT_LOSS,
            Self::Revenue => schema::REVENUE,
            Self::ExternalExpenses => schema::EXTERNAL_EXPENSES,
            Self::DebtObligations => schema::DEBT_OBLIGATIONS,
            Self::Equity => schema::EQUITY,
            Self::EmployeeCount => schema::EMPLOYEE_COUNT,
            Self::ReturnOnAssets => schema::RETURN_ON_ASSETS,
            Self::CurrentRatio => schema::CURRENT_RATIO,
            Self::SolvencyRatio => schema::SOLVENCY_RATIO,
        }
    }

    /// Label for chart titles and axes, e.g. "Profit/Loss".
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProfitLoss => "Profit/Loss",
            Self::Revenue => "Revenue",
            Self::ExternalExpenses => "External Expenses",
            Self::DebtObligations => "Debt Obligations",
            Self::Equity => "Equity",
            Self::EmployeeCount => "Employee Count",
            Self::ReturnOnAssets => "Return on Assets",
            Self::CurrentRatio => "Current Ratio",
            Self::SolvencyRatio => "Solvency Ratio",
        }
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.column() == s.trim())
            .ok_or_else(|| AnalysisError::UnknownMetric(s.to_string()))
    }
}

/// Yearly series of one metric for two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendComparison {
    /// Compared metric
    pub metric: Metric,
    /// Chart title
    pub title: String,
    /// One series per company, in the order requested
    pub series: [CompanySeries<YearPoint>; 2],
}

/// Yearly trend of `metric` for two companies.
pub fn compare_company_metric<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
    metric: Metric,
) -> Result<TrendComparison> {
    let pair = CompanyPair::try_new(cvrs)?;
    let series = pair.try_map(|cvr| yearly_series(data.company_slice(cvr)?, cvr, metric.column()))?;

    Ok(TrendComparison {
        metric,
        title: format!("{} Trend Comparison", metric.label()),
        series,
    })
}

/// Yearly profit/loss trend for two companies.
pub fn compare_companies_profit<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
) -> Result<TrendComparison> {
    compare_company_metric(data, cvrs, Metric::ProfitLoss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::fixtures::dataset;
    use rstest::rstest;

    #[test]
    fn test_default_metric_is_profit_loss() {
        assert_eq!(Metric::default(), Metric::ProfitLoss);
        assert_eq!(Metric::default().to_string(), "profit_loss");
    }

    #[rstest]
    #[case("revenue", Metric::Revenue)]
    #[case("external_expenses", Metric::ExternalExpenses)]
    #[case("profit_loss", Metric::ProfitLoss)]
    #[case("solvency_ratio", Metric::SolvencyRatio)]
    fn test_parse_metric(#[case] raw: &str, #[case] expected: Metric) {
        assert_eq!(raw.parse::<Metric>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ebitda")]
    #[case("Revenue")]
    fn test_unknown_metric(#[case] raw: &str) {
        assert!(matches!(raw.parse::<Metric>(), Err(AnalysisError::UnknownMetric(_))));
    }

    #[test]
    fn test_profit_trend() {
        let result = compare_companies_profit(&dataset(), &["X", "Y"]).unwrap();

        assert_eq!(result.title, "Profit/Loss Trend Comparison");
        assert_eq!(result.series[0].cvr, "X");
        let x: Vec<_> = result.series[0].points.iter().map(|p| (p.year, p.value)).collect();
        assert_eq!(x, vec![(2019, 5.0), (2020, 20.0), (2021, -4.0)]);
        assert_eq!(result.series[1].points.len(), 3);
    }

    #[test]
    fn test_metric_trend() {
        let result =
            compare_company_metric(&dataset(), &["Y", "X"], Metric::ExternalExpenses).unwrap();

        assert_eq!(result.series[0].cvr, "Y");
        let y: Vec<_> = result.series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(y, vec![20.0, 25.0, 30.0]);
    }

    #[rstest]
    #[case(&["X"])]
    #[case(&["X", "Y", "Z"])]
    fn test_trend_arity(#[case] cvrs: &[&str]) {
        let err = compare_companies_profit(&dataset(), cvrs).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidComparisonArity(_)));
    }

    #[test]
    fn test_trend_with_absent_company() {
        let data = dataset();
        let narrowed = data.apply_filter(&["X".to_string()].into()).unwrap();
        let result = compare_companies_profit(&narrowed, &["X", "Y"]).unwrap();

        assert!(!result.series[0].is_empty());
        assert!(result.series[1].is_empty());
    }
}
