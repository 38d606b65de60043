//! Liquidity and solvency ratios over time.
//!
//! Each ratio is computed once per company as a date-indexed series. The
//! presentation layer picks a shape: one panel per company
//! ([`RatioComparison::side_by_side`]) or both companies on one chart
//! ([`RatioComparison::combined`]).

use super::{CompanyPair, CompanySeries, DatePoint, dated_series};
use crate::{
    MergedDataset, Result,
    schema::{CURRENT_RATIO, SOLVENCY_RATIO},
};
use chrono::NaiveDate;
use derive_more::Display;
use serde::Serialize;

/// Solvency ratio below which a company cannot cover its obligations.
pub const SOLVENCY_THRESHOLD: f64 = 1.0;

/// Ratios with a time-series comparison.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// Current assets over current liabilities
    #[display("current_ratio")]
    Current,
    /// Solvency ratio
    #[display("solvency_ratio")]
    Solvency,
}

impl Ratio {
    /// Column holding the ratio.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Current => CURRENT_RATIO,
            Self::Solvency => SOLVENCY_RATIO,
        }
    }

    /// Fixed reference line drawn with the ratio, if any.
    pub const fn reference_line(self) -> Option<f64> {
        match self {
            Self::Current => None,
            Self::Solvency => Some(SOLVENCY_THRESHOLD),
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Current => "Current Ratio Comparison",
            Self::Solvency => "Solvency Ratio Comparison",
        }
    }
}

/// One point of the combined view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPoint {
    /// Company the point belongs to
    pub cvr: String,
    /// Publication date
    pub date: NaiveDate,
    /// Ratio value
    pub value: f64,
}

/// A ratio over time for two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioComparison {
    /// Compared ratio
    pub ratio: Ratio,
    /// Chart title
    pub title: String,
    /// Annotation value, not computed data
    pub reference_line: Option<f64>,
    /// One series per company, in the order requested
    pub series: [CompanySeries<DatePoint>; 2],
}

impl RatioComparison {
    /// One series per company, for separate panels.
    pub const fn side_by_side(&self) -> &[CompanySeries<DatePoint>; 2] {
        &self.series
    }

    /// Both companies' points on one axis, ordered by date then company order.
    pub fn combined(&self) -> Vec<CombinedPoint> {
        let mut points: Vec<_> = self
            .series
            .iter()
            .enumerate()
            .flat_map(|(rank, series)| {
                series.points.iter().map(move |p| {
                    (
                        rank,
                        CombinedPoint {
                            cvr: series.cvr.clone(),
                            date: p.date,
                            value: p.value,
                        },
                    )
                })
            })
            .collect();
        points.sort_by(|(ra, a), (rb, b)| a.date.cmp(&b.date).then(ra.cmp(rb)));
        points.into_iter().map(|(_, point)| point).collect()
    }
}

fn compare_ratio<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
    ratio: Ratio,
) -> Result<RatioComparison> {
    let pair = CompanyPair::try_new(cvrs)?;
    let series = pair.try_map(|cvr| dated_series(data.company_slice(cvr)?, cvr, ratio.column()))?;

    Ok(RatioComparison {
        ratio,
        title: ratio.title().to_string(),
        reference_line: ratio.reference_line(),
        series,
    })
}

/// Current ratio over time for two companies.
pub fn compare_current_ratio<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
) -> Result<RatioComparison> {
    compare_ratio(data, cvrs, Ratio::Current)
}

/// Solvency ratio over time for two companies, with the 1.0 threshold line.
pub fn compare_solvency_ratio<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
) -> Result<RatioComparison> {
    compare_ratio(data, cvrs, Ratio::Solvency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use crate::comparison::fixtures::dataset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_ratio_series() {
        let result = compare_current_ratio(&dataset(), &["X", "Y"]).unwrap();
        let [x, y] = result.side_by_side();

        assert_eq!(result.reference_line, None);
        let x_points: Vec<_> = x.points.iter().map(|p| (p.date, p.value)).collect();
        assert_eq!(
            x_points,
            vec![
                (date(2020, 3, 31), 1.2),
                (date(2021, 3, 31), 1.4),
                (date(2022, 3, 31), 1.1)
            ]
        );
        // The 2021 row of Y has no parsable publication date
        assert_eq!(y.points.len(), 2);
    }

    #[test]
    fn test_solvency_reference_line() {
        let result = compare_solvency_ratio(&dataset(), &["X", "Y"]).unwrap();

        assert_eq!(result.ratio, Ratio::Solvency);
        assert_eq!(result.reference_line, Some(1.0));
        assert_eq!(result.title, "Solvency Ratio Comparison");
    }

    #[test]
    fn test_combined_view_interleaves_by_date() {
        let result = compare_solvency_ratio(&dataset(), &["X", "Y"]).unwrap();
        let combined = result.combined();

        let order: Vec<_> = combined.iter().map(|p| (p.cvr.as_str(), p.date)).collect();
        assert_eq!(
            order,
            vec![
                ("X", date(2020, 3, 31)),
                ("Y", date(2020, 6, 30)),
                ("X", date(2021, 3, 31)),
                ("Y", date(2021, 6, 30)),
                ("X", date(2022, 3, 31)),
            ]
        );
        let total: usize = result.side_by_side().iter().map(|s| s.points.len()).sum();
        assert_eq!(combined.len(), total);
    }

    #[test]
    fn test_ratio_with_absent_company() {
        let result = compare_current_ratio(&dataset(), &["ghost", "Y"]).unwrap();
        assert!(result.series[0].is_empty());
        assert!(!result.series[1].is_empty());
    }

    #[test]
    fn test_ratio_arity() {
        let err = compare_solvency_ratio(&dataset(), &["X", "Y", "Z"]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidComparisonArity(3)));
    }
}
