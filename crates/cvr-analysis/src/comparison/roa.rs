//! Return on assets against the industry benchmark.
//!
//! The benchmark is the mean `return_on_assets` over every row of the dataset
//! passed in that shares the company's `industry_code`, so a screened dataset
//! yields a benchmark over the screened companies only.

use super::{CompanyPair, YearPoint, by_year, float_values, year_values};
use crate::{
    MergedDataset, Result,
    schema::{INDUSTRY_CODE, RETURN_ON_ASSETS},
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// ROA of one company next to its industry average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoaSeries {
    /// Company identifier
    pub cvr: String,
    /// Industry code from the company's first row; `None` without rows
    pub industry_code: Option<String>,
    /// Mean ROA of the industry; `None` without rows
    pub industry_average: Option<f64>,
    /// Company ROA per year
    pub yearly: Vec<YearPoint>,
}

/// ROA comparison for two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoaComparison {
    /// Chart title
    pub title: String,
    /// One entry per company, in the order requested
    pub companies: [RoaSeries; 2],
}

/// Compare each company's yearly ROA with its industry average.
pub fn compare_roa<S: AsRef<str>>(data: &MergedDataset, cvrs: &[S]) -> Result<RoaComparison> {
    let pair = CompanyPair::try_new(cvrs)?;
    let averages = industry_averages(data)?;

    let companies = pair.try_map(|cvr| {
        let slice = data.company_slice(cvr)?;
        let industry_code = first_industry_code(&slice)?;
        let industry_average = industry_code
            .as_ref()
            .and_then(|code| averages.get(code).copied());

        let grouped = by_year(slice, &[RETURN_ON_ASSETS])?;
        let yearly = year_values(&grouped)?
            .into_iter()
            .zip(float_values(&grouped, RETURN_ON_ASSETS)?)
            .map(|(year, value)| YearPoint { year, value })
            .collect();

        Ok(RoaSeries {
            cvr: cvr.to_string(),
            industry_code,
            industry_average,
            yearly,
        })
    })?;

    Ok(RoaComparison {
        title: "Return on Assets Comparison".to_string(),
        companies,
    })
}

/// Mean ROA per industry code over the whole dataset.
pub fn industry_averages(data: &MergedDataset) -> Result<HashMap<String, f64>> {
    let grouped = data
        .lazy()
        .group_by([col(INDUSTRY_CODE).cast(DataType::String)])
        .agg([col(RETURN_ON_ASSETS).cast(DataType::Float64).mean()])
        .collect()?;

    let codes = grouped.column(INDUSTRY_CODE)?.str()?;
    let means = grouped.column(RETURN_ON_ASSETS)?.f64()?;
    Ok(codes
        .into_iter()
        .zip(means)
        .filter_map(|(code, mean)| Some((code?.to_string(), mean?)))
        .collect())
}

fn first_industry_code(slice: &DataFrame) -> Result<Option<String>> {
    if slice.is_empty() {
        return Ok(None);
    }
    let codes = slice.column(INDUSTRY_CODE)?.cast(&DataType::String)?;
    Ok(codes.str()?.get(0).map(str::to_string))
}
