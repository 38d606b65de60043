//! Total headcount of two companies.

use super::CompanyPair;
use crate::{
    MergedDataset, Result,
    schema::{EMPLOYEE_COUNT, YEAR},
};
use polars::prelude::*;
use serde::Serialize;

/// Summed employee count of one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeTotal {
    /// Company identifier
    pub cvr: String,
    /// Sum of `employee_count` over the company's rows
    pub total: f64,
    /// Number of rows summed; zero when the company is absent
    pub rows: usize,
}

/// Headcount comparison for two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeComparison {
    /// Chart title
    pub title: String,
    /// Year the totals are restricted to, if any
    pub year: Option<i32>,
    /// One total per company, in the order requested
    pub totals: [EmployeeTotal; 2],
}

/// Sum `employee_count` per company, optionally for a single year.
pub fn compare_total_employee_count<S: AsRef<str>>(
    data: &MergedDataset,
    cvrs: &[S],
    year: Option<i32>,
) -> Result<EmployeeComparison> {
    let pair = CompanyPair::try_new(cvrs)?;

    let totals = pair.try_map(|cvr| {
        let mut slice = data.company_slice(cvr)?.lazy();
        if let Some(year) = year {
            slice = slice.filter(col(YEAR).cast(DataType::Int32).eq(lit(year)));
        }
        let slice = slice.collect()?;

        let total = slice
            .column(EMPLOYEE_COUNT)?
            .cast(&DataType::Float64)?
            .f64()?
            .sum()
            .unwrap_or(0.0);
        Ok(EmployeeTotal {
            cvr: cvr.to_string(),
            total,
            rows: slice.height(),
        })
    })?;

    Ok(EmployeeComparison {
        title: "Total Employee Count Comparison".to_string(),
        year,
        totals,
    })
}
