//! Loading and normalization of the base relations.
//!
//! Join keys are coerced to strings on every side so that numeric and textual
//! CVRs meet in the merge, and publication dates are parsed into a polars
//! `Date` column.

use crate::{
    AnalysisError, Result, dates,
    schema::{
        COMPANY, CVR, CVR_NUMBER, FINANCIALS, INDUSTRY_CODE, NUMERIC_FIELDS, OBSERVATIONS,
        PUBLICATION_DATE, YEAR,
    },
    source::RelationSource,
};
use polars::prelude::*;
use tracing::info;

/// The three normalized base relations.
#[derive(Debug, Clone)]
pub struct Relations {
    /// Financial statements, one row per company and year
    pub financials: DataFrame,
    /// Derived ratios and industry codes
    pub observations: DataFrame,
    /// Company registry, keyed by `cvr` after normalization
    pub company: DataFrame,
}

impl Relations {
    /// Normalize three raw frames.
    ///
    /// The registry frame is expected to carry its identifier as `cvr_number`.
    pub fn from_frames(
        financials: DataFrame,
        observations: DataFrame,
        company: DataFrame,
    ) -> Result<Self> {
        Ok(Self {
            financials: normalize(financials, FINANCIALS, CVR)?,
            observations: normalize(observations, OBSERVATIONS, CVR)?,
            company: normalize(company, COMPANY, CVR_NUMBER)?,
        })
    }
}

/// Load and normalize `financials`, `observations` and `company` from a source.
///
/// Any missing relation fails the whole load with [`AnalysisError::DataUnavailable`].
pub fn load<S: RelationSource + ?Sized>(source: &S) -> Result<Relations> {
    let relations = Relations::from_frames(
        source.relation(FINANCIALS)?,
        source.relation(OBSERVATIONS)?,
        source.relation(COMPANY)?,
    )?;

    info!(
        financials = relations.financials.height(),
        observations = relations.observations.height(),
        company = relations.company.height(),
        "loaded base relations"
    );
    Ok(relations)
}

/// Coerce key, year, numeric and date columns of one relation.
fn normalize(mut frame: DataFrame, relation: &str, key: &str) -> Result<DataFrame> {
    if frame.get_column_index(key).is_none() {
        return Err(AnalysisError::unavailable(
            relation,
            format!("missing identifier column '{key}'"),
        ));
    }

    parse_publication_dates(&mut frame)?;

    let present = |name: &str| frame.get_column_index(name).is_some();
    let mut exprs = vec![col(key).cast(DataType::String).alias(CVR)];
    if present(YEAR) {
        exprs.push(col(YEAR).cast(DataType::Int32));
    }
    if present(INDUSTRY_CODE) {
        exprs.push(col(INDUSTRY_CODE).cast(DataType::String));
    }
    exprs.extend(
        NUMERIC_FIELDS
            .iter()
            .filter(|&&name| present(name))
            .map(|&name| col(name).cast(DataType::Float64)),
    );

    let mut lazy = frame.lazy().with_columns(exprs);
    if key != CVR {
        lazy = lazy.drop([key]);
    }
    Ok(lazy.collect()?)
}

/// Replace a textual `publication_date` column with parsed dates.
fn parse_publication_dates(frame: &mut DataFrame) -> Result<()> {
    let Ok(column) = frame.column(PUBLICATION_DATE) else {
        return Ok(());
    };
    if column.dtype() == &DataType::Date {
        return Ok(());
    }

    let text = column.cast(&DataType::String)?;
    let days: Vec<Option<i32>> = text
        .str()?
        .into_iter()
        .map(|raw| raw.and_then(dates::parse_mixed).map(dates::to_epoch_days))
        .collect();
    let parsed = Column::new(PUBLICATION_DATE.into(), days).cast(&DataType::Date)?;

    frame.with_column(parsed)?;
    Ok(())
}
