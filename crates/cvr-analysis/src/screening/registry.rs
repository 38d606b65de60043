//! Criterion registry and screening composition.
//!
//! The registry maps each [`CriterionKind`] to its predicate. Screening
//! evaluates every selected criterion against the same dataset and folds the
//! results with set intersection, so a criterion never sees another one's
//! filtered output.

use super::{
    declining::{Declining, DecliningConfig},
    low_debt::{LowDebt, LowDebtConfig},
    profitable::{Profitable, ProfitableConfig},
    traits::{ConfigurableCriterion, Criterion, CriterionKind},
};
use crate::{AnalysisError, CompanySet, MergedDataset, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for all built-in criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Profitability criterion settings
    pub profitable: ProfitableConfig,
    /// Decline criterion settings
    pub declining: DecliningConfig,
    /// Low-debt criterion settings
    pub low_debt: LowDebtConfig,
}

impl ScreeningConfig {
    /// Parse a configuration from JSON; absent sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Metadata for criterion introspection.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionInfo {
    /// Criterion name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Required input columns
    pub required_columns: Vec<String>,
}

/// Registry for criterion discovery and screening.
#[derive(Debug, Default)]
pub struct CriterionRegistry {
    criteria: HashMap<CriterionKind, Arc<dyn Criterion>>,
}

impl CriterionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            criteria: HashMap::new(),
        }
    }

    /// Register the built-in criteria with default settings.
    pub fn with_defaults() -> Self {
        Self::from_config(&ScreeningConfig::default())
    }

    /// Register the built-in criteria with the given settings.
    pub fn from_config(config: &ScreeningConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LowDebt::with_config(config.low_debt)));
        registry.register(Arc::new(Declining::with_config(config.declining)));
        registry.register(Arc::new(Profitable::with_config(config.profitable)));
        registry
    }

    /// Register a criterion, replacing any previous one of the same kind.
    pub fn register(&mut self, criterion: Arc<dyn Criterion>) {
        self.criteria.insert(criterion.kind(), criterion);
    }

    /// Get a criterion by kind.
    pub fn get(&self, kind: CriterionKind) -> Option<&dyn Criterion> {
        self.criteria.get(&kind).map(|c| c.as_ref())
    }

    /// All criterion metadata, ordered by kind.
    pub fn all_info(&self) -> Vec<CriterionInfo> {
        let mut info: Vec<_> = self
            .criteria
            .values()
            .map(|c| CriterionInfo {
                name: c.kind().to_string(),
                description: c.description().to_string(),
                required_columns: c.required_columns().iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        info.sort_by(|a, b| a.name.cmp(&b.name));
        info
    }

    /// Number of registered criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Screen a dataset with the selected criteria.
    ///
    /// Names are order-independent and duplicates collapse. An empty selection
    /// yields [`ScreeningOutcome::NoSelection`]. Unknown names fail before any
    /// evaluation. A criterion lacking its columns is recorded as failed in the
    /// report while the others are still evaluated.
    pub fn analyze<I, S>(&self, data: &MergedDataset, criteria: I) -> Result<ScreeningOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = criteria
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<BTreeSet<CriterionKind>>>()?;
        if selected.is_empty() {
            return Ok(ScreeningOutcome::NoSelection);
        }

        let mut results = Vec::with_capacity(selected.len());
        for kind in selected {
            let criterion = self
                .get(kind)
                .ok_or_else(|| AnalysisError::UnknownCriterion(kind.to_string()))?;
            let outcome = match criterion.evaluate(data) {
                Ok(companies) => {
                    debug!(criterion = %kind, qualifying = companies.len(), "evaluated criterion");
                    Ok(companies)
                }
                Err(err @ AnalysisError::MissingColumns { .. }) => {
                    warn!(criterion = %kind, error = %err, "criterion could not be evaluated");
                    Err(err)
                }
                Err(err) => return Err(err),
            };
            results.push(CriterionResult {
                criterion: kind,
                outcome,
            });
        }

        Ok(ScreeningOutcome::Screened(ScreeningReport::new(results)))
    }
}

/// Screen a dataset with the built-in criteria at default settings.
pub fn analyze<I, S>(data: &MergedDataset, criteria: I) -> Result<ScreeningOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CriterionRegistry::with_defaults().analyze(data, criteria)
}

/// Result of one criterion within a screening.
#[derive(Debug)]
pub struct CriterionResult {
    /// Which criterion was evaluated
    pub criterion: CriterionKind,
    /// Qualifying companies, or why the criterion could not be evaluated
    pub outcome: Result<CompanySet>,
}

/// Per-criterion results and their intersection.
#[derive(Debug)]
pub struct ScreeningReport {
    results: Vec<CriterionResult>,
    companies: Option<CompanySet>,
}

impl ScreeningReport {
    fn new(results: Vec<CriterionResult>) -> Self {
        let sets: Option<Vec<&CompanySet>> =
            results.iter().map(|r| r.outcome.as_ref().ok()).collect();

        let companies = sets.map(|sets| match sets.as_slice() {
            [single] => (*single).clone(),
            [first, rest @ ..] => rest.iter().fold((*first).clone(), |acc, set| {
                acc.intersection(set).cloned().collect()
            }),
            [] => CompanySet::new(),
        });

        Self { results, companies }
    }

    /// Companies satisfying every selected criterion.
    ///
    /// `None` when any selected criterion failed.
    pub const fn companies(&self) -> Option<&CompanySet> {
        self.companies.as_ref()
    }

    /// Per-criterion results, ordered by kind.
    pub fn results(&self) -> &[CriterionResult] {
        &self.results
    }

    /// Criteria that were evaluated successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = (CriterionKind, &CompanySet)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().map(|set| (r.criterion, set)))
    }

    /// Criteria that could not be evaluated.
    pub fn failures(&self) -> impl Iterator<Item = (CriterionKind, &AnalysisError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|err| (r.criterion, err)))
    }

    /// The intersection, or the first criterion failure.
    pub fn into_companies(self) -> Result<CompanySet> {
        if let Some(companies) = self.companies {
            return Ok(companies);
        }
        self.results
            .into_iter()
            .find_map(|r| r.outcome.err())
            .map_or_else(|| Ok(CompanySet::new()), Err)
    }
}

/// Outcome of a screening request.
#[derive(Debug)]
pub enum ScreeningOutcome {
    /// No criterion was selected
    NoSelection,
    /// At least one criterion was evaluated
    Screened(ScreeningReport),
}

impl ScreeningOutcome {
    /// Whether no criterion was selected.
    pub const fn is_no_selection(&self) -> bool {
        matches!(self, Self::NoSelection)
    }

    /// The report, when criteria were selected.
    pub const fn report(&self) -> Option<&ScreeningReport> {
        match self {
            Self::NoSelection => None,
            Self::Screened(report) => Some(report),
        }
    }

    /// Dataset to compare on: the full dataset without a selection, otherwise
    /// the rows of qualifying companies.
    pub fn narrow(self, data: &MergedDataset) -> Result<MergedDataset> {
        match self {
            Self::NoSelection => Ok(data.clone()),
            Self::Screened(report) => data.apply_filter(&report.into_companies()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::fixtures::{merged, registry};
    use crate::schema::CVR;
    use polars::prelude::*;

    /// Four companies over ten years.
    ///
    /// - `A`: profitable every year, low debt in one year
    /// - `B`: profitable 2012-2014, loss-making afterwards, low debt
    /// - `C`: profitable every year, never low debt
    /// - `D`: loss-making every year, high debt
    fn dataset() -> MergedDataset {
        let mut cvr = Vec::new();
        let mut year = Vec::new();
        let mut profit = Vec::new();
        let mut debt = Vec::new();
        let mut date = Vec::new();
        for (id, profits, debts) in [
            ("A", [10.0; 10], [50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 30.0]),
            (
                "B",
                [5.0, 5.0, 5.0, -5.0, -5.0, -5.0, -5.0, -5.0, -5.0, -5.0],
                [10.0; 10],
            ),
            ("C", [20.0; 10], [90.0; 10]),
            ("D", [-1.0; 10], [200.0; 10]),
        ] {
            for i in 0..10 {
                cvr.push(id);
                year.push(2012 + i as i64);
                profit.push(profits[i]);
                debt.push(debts[i]);
                date.push(format!("{}-05-31", 2013 + i));
            }
        }
        let equity = vec![100.0; cvr.len()];

        merged(
            df![
                "cvr" => cvr,
                "year" => year,
                "profit_loss" => profit,
                "debt_obligations" => debt,
                "equity" => equity,
                "publication_date" => date
            ]
            .unwrap(),
            df!["cvr" => ["A", "B", "C", "D"]].unwrap(),
            registry(&["A", "B", "C", "D"]),
        )
    }

    fn ids(names: &[&str]) -> CompanySet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn screened(data: &MergedDataset, criteria: &[&str]) -> CompanySet {
        analyze(data, criteria.iter().copied())
            .unwrap()
            .report()
            .and_then(ScreeningReport::companies)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_registry_defaults() {
        let registry = CriterionRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        for kind in CriterionKind::ALL {
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }

        let names: Vec<_> = registry.all_info().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["declining", "low_debt", "profitable"]);
    }

    #[test]
    fn test_single_criteria() {
        let data = dataset();
        assert_eq!(screened(&data, &["profitable"]), ids(&["A", "C"]));
        assert_eq!(screened(&data, &["low_debt"]), ids(&["A", "B"]));
        assert_eq!(screened(&data, &["declining"]), ids(&["B"]));
    }

    #[test]
    fn test_intersection_is_independent() {
        let data = dataset();
        let low_debt = screened(&data, &["low_debt"]);
        let profitable = screened(&data, &["profitable"]);
        let expected: CompanySet = low_debt.intersection(&profitable).cloned().collect();

        assert_eq!(screened(&data, &["low_debt", "profitable"]), expected);
        assert_eq!(screened(&data, &["profitable", "low_debt"]), expected);
        assert_eq!(expected, ids(&["A"]));
    }

    #[test]
    fn test_all_three_criteria() {
        let data = dataset();
        assert!(screened(&data, &["low_debt", "declining", "profitable"]).is_empty());
        assert_eq!(screened(&data, &["low_debt", "declining"]), ids(&["B"]));
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let data = dataset();
        let report = analyze(&data, ["profitable", "profitable"]).unwrap();
        assert_eq!(report.report().unwrap().results().len(), 1);
    }

    #[test]
    fn test_no_selection_is_not_empty_result() {
        let data = dataset();
        let outcome = analyze(&data, Vec::<String>::new()).unwrap();
        assert!(outcome.is_no_selection());
        assert_eq!(outcome.narrow(&data).unwrap().height(), data.height());

        let empty = analyze(&data, ["low_debt", "declining", "profitable"]).unwrap();
        assert!(!empty.is_no_selection());
        assert!(empty.narrow(&data).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_criterion_fails_fast() {
        let err = analyze(&dataset(), ["profitable", "cheap"]).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownCriterion(name) if name == "cheap"));
    }

    #[test]
    fn test_missing_columns_are_local() {
        let data = merged(
            df![
                "cvr" => vec!["A"; 5],
                "year" => [2016i64, 2017, 2018, 2019, 2020],
                "profit_loss" => [1.0; 5]
            ]
            .unwrap(),
            df!["cvr" => ["A"]].unwrap(),
            registry(&["A"]),
        );

        let outcome = analyze(&data, ["low_debt", "profitable"]).unwrap();
        let report = outcome.report().unwrap();

        assert!(report.companies().is_none());
        let succeeded: Vec<_> = report.succeeded().collect();
        assert_eq!(succeeded, vec![(CriterionKind::Profitable, &ids(&["A"]))]);
        let failed: Vec<_> = report.failures().map(|(kind, _)| kind).collect();
        assert_eq!(failed, vec![CriterionKind::LowDebt]);

        let err = outcome.narrow(&data).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumns { .. }));
    }

    #[test]
    fn test_filter_after_screening() {
        let data = dataset();
        let profitable = screened(&data, &["profitable"]);
        let narrowed = data.apply_filter(&profitable).unwrap();

        assert!(narrowed.height() <= data.height());
        assert_eq!(narrowed.height(), 20);
        let cvr = narrowed.frame().column(CVR).unwrap().str().unwrap();
        assert!(cvr.into_iter().flatten().all(|id| profitable.contains(id)));
    }

    #[test]
    fn test_config_overrides() {
        let config = ScreeningConfig::from_json(r#"{"profitable": {"min_profitable_years": 3}}"#)
            .unwrap();
        assert_eq!(config.profitable.min_profitable_years, 3);
        assert_eq!(config.declining, DecliningConfig::default());

        let registry = CriterionRegistry::from_config(&config);
        let outcome = registry.analyze(&dataset(), ["profitable"]).unwrap();
        let companies = outcome.report().unwrap().companies().unwrap();
        assert_eq!(companies, &ids(&["A", "B", "C"]));
    }

    #[test]
    fn test_invalid_config() {
        let err = ScreeningConfig::from_json("{\"low_debt\": 3}").unwrap_err();
        assert!(matches!(err, AnalysisError::Json(_)));
    }
}
