//! CLI for the cvr-analysis screening and comparison engine.
//!
//! Loads an SQLite snapshot with `financials`, `observations` and `company`
//! tables, merges it, and prints screening results, comparison payloads or
//! data-quality reports as JSON. Rendering is left to whoever reads the output.

use clap::{Args, Parser, Subcommand, ValueEnum};
use cvr_analysis::{
    CompanySet, CriterionKind, CriterionRegistry, MergeStats, MergedDataset, Metric, Result,
    ScreeningConfig, ScreeningOutcome, SqliteSource, compare_companies_profit,
    compare_company_metric, compare_current_ratio, compare_revenue_profit_loss, compare_roa,
    compare_solvency_ratio, compare_total_employee_count, load, merge,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cvr-analysis")]
#[command(about = "Screen and compare companies from CVR financial data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// SQLite database with financials, observations and company tables
    #[arg(long, default_value = "cvr.db")]
    db: PathBuf,
    /// JSON file overriding screening thresholds
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available screening criteria
    Criteria,
    /// Screen companies with one or more criteria
    Screen {
        #[command(flatten)]
        data: DataArgs,
        /// Comma-separated criteria: low_debt, declining, profitable
        #[arg(long, value_delimiter = ',')]
        criteria: Vec<String>,
    },
    /// Compare exactly two companies
    Compare {
        #[command(flatten)]
        data: DataArgs,
        /// The two CVR numbers to compare
        cvrs: Vec<String>,
        /// Comparison to compute
        #[arg(long, value_enum)]
        chart: Chart,
        /// Metric for `--chart metric` (default: profit_loss)
        #[arg(long)]
        metric: Option<String>,
        /// Restrict `--chart employees` to one year
        #[arg(long)]
        year: Option<i32>,
        /// Screen the dataset before comparing
        #[arg(long, value_delimiter = ',')]
        criteria: Vec<String>,
    },
    /// Report missing values, cardinality and merge statistics
    Diagnostics {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Chart {
    Profit,
    Metric,
    Roa,
    CurrentRatio,
    SolvencyRatio,
    RevenueProfit,
    Employees,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(fatal = err.is_fatal(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Criteria => {
            list_criteria();
            Ok(())
        }
        Commands::Screen { data, criteria } => screen(&data, &criteria),
        Commands::Compare {
            data,
            cvrs,
            chart,
            metric,
            year,
            criteria,
        } => compare(&data, &cvrs, chart, metric.as_deref(), year, &criteria),
        Commands::Diagnostics { data } => diagnostics(&data),
    }
}

/// List registered criteria with their required columns.
fn list_criteria() {
    let registry = CriterionRegistry::with_defaults();
    println!("Available criteria ({} total)\n", registry.len());
    for info in registry.all_info() {
        println!("  {} - {}", info.name, info.description);
        println!("      requires: {}", info.required_columns.join(", "));
    }
}

fn screen(data: &DataArgs, criteria: &[String]) -> Result<()> {
    let registry = registry(data)?;
    let (_, dataset) = open(data)?;

    match registry.analyze(&dataset, criteria)? {
        ScreeningOutcome::NoSelection => print_json(&serde_json::json!({ "selection": "none" })),
        ScreeningOutcome::Screened(report) => {
            let view = ScreenView {
                companies: report.companies(),
                criteria: report
                    .results()
                    .iter()
                    .map(|result| CriterionView {
                        criterion: result.criterion,
                        companies: result.outcome.as_ref().ok(),
                        error: result.outcome.as_ref().err().map(ToString::to_string),
                    })
                    .collect(),
            };
            print_json(&view)
        }
    }
}

fn compare(
    data: &DataArgs,
    cvrs: &[String],
    chart: Chart,
    metric: Option<&str>,
    year: Option<i32>,
    criteria: &[String],
) -> Result<()> {
    let registry = registry(data)?;
    let (_, dataset) = open(data)?;
    let dataset = registry.analyze(&dataset, criteria)?.narrow(&dataset)?;

    match chart {
        Chart::Profit => print_json(&compare_companies_profit(&dataset, cvrs)?),
        Chart::Metric => {
            let metric = metric.map(str::parse::<Metric>).transpose()?.unwrap_or_default();
            print_json(&compare_company_metric(&dataset, cvrs, metric)?)
        }
        Chart::Roa => print_json(&compare_roa(&dataset, cvrs)?),
        Chart::CurrentRatio => print_json(&compare_current_ratio(&dataset, cvrs)?),
        Chart::SolvencyRatio => print_json(&compare_solvency_ratio(&dataset, cvrs)?),
        Chart::RevenueProfit => print_json(&compare_revenue_profit_loss(&dataset, cvrs)?),
        Chart::Employees => print_json(&compare_total_employee_count(&dataset, cvrs, year)?),
    }
}

fn diagnostics(data: &DataArgs) -> Result<()> {
    let (stats, dataset) = open(data)?;
    print_json(&serde_json::json!({
        "merge": stats,
        "missing": dataset.missing_data(),
        "uniques": dataset.unique_values()?,
    }))
}

fn registry(data: &DataArgs) -> Result<CriterionRegistry> {
    let config = match &data.config {
        Some(path) => ScreeningConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ScreeningConfig::default(),
    };
    Ok(CriterionRegistry::from_config(&config))
}

fn open(data: &DataArgs) -> Result<(MergeStats, MergedDataset)> {
    let relations = load(&SqliteSource::open(&data.db)?)?;
    let dataset = merge(&relations)?;
    let stats = MergeStats::of(&relations, &dataset)?;
    Ok((stats, dataset))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ScreenView<'a> {
    companies: Option<&'a CompanySet>,
    criteria: Vec<CriterionView<'a>>,
}

#[derive(Serialize)]
struct CriterionView<'a> {
    criterion: CriterionKind,
    companies: Option<&'a CompanySet>,
    error: Option<String>,
}
