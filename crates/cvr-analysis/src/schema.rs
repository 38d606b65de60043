//! Relation and column names shared by the loader, merger and query layers.

/// Financial statements relation.
pub const FINANCIALS: &str = "financials";
/// Per-year observations relation (derived ratios).
pub const OBSERVATIONS: &str = "observations";
/// Company registry relation.
pub const COMPANY: &str = "company";

/// Canonical company identifier column.
pub const CVR: &str = "cvr";
/// Identifier column as named in the company registry.
pub const CVR_NUMBER: &str = "cvr_number";
/// Reporting year.
pub const YEAR: &str = "year";
/// Publication date of the annual report.
pub const PUBLICATION_DATE: &str = "publication_date";

/// Net profit or loss for the year.
pub const PROFIT_LOSS: &str = "profit_loss";
/// Revenue for the year.
pub const REVENUE: &str = "revenue";
/// Debt obligations at year end.
pub const DEBT_OBLIGATIONS: &str = "debt_obligations";
/// Equity at year end.
pub const EQUITY: &str = "equity";
/// External expenses for the year.
pub const EXTERNAL_EXPENSES: &str = "external_expenses";
/// Number of employees.
pub const EMPLOYEE_COUNT: &str = "employee_count";

/// Return on assets.
pub const RETURN_ON_ASSETS: &str = "return_on_assets";
/// Current assets over current liabilities.
pub const CURRENT_RATIO: &str = "current_ratio";
/// Solvency ratio.
pub const SOLVENCY_RATIO: &str = "solvency_ratio";
/// Industry classification code.
pub const INDUSTRY_CODE: &str = "industry_code";

/// Monetary and ratio fields normalized to `Float64` wherever they appear.
pub const NUMERIC_FIELDS: [&str; 9] = [
    PROFIT_LOSS,
    REVENUE,
    DEBT_OBLIGATIONS,
    EQUITY,
    EXTERNAL_EXPENSES,
    EMPLOYEE_COUNT,
    RETURN_ON_ASSETS,
    CURRENT_RATIO,
    SOLVENCY_RATIO,
];
