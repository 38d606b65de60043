//! Screening criteria - select companies by multi-year financial history
//!
//! Each criterion maps the merged dataset to a set of qualifying CVRs.
//! [`CriterionRegistry::analyze`] composes a selection of them by set
//! intersection.

pub mod declining;
pub mod low_debt;
pub mod profitable;
pub mod registry;
pub mod traits;

pub use declining::{Declining, DecliningConfig};
pub use low_debt::{LowDebt, LowDebtConfig};
pub use profitable::{Profitable, ProfitableConfig};
pub use registry::{
    CriterionInfo, CriterionRegistry, CriterionResult, ScreeningConfig, ScreeningOutcome,
    ScreeningReport, analyze,
};
pub use traits::{ConfigurableCriterion, Criterion, CriterionKind};
