//! Monthly commodity price dashboard.
//!
//! The pipeline is `load -> derive_calendar_fields -> filter -> aggregate`:
//! a [`loader::PriceDataLoader`] produces an immutable [`model::Dataset`],
//! [`analysis`] turns a [`model::FilterCriteria`] into a filtered view with
//! yearly and monthly aggregates, and [`dashboard`] shapes those into the
//! tables, chart series and insight sentence shown to the user.

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod model;
pub mod utils;

pub use config::{Cli, OutputFormat};
pub use dashboard::{build_view, CriteriaChanged, DashboardConfig, DashboardView, Session};
pub use error::{DashboardError, Result};
pub use loader::{shared_dataset, CsvPriceLoader, PriceDataLoader};
pub use model::{
    Dataset, FilterCriteria, FilteredView, MonthlyAggregate, Price, PriceRecord, YearlyAggregate,
};
