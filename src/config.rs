use std::path::PathBuf;

use chrono::Month;
use clap::{Parser, ValueEnum};

use crate::{
    dashboard::DashboardConfig,
    error::Result,
    loader::CsvPriceLoader,
    model::{parse_month, Dataset, FilterCriteria},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Monthly commodity price dashboard")]
pub struct Cli {
    /// Monthly price CSV
    #[arg(long, default_value = "monthly.csv")]
    pub data: PathBuf,

    #[arg(long, default_value = "Date")]
    pub date_column: String,

    #[arg(long, default_value = "Price")]
    pub price_column: String,

    /// First year shown (defaults to the earliest year in the data)
    #[arg(long)]
    pub from: Option<i32>,

    /// Last year shown (defaults to the latest year in the data)
    #[arg(long)]
    pub to: Option<i32>,

    /// Comma separated month names, e.g. `January,Feb,march`
    #[arg(long, value_delimiter = ',')]
    pub months: Vec<String>,

    #[arg(long, default_value = "Gold")]
    pub commodity: String,

    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Footnote naming where the prices come from
    #[arg(long)]
    pub source_note: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn loader(&self) -> CsvPriceLoader {
        CsvPriceLoader::new(&self.data).with_columns(&self.date_column, &self.price_column)
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        let defaults = DashboardConfig::default();

        DashboardConfig {
            commodity: self.commodity.clone(),
            currency: self.currency.clone(),
            source_note: self.source_note.clone().unwrap_or(defaults.source_note),
        }
    }

    /// The dashboard defaults, narrowed by whatever was given on the command line.
    pub fn criteria(&self, dataset: &Dataset) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::full_range(dataset);

        if self.from.is_some() || self.to.is_some() {
            let from = self.from.unwrap_or(criteria.year_min());
            let to = self.to.unwrap_or(criteria.year_max());
            criteria = criteria.with_years(from, to)?;
        }

        if !self.months.is_empty() {
            let months = self
                .months
                .iter()
                .map(|m| parse_month(m))
                .collect::<Result<Vec<Month>>>()?;
            criteria = criteria.with_months(months);
        }

        Ok(criteria)
    }
}
