use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::{debug, info};

use crate::{
    error::{DashboardError, Result},
    model::{derive_calendar_fields, Dataset, Price, PriceRecord},
};

pub trait PriceDataLoader {
    fn load(&self) -> Result<Dataset>;
}

/// Loads a `Date,Price` style CSV. Column names are configurable.
#[derive(Debug, Clone)]
pub struct CsvPriceLoader {
    pub path: PathBuf,
    pub date_column: String,
    pub price_column: String,
}

impl CsvPriceLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            date_column: "Date".to_owned(),
            price_column: "Price".to_owned(),
        }
    }

    pub fn with_columns(
        mut self,
        date_column: impl Into<String>,
        price_column: impl Into<String>,
    ) -> Self {
        self.date_column = date_column.into();
        self.price_column = price_column.into();
        self
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DashboardError::MissingColumn(name.to_owned()))
        };
        let date_position = position(&self.date_column)?;
        let price_position = position(&self.price_column)?;

        let mut records = Vec::new();

        for (ix, row) in reader.records().enumerate() {
            let row = row?;
            let line = ix + 1;

            let date = row.get(date_position).unwrap_or_default();
            let price = row.get(price_position).unwrap_or_default();

            records.push(PriceRecord {
                date: PriceRecord::parse_date(date, line)?,
                price: parse_price(price, line)?,
            });
        }

        let dataset = derive_calendar_fields(records);

        match dataset.year_bounds() {
            Some((from, to)) => info!("loaded {} price records ({from}..={to})", dataset.len()),
            None => info!("loaded an empty price history"),
        }

        Ok(dataset)
    }
}

/// An empty cell is a missing price (NaN), skipped by the aggregates.
fn parse_price(text: &str, row: usize) -> Result<Price> {
    if text.is_empty() {
        return Ok(Price::NAN);
    }

    text.parse::<Price>().map_err(|_| DashboardError::InvalidPrice {
        row,
        value: text.to_owned(),
    })
}

impl PriceDataLoader for CsvPriceLoader {
    fn load(&self) -> Result<Dataset> {
        debug!("reading prices from {}", self.path.display());
        self.load_from_reader(File::open(&self.path)?)
    }
}

/// Holds a dataset after its first successful load.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceLock<Dataset>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }

    /// A failed load leaves the cache empty.
    pub fn get_or_load(&self, loader: &impl PriceDataLoader) -> Result<&Dataset> {
        if let Some(dataset) = self.cell.get() {
            debug!("using cached price history");
            return Ok(dataset);
        }

        let dataset = loader.load()?;
        Ok(self.cell.get_or_init(|| dataset))
    }

    pub fn get(&self) -> Option<&Dataset> {
        self.cell.get()
    }
}

static SHARED: DatasetCache = DatasetCache::new();

/// Process-wide dataset, read-only and shared by every session.
pub fn shared_dataset(loader: &impl PriceDataLoader) -> Result<&'static Dataset> {
    SHARED.get_or_load(loader)
}
