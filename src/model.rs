use std::collections::HashSet;

use chrono::{Datelike, Month, NaiveDate};
use derive_more::Deref;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

pub type Price = f64;

pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// One row of the input file. `date` is always the first day of its month.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub price: Price,
}

impl PriceRecord {
    /// Parses a strict `YYYY-MM` date. `row` is only used for the error.
    pub fn parse_date(text: &str, row: usize) -> Result<NaiveDate> {
        let text = text.trim();
        let parse_error = || DashboardError::ParseError {
            row,
            value: text.to_owned(),
        };

        // %Y alone takes a sign or any number of digits
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        let well_formed = match text.split_once('-') {
            Some((year, month)) => {
                year.len() == 4 && (1..=2).contains(&month.len()) && digits(year) && digits(month)
            }
            None => false,
        };
        if !well_formed {
            return Err(parse_error());
        }

        NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").map_err(|_| parse_error())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CalendarRecord {
    pub date: NaiveDate,
    pub price: Price,
    pub year: i32,
    pub month: Month,
}

impl CalendarRecord {
    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    /// `YYYY-MM`, the way the date is shown to the user.
    pub fn year_month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

impl From<PriceRecord> for CalendarRecord {
    fn from(record: PriceRecord) -> Self {
        Self {
            date: record.date,
            price: record.price,
            year: record.date.year(),
            month: MONTHS[record.date.month0() as usize],
        }
    }
}

/// The loaded price history. Never mutated after construction.
#[derive(Default, Debug, Clone, Deref)]
pub struct Dataset {
    records: Vec<CalendarRecord>,
}

impl Dataset {
    pub fn records(&self) -> &[CalendarRecord] {
        &self.records
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.records.iter().map(|r| r.year).minmax().into_option()
    }

    /// Distinct months in order of first appearance.
    pub fn months_present(&self) -> Vec<Month> {
        self.records.iter().map(|r| r.month).unique().collect()
    }
}

/// Augments every record with its year and month.
pub fn derive_calendar_fields(records: Vec<PriceRecord>) -> Dataset {
    Dataset {
        records: records.into_iter().map(CalendarRecord::from).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    year_min: i32,
    year_max: i32,
    months: HashSet<Month>,
}

impl FilterCriteria {
    pub fn new(
        year_min: i32,
        year_max: i32,
        months: impl IntoIterator<Item = Month>,
    ) -> Result<Self> {
        if year_min > year_max {
            return Err(DashboardError::InvalidCriteria { year_min, year_max });
        }

        Ok(Self {
            year_min,
            year_max,
            months: months.into_iter().collect(),
        })
    }

    /// Full year range and every month present. An empty dataset gets
    /// `0..=0` with no months, which matches nothing.
    pub fn full_range(dataset: &Dataset) -> Self {
        let (year_min, year_max) = dataset.year_bounds().unwrap_or((0, 0));

        Self {
            year_min,
            year_max,
            months: dataset.months_present().into_iter().collect(),
        }
    }

    pub fn with_years(mut self, year_min: i32, year_max: i32) -> Result<Self> {
        if year_min > year_max {
            return Err(DashboardError::InvalidCriteria { year_min, year_max });
        }

        self.year_min = year_min;
        self.year_max = year_max;
        Ok(self)
    }

    pub fn with_months(mut self, months: impl IntoIterator<Item = Month>) -> Self {
        self.months = months.into_iter().collect();
        self
    }

    pub fn year_min(&self) -> i32 {
        self.year_min
    }

    pub fn year_max(&self) -> i32 {
        self.year_max
    }

    pub fn months(&self) -> &HashSet<Month> {
        &self.months
    }

    pub fn matches(&self, record: &CalendarRecord) -> bool {
        (self.year_min..=self.year_max).contains(&record.year)
            && self.months.contains(&record.month)
    }
}

/// Records of a [`Dataset`] that passed a [`FilterCriteria`], in dataset order.
#[derive(Default, Debug, Clone, Deref)]
pub struct FilteredView<'a> {
    records: Vec<&'a CalendarRecord>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(records: Vec<&'a CalendarRecord>) -> Self {
        Self { records }
    }

    pub fn prices(&self) -> impl Iterator<Item = Price> + '_ {
        self.records.iter().map(|r| r.price)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub mean_price: Price,
    pub min_price: Price,
    pub max_price: Price,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MonthlyAggregate {
    pub month: Month,
    pub mean_price: Price,
}

/// Parses a month name the way the CLI accepts it (`"march"`, `"Mar"`).
pub fn parse_month(name: &str) -> Result<Month> {
    name.trim()
        .parse::<Month>()
        .map_err(|_| DashboardError::InvalidMonth(name.to_owned()))
}
