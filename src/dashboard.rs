use chrono::Month;
use itertools::Itertools;
use log::{debug, warn};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::{
    analysis::{filter, monthly_aggregates, overall_mean, yearly_aggregates},
    error::Result,
    model::{Dataset, FilterCriteria, Price},
};

/// Above this many labels a chart axis only shows every other one.
pub const MAX_DENSE_TICKS: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub commodity: String,
    pub currency: String,
    pub source_note: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            commodity: "Gold".to_owned(),
            currency: "USD".to_owned(),
            source_note: "Data on gold prices is sourced from the World Bank Commodities Market \
                          (https://www.worldbank.org/en/research/commodity-markets)."
                .to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct PriceRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Price")]
    pub price: Price,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Month")]
    pub month: String,
}

/// Yearly statistics as displayed, prices with two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct YearlyStatsRow {
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Mean Price")]
    pub mean_price: String,
    #[tabled(rename = "Min Price")]
    pub min_price: String,
    #[tabled(rename = "Max Price")]
    pub max_price: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
    /// Axis labels to draw, possibly thinned out.
    pub ticks: Vec<String>,
}

impl ChartSeries {
    fn new(
        kind: ChartKind,
        title: String,
        x_label: &str,
        y_label: String,
        points: Vec<ChartPoint>,
    ) -> Self {
        let labels = points.iter().map(|p| p.label.clone()).collect_vec();

        Self {
            kind,
            title,
            x_label: x_label.to_owned(),
            y_label,
            ticks: labels,
            points,
        }
    }

    fn with_thinned_ticks(mut self) -> Self {
        self.ticks = thin_ticks(&self.ticks);
        self
    }

    fn render_text(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record([self.x_label.clone(), self.y_label.clone()]);
        for point in &self.points {
            builder.push_record([point.label.clone(), format!("{:.2}", point.value)]);
        }

        let mut table = builder.build();
        table.with(Style::modern());
        table.to_string()
    }
}

/// Keeps every other label once there are more than [`MAX_DENSE_TICKS`].
pub fn thin_ticks(labels: &[String]) -> Vec<String> {
    if labels.len() > MAX_DENSE_TICKS {
        labels.iter().step_by(2).cloned().collect()
    } else {
        labels.to_vec()
    }
}

/// Everything the presentation layer draws for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub heading: String,
    pub records: Vec<PriceRow>,
    pub price_trend: ChartSeries,
    pub yearly_stats: Vec<YearlyStatsRow>,
    pub yearly_average: ChartSeries,
    pub monthly_average: ChartSeries,
    /// `None` when nothing matches the selection.
    pub insight: Option<String>,
    pub footnote: String,
}

pub fn build_view(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    config: &DashboardConfig,
) -> DashboardView {
    let (from, to) = (criteria.year_min(), criteria.year_max());
    let commodity = &config.commodity;
    let lowercase = commodity.to_lowercase();

    let view = filter(dataset.iter(), criteria);
    if view.is_empty() {
        let months = criteria.months().len();
        warn!("no {lowercase} prices match {from}..={to} with {months} month(s)");
    }

    let yearly = yearly_aggregates(&view);
    let monthly = monthly_aggregates(&view);

    let records = view
        .iter()
        .map(|r| PriceRow {
            date: r.year_month(),
            price: r.price,
            year: r.year.to_string(),
            month: r.month_name().to_owned(),
        })
        .collect_vec();

    let price_trend = ChartSeries::new(
        ChartKind::Line,
        format!("{commodity} Price Over Time ({from} to {to})"),
        "Date",
        format!("Price ({})", config.currency),
        view.iter()
            .map(|r| ChartPoint {
                label: r.year_month(),
                value: r.price,
            })
            .collect(),
    );

    let yearly_stats = yearly
        .iter()
        .map(|y| YearlyStatsRow {
            year: y.year.to_string(),
            mean_price: format!("{:.2}", y.mean_price),
            min_price: format!("{:.2}", y.min_price),
            max_price: format!("{:.2}", y.max_price),
        })
        .collect();

    let yearly_average = ChartSeries::new(
        ChartKind::Line,
        format!("Yearly Average {commodity} Price ({from} to {to})"),
        "Year",
        format!("Average Price ({})", config.currency),
        yearly
            .iter()
            .map(|y| ChartPoint {
                label: y.year.to_string(),
                value: y.mean_price,
            })
            .collect(),
    )
    .with_thinned_ticks();

    let monthly_average = ChartSeries::new(
        ChartKind::Bar,
        format!("Monthly Average {commodity} Price ({from} to {to})"),
        "Month",
        format!("Average Price ({})", config.currency),
        monthly
            .iter()
            .map(|m| ChartPoint {
                label: m.month.name().to_owned(),
                value: m.mean_price,
            })
            .collect(),
    );

    let insight = overall_mean(&view).map(|mean| {
        format!(
            "The average {lowercase} price from {from} to {to} \
             for the selected months is {mean:.2} {}.",
            config.currency
        )
    });

    DashboardView {
        title: format!("{commodity} Price Analysis"),
        heading: format!("{commodity} Prices from {from} to {to} for selected months"),
        records,
        price_trend,
        yearly_stats,
        yearly_average,
        monthly_average,
        insight,
        footnote: config.source_note.clone(),
    }
}

impl DashboardView {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut records = Table::new(&self.records);
        records.with(Style::modern());

        let mut yearly = Table::new(&self.yearly_stats);
        yearly.with(Style::modern());

        let insight = self
            .insight
            .as_deref()
            .unwrap_or("No records match the current selection.");

        [
            format!("# {}", self.title),
            format!("## {}\n{records}", self.heading),
            format!("## {}\n{}", self.price_trend.title, self.price_trend.render_text()),
            format!("## Yearly Statistics\n{yearly}"),
            format!("## {}\n{}", self.yearly_average.title, self.yearly_average.render_text()),
            format!("## {}\n{}", self.monthly_average.title, self.monthly_average.render_text()),
            format!("## Key Insights\n{insight}"),
            format!("Footnote: {}", self.footnote),
        ]
        .join("\n\n")
    }
}

/// A discrete change coming from one of the dashboard controls.
#[derive(Debug, Clone)]
pub enum CriteriaChanged {
    Years { from: i32, to: i32 },
    Months(Vec<Month>),
    Replace(FilterCriteria),
}

/// One user's selection over a shared, read-only dataset.
pub struct Session<'a> {
    dataset: &'a Dataset,
    config: DashboardConfig,
    criteria: FilterCriteria,
    view: DashboardView,
    revision: u64,
}

impl<'a> Session<'a> {
    /// Starts with the full year range and every month present.
    pub fn new(dataset: &'a Dataset, config: DashboardConfig) -> Self {
        Self::with_criteria(dataset, config, FilterCriteria::full_range(dataset))
    }

    /// Starts from an already chosen selection.
    pub fn with_criteria(
        dataset: &'a Dataset,
        config: DashboardConfig,
        criteria: FilterCriteria,
    ) -> Self {
        let view = build_view(dataset, &criteria, &config);

        Self {
            dataset,
            config,
            criteria,
            view,
            revision: 0,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Number of times the view was recomputed after creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies the change and recomputes the view. An invalid year range
    /// leaves the session untouched.
    pub fn handle(&mut self, event: CriteriaChanged) -> Result<&DashboardView> {
        let criteria = match event {
            CriteriaChanged::Years { from, to } => self.criteria.clone().with_years(from, to)?,
            CriteriaChanged::Months(months) => self.criteria.clone().with_months(months),
            CriteriaChanged::Replace(criteria) => criteria,
        };

        debug!(
            "criteria changed: {}..={} with {} month(s)",
            criteria.year_min(),
            criteria.year_max(),
            criteria.months().len()
        );

        self.view = build_view(self.dataset, &criteria, &self.config);
        self.criteria = criteria;
        self.revision += 1;

        Ok(&self.view)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;
    use itertools::Itertools;

    use super::{build_view, thin_ticks, ChartKind, CriteriaChanged, DashboardConfig, Session};
    use crate::{
        error::DashboardError,
        model::{derive_calendar_fields, Dataset, FilterCriteria, PriceRecord, MONTHS},
    };

    fn dataset(years: std::ops::RangeInclusive<i32>) -> Dataset {
        derive_calendar_fields(
            years
                .flat_map(|year| {
                    (1..=12).map(move |month| PriceRecord {
                        date: PriceRecord::parse_date(&format!("{year}-{month:02}"), 1).unwrap(),
                        price: (year - 2000) as f64 * 100.0 + month as f64,
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn unittest_thin_ticks() {
        let labels = |n: i32| (0..n).map(|i| (2000 + i).to_string()).collect_vec();

        assert_eq!(thin_ticks(&labels(10)), labels(10));
        assert_eq!(
            thin_ticks(&labels(11)),
            vec!["2000", "2002", "2004", "2006", "2008", "2010"]
        );
        assert!(thin_ticks(&[]).is_empty());
    }

    #[test]
    fn unittest_build_view() -> eyre::Result<()> {
        let data = dataset(2000..=2001);
        let criteria = FilterCriteria::new(2001, 2001, [Month::January, Month::February])?;
        let view = build_view(&data, &criteria, &DashboardConfig::default());

        assert_eq!(view.title, "Gold Price Analysis");
        assert_eq!(view.heading, "Gold Prices from 2001 to 2001 for selected months");

        assert_eq!(view.records.len(), 2);
        assert_eq!(view.records[0].date, "2001-01");
        assert_eq!(view.records[0].year, "2001");
        assert_eq!(view.records[0].month, "January");
        assert_eq!(view.records[1].price, 102.0);

        assert_eq!(view.price_trend.kind, ChartKind::Line);
        assert_eq!(view.price_trend.title, "Gold Price Over Time (2001 to 2001)");
        assert_eq!(view.price_trend.y_label, "Price (USD)");
        assert_eq!(view.price_trend.points.len(), 2);

        assert_eq!(view.yearly_stats.len(), 1);
        assert_eq!(view.yearly_stats[0].year, "2001");
        assert_eq!(view.yearly_stats[0].mean_price, "101.50");
        assert_eq!(view.yearly_stats[0].min_price, "101.00");
        assert_eq!(view.yearly_stats[0].max_price, "102.00");

        assert_eq!(view.monthly_average.kind, ChartKind::Bar);
        assert_eq!(
            view.monthly_average.ticks,
            vec!["February".to_owned(), "January".to_owned()]
        );

        assert_eq!(
            view.insight.as_deref(),
            Some("The average gold price from 2001 to 2001 for the selected months is 101.50 USD.")
        );

        Ok(())
    }

    #[test]
    fn unittest_build_view_thins_yearly_ticks() {
        let data = dataset(2000..=2011);
        let criteria = FilterCriteria::full_range(&data);
        let view = build_view(&data, &criteria, &DashboardConfig::default());

        assert_eq!(view.yearly_average.points.len(), 12);
        assert_eq!(view.yearly_average.ticks.len(), 6);
        assert_eq!(view.yearly_average.ticks[1], "2002");
        assert_eq!(view.price_trend.ticks.len(), 144);
    }

    #[test]
    fn unittest_empty_view_has_no_insight() -> eyre::Result<()> {
        let data = dataset(2000..=2001);
        let criteria = FilterCriteria::new(1990, 1995, MONTHS)?;
        let view = build_view(&data, &criteria, &DashboardConfig::default());

        assert!(view.records.is_empty());
        assert!(view.yearly_stats.is_empty());
        assert!(view.monthly_average.points.is_empty());
        assert_eq!(view.insight, None);
        assert!(view
            .render_text()
            .contains("No records match the current selection."));

        Ok(())
    }

    #[test]
    fn unittest_view_renders() -> eyre::Result<()> {
        let data = dataset(2000..=2000);
        let config = DashboardConfig {
            commodity: "Silver".to_owned(),
            currency: "EUR".to_owned(),
            source_note: "test data".to_owned(),
        };
        let view = build_view(&data, &FilterCriteria::full_range(&data), &config);

        let text = view.render_text();
        assert!(text.contains("# Silver Price Analysis"));
        assert!(text.contains("Mean Price"));
        assert!(text.contains("6.50"));
        assert!(text.contains("is 6.50 EUR."));
        assert!(text.contains("Footnote: test data"));

        let json: serde_json::Value = serde_json::from_str(&view.to_json()?)?;
        assert_eq!(json["records"].as_array().map(Vec::len), Some(12));
        assert_eq!(json["yearly_stats"][0]["mean_price"], "6.50");
        assert_eq!(json["monthly_average"]["kind"], "Bar");
        assert_eq!(
            json["insight"],
            "The average silver price from 2000 to 2000 for the selected months is 6.50 EUR."
        );

        Ok(())
    }

    #[test]
    fn unittest_session_recomputes_on_events() -> eyre::Result<()> {
        let data = dataset(2000..=2003);
        let mut session = Session::new(&data, DashboardConfig::default());

        assert_eq!(session.revision(), 0);
        assert_eq!(session.criteria().year_min(), 2000);
        assert_eq!(session.criteria().year_max(), 2003);
        assert_eq!(session.view().records.len(), 48);

        let view = session.handle(CriteriaChanged::Years { from: 2001, to: 2002 })?;
        assert_eq!(view.records.len(), 24);

        let view = session.handle(CriteriaChanged::Months(vec![Month::March]))?;
        assert_eq!(view.records.len(), 2);
        assert!(view.records.iter().all(|r| r.month == "March"));
        assert_eq!(session.revision(), 2);

        let view = session.handle(CriteriaChanged::Months(Vec::new()))?;
        assert!(view.records.is_empty());
        assert_eq!(view.insight, None);

        let replacement = FilterCriteria::new(2003, 2003, MONTHS)?;
        let view = session.handle(CriteriaChanged::Replace(replacement.clone()))?;
        assert_eq!(view.records.len(), 12);
        assert_eq!(session.criteria(), &replacement);
        assert_eq!(session.revision(), 4);

        Ok(())
    }

    #[test]
    fn unittest_session_with_criteria() -> eyre::Result<()> {
        let data = dataset(2000..=2003);
        let criteria = FilterCriteria::new(2002, 2003, [Month::June])?;
        let session = Session::with_criteria(&data, DashboardConfig::default(), criteria.clone());

        assert_eq!(session.revision(), 0);
        assert_eq!(session.criteria(), &criteria);
        assert_eq!(session.view().records.len(), 2);
        assert_eq!(session.view().heading, "Gold Prices from 2002 to 2003 for selected months");

        Ok(())
    }

    #[test]
    fn unittest_session_rejects_inverted_years() {
        let data = dataset(2000..=2003);
        let mut session = Session::new(&data, DashboardConfig::default());

        assert!(matches!(
            session.handle(CriteriaChanged::Years { from: 2003, to: 2001 }),
            Err(DashboardError::InvalidCriteria { .. })
        ));
        assert_eq!(session.revision(), 0);
        assert_eq!(session.criteria().year_min(), 2000);
        assert_eq!(session.view().records.len(), 48);
    }
}
