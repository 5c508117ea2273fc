use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::{
    model::{CalendarRecord, FilterCriteria, FilteredView, MonthlyAggregate, Price, YearlyAggregate},
    utils::PriceStats,
};

/// Keeps the records matching `criteria`, in their original order.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a CalendarRecord>,
{
    FilteredView::new(records.into_iter().filter(|r| criteria.matches(r)).collect())
}

impl<'a> FilteredView<'a> {
    pub fn refine(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        filter(self.iter().copied(), criteria)
    }
}

/// One row per distinct year, ascending.
pub fn yearly_aggregates(view: &FilteredView) -> Vec<YearlyAggregate> {
    let mut groups: BTreeMap<i32, PriceStats> = BTreeMap::new();

    for record in view.iter() {
        groups.entry(record.year).or_default().feed(record.price);
    }

    groups
        .into_iter()
        .filter_map(|(year, stats)| {
            Some(YearlyAggregate {
                year,
                mean_price: stats.avg()?,
                min_price: stats.min()?,
                max_price: stats.max()?,
            })
        })
        .collect()
}

/// One row per distinct month, ordered by month *name*: April, August,
/// December, February, ...
pub fn monthly_aggregates(view: &FilteredView) -> Vec<MonthlyAggregate> {
    let mut groups: HashMap<_, PriceStats> = HashMap::new();

    for record in view.iter() {
        groups.entry(record.month).or_default().feed(record.price);
    }

    groups
        .into_iter()
        .filter_map(|(month, stats)| {
            Some(MonthlyAggregate {
                month,
                mean_price: stats.avg()?,
            })
        })
        .sorted_by_key(|m| m.month.name())
        .collect()
}

/// Mean over the whole view, `None` when it is empty.
pub fn overall_mean(view: &FilteredView) -> Option<Price> {
    view.prices().collect::<PriceStats>().avg()
}
