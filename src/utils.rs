use crate::model::Price;

/// Running sum/count/min/max over a stream of prices. Missing prices (NaN)
/// are skipped by every statistic.
#[derive(Debug, Copy, Clone, Default)]
pub struct PriceStats {
    sum: Price,
    count: usize,
    min: Option<Price>,
    max: Option<Price>,
}

impl PriceStats {
    pub fn feed(&mut self, value: Price) {
        if value.is_nan() {
            return;
        }

        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one price was fed.
    pub fn avg(&self) -> Option<Price> {
        (self.count > 0).then(|| self.sum / self.count as Price)
    }

    pub fn min(&self) -> Option<Price> {
        self.min
    }

    pub fn max(&self) -> Option<Price> {
        self.max
    }
}

impl FromIterator<Price> for PriceStats {
    fn from_iter<T: IntoIterator<Item = Price>>(iter: T) -> Self {
        let mut stats = Self::default();
        iter.into_iter().for_each(|p| stats.feed(p));
        stats
    }
}
