use crate::domain::date::CalendarDate;

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: CalendarDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Daily bars ordered newest-first with unique, strictly decreasing dates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series from bars in any order. Bars are sorted by date,
    /// newest first; when several bars share a date the first one given wins.
    pub fn from_bars(bars: Vec<PriceBar>) -> Self {
        let mut bars = bars;
        // Stable sort keeps input order among equal dates.
        bars.sort_by(|a, b| b.date.cmp(&a.date));
        bars.dedup_by(|later, earlier| later.date == earlier.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
