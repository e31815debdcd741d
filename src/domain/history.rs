//! Historical price series representation.

use chrono::NaiveDate;

/// One daily OHLCV record for a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: u64,
}

/// A single cash dividend payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A stock split event, e.g. 4:1 is numerator 4, denominator 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub date: NaiveDate,
    pub numerator: u32,
    pub denominator: u32,
}

/// Everything one history call against the provider returns.
///
/// Bars are sorted by date ascending; dividends and splits likewise.
#[derive(Debug, Clone, Default)]
pub struct HistoryFetch {
    pub bars: Vec<HistoricalBar>,
    pub dividends: Vec<Dividend>,
    pub splits: Vec<Split>,
}

impl HistoryFetch {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Inclusive (first, last) date span of the bar series.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
