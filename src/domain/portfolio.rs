//! In-memory portfolio snapshot over the cached historical series.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::history::HistoricalBar;
use crate::domain::metrics::RiskMetrics;
use crate::ports::cache_port::CachePort;

/// One ticker's cached series plus its full-history risk metrics.
#[derive(Debug, Clone)]
pub struct TickerSeries {
    pub bars: Vec<HistoricalBar>,
    pub metrics: RiskMetrics,
}

/// Everything the dashboard serves, loaded once at startup.
///
/// Metrics are computed here, over each ticker's full history; the
/// risk-return view and the metrics table never recompute under a date
/// filter.
#[derive(Debug, Clone, Default)]
pub struct PortfolioData {
    pub tickers: BTreeMap<String, TickerSeries>,
}

impl PortfolioData {
    /// Scan the cache and load every usable historical series.
    ///
    /// Tickers whose series is missing or unreadable are skipped with a
    /// warning; an unreadable cache root yields an empty portfolio.
    pub fn load(cache: &dyn CachePort) -> Self {
        let names = match cache.list_cached_tickers() {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Warning: could not scan cache ({})", e);
                Vec::new()
            }
        };

        let mut tickers = BTreeMap::new();
        for ticker in names {
            match cache.load_history(&ticker) {
                Some(bars) if !bars.is_empty() => {
                    let metrics = RiskMetrics::compute(&bars);
                    tickers.insert(ticker, TickerSeries { bars, metrics });
                }
                _ => {
                    eprintln!("Warning: skipping {} (no usable historical data)", ticker);
                }
            }
        }

        PortfolioData { tickers }
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Earliest and latest bar date across all series, for the date pickers.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for series in self.tickers.values() {
            if let (Some(first), Some(last)) = (series.bars.first(), series.bars.last()) {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(first.date), hi.max(last.date)),
                    None => (first.date, last.date),
                });
            }
        }
        bounds
    }
}
