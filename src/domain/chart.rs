//! Chart series construction and date-range filtering for the dashboard.

use chrono::NaiveDate;

use crate::domain::history::HistoricalBar;
use crate::domain::metrics::{daily_returns, rolling_volatility, ROLLING_WINDOW};
use crate::domain::portfolio::PortfolioData;

/// The five dashboard chart modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    Price,
    Normalized,
    DailyReturns,
    RollingVolatility,
    RiskReturn,
}

impl ChartMode {
    pub const ALL: [ChartMode; 5] = [
        ChartMode::Price,
        ChartMode::Normalized,
        ChartMode::DailyReturns,
        ChartMode::RollingVolatility,
        ChartMode::RiskReturn,
    ];

    pub fn parse(input: &str) -> Option<ChartMode> {
        match input {
            "price" => Some(ChartMode::Price),
            "normalized" => Some(ChartMode::Normalized),
            "daily_returns" => Some(ChartMode::DailyReturns),
            "rolling_volatility" => Some(ChartMode::RollingVolatility),
            "risk_return" => Some(ChartMode::RiskReturn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartMode::Price => "price",
            ChartMode::Normalized => "normalized",
            ChartMode::DailyReturns => "daily_returns",
            ChartMode::RollingVolatility => "rolling_volatility",
            ChartMode::RiskReturn => "risk_return",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartMode::Price => "Price History",
            ChartMode::Normalized => "Normalized Returns",
            ChartMode::DailyReturns => "Daily Returns",
            ChartMode::RollingVolatility => "Rolling Volatility",
            ChartMode::RiskReturn => "Risk vs Return",
        }
    }

    /// Y-axis caption for line modes.
    fn unit(self) -> &'static str {
        match self {
            ChartMode::Price => "close price",
            ChartMode::Normalized => "index (first in range = 100)",
            ChartMode::DailyReturns => "daily change %",
            ChartMode::RollingVolatility => "annualized volatility %",
            ChartMode::RiskReturn => "",
        }
    }
}

/// Inclusive calendar-date filter. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Subslice of `bars` whose dates fall inside `range`.
///
/// Bars are sorted by date, so this is a binary-search slice, and the
/// comparison is date-only by construction.
pub fn filter_bars<'a>(bars: &'a [HistoricalBar], range: &DateRange) -> &'a [HistoricalBar] {
    let lo = match range.start {
        Some(start) => bars.partition_point(|b| b.date < start),
        None => 0,
    };
    let hi = match range.end {
        Some(end) => bars.partition_point(|b| b.date <= end),
        None => bars.len(),
    };

    if lo >= hi {
        &[]
    } else {
        &bars[lo..hi]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub ticker: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub ticker: String,
    pub volatility_pct: f64,
    pub total_return_pct: f64,
}

/// Chart-ready data for one mode.
///
/// `Empty` means no cached data exists at all; line charts whose date range
/// excludes everything still come back as `Lines` with no series.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Lines {
        series: Vec<LineSeries>,
        unit: &'static str,
    },
    Scatter(Vec<ScatterPoint>),
    Empty,
}

/// Build the series for `mode`, filtered to `range`.
///
/// The risk-return scatter ignores the range: its coordinates are the
/// full-history metrics computed at load time.
pub fn build_chart(portfolio: &PortfolioData, mode: ChartMode, range: &DateRange) -> ChartData {
    if portfolio.is_empty() {
        return ChartData::Empty;
    }

    if mode == ChartMode::RiskReturn {
        let points = portfolio
            .tickers
            .iter()
            .map(|(ticker, series)| ScatterPoint {
                ticker: ticker.clone(),
                volatility_pct: series.metrics.annualized_volatility_pct,
                total_return_pct: series.metrics.total_return_pct,
            })
            .collect();
        return ChartData::Scatter(points);
    }

    let mut all_series = Vec::new();
    for (ticker, series) in &portfolio.tickers {
        let window = filter_bars(&series.bars, range);
        let points = match mode {
            ChartMode::Price => window.iter().map(|b| (b.date, b.close)).collect(),
            ChartMode::Normalized => normalized_points(window),
            ChartMode::DailyReturns => daily_return_points(window),
            ChartMode::RollingVolatility => rolling_volatility_points(window),
            ChartMode::RiskReturn => unreachable!(),
        };

        if !points.is_empty() {
            all_series.push(LineSeries {
                ticker: ticker.clone(),
                points,
            });
        }
    }

    ChartData::Lines {
        series: all_series,
        unit: mode.unit(),
    }
}

fn normalized_points(window: &[HistoricalBar]) -> Vec<(NaiveDate, f64)> {
    let first = match window.first() {
        Some(bar) if bar.close > 0.0 => bar.close,
        _ => return Vec::new(),
    };
    window
        .iter()
        .map(|b| (b.date, b.close * 100.0 / first))
        .collect()
}

fn daily_return_points(window: &[HistoricalBar]) -> Vec<(NaiveDate, f64)> {
    daily_returns(window)
        .into_iter()
        .zip(window.iter().skip(1))
        .map(|(r, bar)| (bar.date, r * 100.0))
        .collect()
}

fn rolling_volatility_points(window: &[HistoricalBar]) -> Vec<(NaiveDate, f64)> {
    let returns = daily_returns(window);
    let vols = rolling_volatility(&returns);
    // vols[i] covers returns [i, i+WINDOW); stamp it with the bar that
    // produced the window's last return.
    vols.into_iter()
        .enumerate()
        .map(|(i, v)| (window[i + ROLLING_WINDOW].date, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::RiskMetrics;
    use crate::domain::portfolio::TickerSeries;
    use std::collections::BTreeMap;

    fn make_bars(start: &str, closes: &[f64]) -> Vec<HistoricalBar> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| HistoricalBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: None,
                volume: 100,
            })
            .collect()
    }

    fn make_portfolio(entries: &[(&str, Vec<HistoricalBar>)]) -> PortfolioData {
        let mut tickers = BTreeMap::new();
        for (ticker, bars) in entries {
            let metrics = RiskMetrics::compute(bars);
            tickers.insert(
                ticker.to_string(),
                TickerSeries {
                    bars: bars.clone(),
                    metrics,
                },
            );
        }
        PortfolioData { tickers }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn mode_parse_round_trips() {
        for mode in ChartMode::ALL {
            assert_eq!(ChartMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ChartMode::parse("candles"), None);
    }

    #[test]
    fn filter_is_inclusive_on_both_ends() {
        let bars = make_bars("2024-01-01", &[1.0, 2.0, 3.0, 4.0]);
        let range = DateRange {
            start: Some(day("2024-01-02")),
            end: Some(day("2024-01-03")),
        };
        let filtered = filter_bars(&bars, &range);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].date, day("2024-01-02"));
        assert_eq!(filtered[1].date, day("2024-01-03"));
    }

    #[test]
    fn filter_single_day_keeps_that_sample() {
        let bars = make_bars("2024-01-01", &[1.0, 2.0, 3.0]);
        let range = DateRange {
            start: Some(day("2024-01-02")),
            end: Some(day("2024-01-02")),
        };
        let filtered = filter_bars(&bars, &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date, day("2024-01-02"));
    }

    #[test]
    fn filter_unbounded_returns_everything() {
        let bars = make_bars("2024-01-01", &[1.0, 2.0]);
        assert_eq!(filter_bars(&bars, &DateRange::default()).len(), 2);
    }

    #[test]
    fn filter_disjoint_range_is_empty() {
        let bars = make_bars("2024-01-01", &[1.0, 2.0]);
        let range = DateRange {
            start: Some(day("2025-01-01")),
            end: None,
        };
        assert!(filter_bars(&bars, &range).is_empty());
    }

    #[test]
    fn normalized_first_in_window_is_exactly_100() {
        let portfolio = make_portfolio(&[("AAPL", make_bars("2024-01-01", &[50.0, 80.0, 40.0]))]);
        let range = DateRange {
            start: Some(day("2024-01-02")),
            end: None,
        };
        let chart = build_chart(&portfolio, ChartMode::Normalized, &range);
        match chart {
            ChartData::Lines { series, .. } => {
                assert_eq!(series.len(), 1);
                let points = &series[0].points;
                assert!((points[0].1 - 100.0).abs() < f64::EPSILON);
                assert!((points[1].1 - 50.0).abs() < 1e-9);
            }
            other => panic!("expected lines, got {:?}", other),
        }
    }

    #[test]
    fn rolling_volatility_omits_short_series() {
        // 20 bars for AAPL, 45 for MSFT: only MSFT survives.
        let aapl = make_bars("2024-01-01", &vec![100.0; 20]);
        let msft_closes: Vec<f64> = (0..45).map(|i| 100.0 + (i % 4) as f64).collect();
        let msft = make_bars("2024-01-01", &msft_closes);
        let portfolio = make_portfolio(&[("AAPL", aapl), ("MSFT", msft)]);

        let chart = build_chart(&portfolio, ChartMode::RollingVolatility, &DateRange::default());
        match chart {
            ChartData::Lines { series, .. } => {
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].ticker, "MSFT");
            }
            other => panic!("expected lines, got {:?}", other),
        }
    }

    #[test]
    fn risk_return_ignores_date_range() {
        let portfolio = make_portfolio(&[("AAPL", make_bars("2024-01-01", &[100.0, 110.0, 99.0]))]);
        let range = DateRange {
            start: Some(day("2030-01-01")),
            end: Some(day("2030-12-31")),
        };
        let chart = build_chart(&portfolio, ChartMode::RiskReturn, &range);
        match chart {
            ChartData::Scatter(points) => {
                assert_eq!(points.len(), 1);
                assert!((points[0].total_return_pct - (-1.0)).abs() < 1e-9);
            }
            other => panic!("expected scatter, got {:?}", other),
        }
    }

    #[test]
    fn empty_portfolio_yields_placeholder() {
        let portfolio = PortfolioData::default();
        assert_eq!(
            build_chart(&portfolio, ChartMode::Price, &DateRange::default()),
            ChartData::Empty
        );
    }

    #[test]
    fn daily_returns_points_skip_first_day() {
        let portfolio = make_portfolio(&[("AAPL", make_bars("2024-01-01", &[100.0, 110.0, 99.0]))]);
        let chart = build_chart(&portfolio, ChartMode::DailyReturns, &DateRange::default());
        match chart {
            ChartData::Lines { series, .. } => {
                let points = &series[0].points;
                assert_eq!(points.len(), 2);
                assert_eq!(points[0].0, day("2024-01-02"));
                assert!((points[0].1 - 10.0).abs() < 1e-9);
                assert!((points[1].1 - (-10.0)).abs() < 1e-9);
            }
            other => panic!("expected lines, got {:?}", other),
        }
    }
}
