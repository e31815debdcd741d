//! Per-ticker risk statistics over a historical close series.

use crate::domain::history::HistoricalBar;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Rolling-volatility window, in daily-return samples.
pub const ROLLING_WINDOW: usize = 30;

/// Descriptive risk statistics for one ticker, derived from its full cached
/// history. Recomputed on every load; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMetrics {
    pub total_return_pct: f64,
    pub daily_volatility: f64,
    pub annualized_volatility_pct: f64,
    pub sharpe_like: f64,
}

impl RiskMetrics {
    pub fn compute(bars: &[HistoricalBar]) -> Self {
        let returns = daily_returns(bars);

        let total_return_pct = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if first.close > 0.0 => {
                (last.close / first.close - 1.0) * 100.0
            }
            _ => 0.0,
        };

        if returns.is_empty() {
            return RiskMetrics {
                total_return_pct,
                daily_volatility: 0.0,
                annualized_volatility_pct: 0.0,
                sharpe_like: 0.0,
            };
        }

        let n = returns.len() as f64;
        let mean: f64 = returns.iter().sum::<f64>() / n;
        let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let daily_volatility = variance.sqrt();

        let annualized_volatility_pct =
            daily_volatility * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

        let sharpe_like = if daily_volatility > 0.0 {
            (mean * TRADING_DAYS_PER_YEAR)
                / (daily_volatility * TRADING_DAYS_PER_YEAR.sqrt())
        } else {
            0.0
        };

        RiskMetrics {
            total_return_pct,
            daily_volatility,
            annualized_volatility_pct,
            sharpe_like,
        }
    }
}

/// close(t)/close(t-1) - 1 for each day after the first.
///
/// A non-positive previous close yields a zero return for that day rather
/// than a division blow-up.
pub fn daily_returns(bars: &[HistoricalBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let prev = w[0].close;
            let curr = w[1].close;
            if prev > 0.0 {
                curr / prev - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized rolling standard deviation of daily returns, in percent.
///
/// One output value per full [`ROLLING_WINDOW`]-sample window; empty when the
/// return series is shorter than the window.
pub fn rolling_volatility(returns: &[f64]) -> Vec<f64> {
    if returns.len() < ROLLING_WINDOW {
        return Vec::new();
    }

    returns
        .windows(ROLLING_WINDOW)
        .map(|window| {
            let n = window.len() as f64;
            let mean: f64 = window.iter().sum::<f64>() / n;
            let variance: f64 = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<HistoricalBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| HistoricalBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: None,
                volume: 1_000,
            })
            .collect()
    }

    #[test]
    fn daily_returns_basic() {
        let bars = make_bars(&[100.0, 110.0, 99.0]);
        let returns = daily_returns(&bars);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn daily_returns_excludes_first_day() {
        assert!(daily_returns(&make_bars(&[100.0])).is_empty());
        assert!(daily_returns(&[]).is_empty());
    }

    #[test]
    fn total_return_matches_first_and_last_close() {
        let metrics = RiskMetrics::compute(&make_bars(&[100.0, 110.0, 99.0]));
        assert!((metrics.total_return_pct - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn sharpe_is_zero_for_constant_returns() {
        // Doubling every day: each return is exactly 1.0, zero variance.
        let metrics = RiskMetrics::compute(&make_bars(&[100.0, 200.0, 400.0, 800.0]));
        assert_eq!(metrics.daily_volatility, 0.0);
        assert_eq!(metrics.sharpe_like, 0.0);
    }

    #[test]
    fn sharpe_positive_for_upward_drift() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 + (i % 3) as f64).collect();
        let metrics = RiskMetrics::compute(&make_bars(&closes));
        assert!(metrics.sharpe_like > 0.0);
        assert!(metrics.annualized_volatility_pct > 0.0);
    }

    #[test]
    fn metrics_on_short_series_are_zeroed() {
        let metrics = RiskMetrics::compute(&make_bars(&[100.0]));
        assert!((metrics.total_return_pct - 0.0).abs() < f64::EPSILON);
        assert!((metrics.daily_volatility - 0.0).abs() < f64::EPSILON);
        assert!((metrics.sharpe_like - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn annualization_uses_sqrt_252() {
        let bars = make_bars(&[100.0, 110.0, 99.0]);
        let metrics = RiskMetrics::compute(&bars);
        let expected = metrics.daily_volatility * 252.0_f64.sqrt() * 100.0;
        assert!((metrics.annualized_volatility_pct - expected).abs() < 1e-12);
    }

    #[test]
    fn rolling_volatility_requires_full_window() {
        let returns = vec![0.01; ROLLING_WINDOW - 1];
        assert!(rolling_volatility(&returns).is_empty());
    }

    #[test]
    fn rolling_volatility_window_count() {
        let returns: Vec<f64> = (0..40).map(|i| (i % 5) as f64 / 100.0).collect();
        let points = rolling_volatility(&returns);
        assert_eq!(points.len(), 40 - ROLLING_WINDOW + 1);
        assert!(points.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn rolling_volatility_of_constant_returns_is_zero() {
        let returns = vec![0.02; ROLLING_WINDOW + 5];
        let points = rolling_volatility(&returns);
        assert!(points.iter().all(|v| v.abs() < 1e-12));
    }
}
