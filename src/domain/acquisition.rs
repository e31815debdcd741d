//! Ticker acquisition pipeline: validate, fetch, persist.
//!
//! Per-ticker failures are captured in the returned report map; only cache
//! setup failures abort the batch.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::error::StockdeckError;
use crate::domain::fundamentals::{Dataset, DatasetStatus, StatementKind};
use crate::domain::tickers::normalize_tickers;
use crate::ports::cache_port::CachePort;
use crate::ports::pacer_port::PacerPort;
use crate::ports::provider_port::ProviderPort;

pub const DEFAULT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Filter the batch through [`validate_tickers`] before fetching.
    pub validate_first: bool,
    /// Pause between consecutive downloads, not after the last.
    pub delay: Duration,
    /// Fetch the financial statements in addition to the historical series.
    pub fundamentals: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        DownloadOptions {
            validate_first: true,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            fundamentals: true,
        }
    }
}

/// Outcome of one ticker's download.
#[derive(Debug, Clone)]
pub struct TickerReport {
    /// True iff the historical series was fetched non-empty and written.
    pub success: bool,
    pub bars: usize,
    pub datasets: Vec<(Dataset, DatasetStatus)>,
}

impl TickerReport {
    fn failed() -> Self {
        TickerReport {
            success: false,
            bars: 0,
            datasets: Vec::new(),
        }
    }
}

/// Check each ticker against the provider's metadata endpoint.
///
/// A ticker is valid iff the provider returns a profile carrying a symbol.
/// Lookup errors mark the ticker invalid; they are reported, not propagated.
/// The result contains every input ticker exactly once, uppercased.
pub fn validate_tickers(
    provider: &dyn ProviderPort,
    tickers: &[String],
) -> BTreeMap<String, bool> {
    let tickers = normalize_tickers(tickers);
    let mut results = BTreeMap::new();

    eprintln!("Validating {} ticker(s)...", tickers.len());
    for ticker in tickers {
        let valid = match provider.profile(&ticker) {
            Ok(Some(profile)) => profile.is_valid(),
            Ok(None) => false,
            Err(e) => {
                eprintln!("Warning: validation lookup failed for {} ({})", ticker, e);
                false
            }
        };

        if valid {
            eprintln!("  {} [OK]", ticker);
        } else {
            eprintln!("  {} [INVALID]", ticker);
        }
        results.insert(ticker, valid);
    }

    results
}

/// Download the historical series and optional datasets for each ticker.
///
/// Input is normalized (uppercased, trimmed, de-duplicated). With
/// `validate_first`, invalid tickers are reported as skipped and excluded
/// from the result map entirely. Returns per-ticker reports; errs only when
/// the cache root cannot be set up.
pub fn download_tickers(
    provider: &dyn ProviderPort,
    cache: &dyn CachePort,
    pacer: &dyn PacerPort,
    tickers: &[String],
    options: &DownloadOptions,
) -> Result<BTreeMap<String, TickerReport>, StockdeckError> {
    let mut tickers = normalize_tickers(tickers);
    eprintln!("Starting download for {} ticker(s)...", tickers.len());

    if options.validate_first {
        let validity = validate_tickers(provider, &tickers);
        let before = tickers.len();
        tickers.retain(|t| validity.get(t).copied().unwrap_or(false));
        let skipped = before - tickers.len();
        if skipped > 0 {
            eprintln!("Skipping {} invalid ticker(s)", skipped);
        }
    }

    if tickers.is_empty() {
        eprintln!("No valid tickers to download");
        return Ok(BTreeMap::new());
    }

    let mut results = BTreeMap::new();
    let total = tickers.len();

    for (i, ticker) in tickers.iter().enumerate() {
        eprintln!("[{}/{}] Downloading {}...", i + 1, total, ticker);
        let report = download_single(provider, cache, ticker, options)?;
        results.insert(ticker.clone(), report);

        if i + 1 < total && !options.delay.is_zero() {
            pacer.pause(options.delay);
        }
    }

    let successful = results.values().filter(|r| r.success).count();
    eprintln!("Download complete: {}/{} successful", successful, total);

    Ok(results)
}

fn download_single(
    provider: &dyn ProviderPort,
    cache: &dyn CachePort,
    ticker: &str,
    options: &DownloadOptions,
) -> Result<TickerReport, StockdeckError> {
    cache.ensure_ticker_dir(ticker)?;

    let fetch = match provider.history(ticker) {
        Ok(fetch) => fetch,
        Err(e) => {
            eprintln!("  {} [FAIL] history fetch: {}", ticker, e);
            return Ok(TickerReport::failed());
        }
    };

    if fetch.is_empty() {
        eprintln!("  {} [FAIL] no historical data available", ticker);
        return Ok(TickerReport::failed());
    }

    if let Err(e) = cache.write_history(ticker, &fetch.bars) {
        eprintln!("  {} [FAIL] could not write history: {}", ticker, e);
        return Ok(TickerReport::failed());
    }

    let mut datasets = Vec::new();

    let dividends_status = if fetch.dividends.is_empty() {
        DatasetStatus::Absent
    } else {
        match cache.write_dividends(ticker, &fetch.dividends) {
            Ok(()) => DatasetStatus::Written,
            Err(e) => DatasetStatus::Failed(e.to_string()),
        }
    };
    datasets.push((Dataset::Dividends, dividends_status));

    let splits_status = if fetch.splits.is_empty() {
        DatasetStatus::Absent
    } else {
        match cache.write_splits(ticker, &fetch.splits) {
            Ok(()) => DatasetStatus::Written,
            Err(e) => DatasetStatus::Failed(e.to_string()),
        }
    };
    datasets.push((Dataset::Splits, splits_status));

    if options.fundamentals {
        for kind in StatementKind::ALL {
            let status = match provider.statement(ticker, kind) {
                Ok(Some(table)) if !table.is_empty() => {
                    match cache.write_statement(ticker, kind, &table) {
                        Ok(()) => DatasetStatus::Written,
                        Err(e) => DatasetStatus::Failed(e.to_string()),
                    }
                }
                Ok(_) => DatasetStatus::Absent,
                Err(e) => DatasetStatus::Failed(e.to_string()),
            };
            datasets.push((Dataset::Statement(kind), status));
        }
    }

    let profile_status = match provider.profile(ticker) {
        Ok(Some(profile)) if profile.is_valid() => {
            match cache.write_profile(ticker, &profile) {
                Ok(()) => DatasetStatus::Written,
                Err(e) => DatasetStatus::Failed(e.to_string()),
            }
        }
        Ok(_) => DatasetStatus::Absent,
        Err(e) => DatasetStatus::Failed(e.to_string()),
    };
    datasets.push((Dataset::Profile, profile_status));

    let written: Vec<&str> = datasets
        .iter()
        .filter(|(_, status)| *status == DatasetStatus::Written)
        .map(|(dataset, _)| dataset.file_name())
        .collect();

    match fetch.date_span() {
        Some((first, last)) => eprintln!(
            "  {}: {} bars ({} to {}) [OK] extras: {}",
            ticker,
            fetch.bars.len(),
            first,
            last,
            if written.is_empty() {
                "none".to_string()
            } else {
                written.join(", ")
            }
        ),
        None => eprintln!("  {}: {} bars [OK]", ticker, fetch.bars.len()),
    }

    Ok(TickerReport {
        success: true,
        bars: fetch.bars.len(),
        datasets,
    })
}
