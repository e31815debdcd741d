//! On-disk per-ticker cache port trait.

use crate::domain::error::StockdeckError;
use crate::domain::fundamentals::{CompanyProfile, FundamentalTable, StatementKind};
use crate::domain::history::{Dividend, HistoricalBar, Split};

pub trait CachePort {
    /// Create the ticker's directory under the cache root if needed.
    /// Failure here is fatal for the whole batch, not just the ticker.
    fn ensure_ticker_dir(&self, ticker: &str) -> Result<(), StockdeckError>;

    fn write_history(&self, ticker: &str, bars: &[HistoricalBar]) -> Result<(), StockdeckError>;

    fn write_dividends(&self, ticker: &str, dividends: &[Dividend])
        -> Result<(), StockdeckError>;

    fn write_splits(&self, ticker: &str, splits: &[Split]) -> Result<(), StockdeckError>;

    fn write_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
        table: &FundamentalTable,
    ) -> Result<(), StockdeckError>;

    fn write_profile(&self, ticker: &str, profile: &CompanyProfile)
        -> Result<(), StockdeckError>;

    /// Cached historical series for a ticker. Missing or unparseable files
    /// yield `None`, never an error.
    fn load_history(&self, ticker: &str) -> Option<Vec<HistoricalBar>>;

    /// Tickers whose directory contains a historical file.
    fn list_cached_tickers(&self) -> Result<Vec<String>, StockdeckError>;

    /// File names directly under the cache root, excluding per-ticker
    /// subdirectories.
    fn list_root_files(&self) -> Result<Vec<String>, StockdeckError>;
}
