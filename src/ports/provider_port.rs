//! Remote market-data provider port trait.

use crate::domain::error::StockdeckError;
use crate::domain::fundamentals::{CompanyProfile, FundamentalTable, StatementKind};
use crate::domain::history::HistoryFetch;

pub trait ProviderPort {
    /// Descriptive metadata for a ticker. `Ok(None)` means the provider has
    /// no record of the symbol.
    fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, StockdeckError>;

    /// Maximum available daily history, including dividend and split events.
    fn history(&self, ticker: &str) -> Result<HistoryFetch, StockdeckError>;

    /// One named financial statement. `Ok(None)` means the provider does not
    /// offer that statement for the ticker.
    fn statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Option<FundamentalTable>, StockdeckError>;
}
