#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use stockdeck::domain::error::StockdeckError;
use stockdeck::domain::fundamentals::{
    CompanyProfile, FundamentalRow, FundamentalTable, StatementKind,
};
use stockdeck::domain::history::{Dividend, HistoricalBar, HistoryFetch, Split};
use stockdeck::ports::pacer_port::PacerPort;
use stockdeck::ports::provider_port::ProviderPort;

/// In-memory provider stand-in with per-ticker canned data and failures.
#[derive(Default)]
pub struct MockProvider {
    pub profiles: HashMap<String, CompanyProfile>,
    pub histories: HashMap<String, HistoryFetch>,
    pub statements: HashMap<(String, StatementKind), FundamentalTable>,
    pub profile_errors: HashMap<String, String>,
    pub history_errors: HashMap<String, String>,
    pub statement_errors: HashMap<String, String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_valid(mut self, ticker: &str) -> Self {
        self.profiles.insert(ticker.to_string(), make_profile(ticker));
        self
    }

    pub fn with_history(mut self, ticker: &str, fetch: HistoryFetch) -> Self {
        self.histories.insert(ticker.to_string(), fetch);
        self
    }

    pub fn with_history_error(mut self, ticker: &str, reason: &str) -> Self {
        self.history_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_profile_error(mut self, ticker: &str, reason: &str) -> Self {
        self.profile_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_statement(
        mut self,
        ticker: &str,
        kind: StatementKind,
        table: FundamentalTable,
    ) -> Self {
        self.statements.insert((ticker.to_string(), kind), table);
        self
    }

    pub fn with_statement_error(mut self, ticker: &str, reason: &str) -> Self {
        self.statement_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl ProviderPort for MockProvider {
    fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, StockdeckError> {
        if let Some(reason) = self.profile_errors.get(ticker) {
            return Err(StockdeckError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.profiles.get(ticker).cloned())
    }

    fn history(&self, ticker: &str) -> Result<HistoryFetch, StockdeckError> {
        if let Some(reason) = self.history_errors.get(ticker) {
            return Err(StockdeckError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.histories.get(ticker).cloned().unwrap_or_default())
    }

    fn statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Option<FundamentalTable>, StockdeckError> {
        if let Some(reason) = self.statement_errors.get(ticker) {
            return Err(StockdeckError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.statements.get(&(ticker.to_string(), kind)).cloned())
    }
}

/// Pacer that records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pub pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

impl PacerPort for RecordingPacer {
    fn pause(&self, delay: Duration) {
        self.pauses.lock().unwrap().push(delay);
    }
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<HistoricalBar> {
    let start = day(start_date);
    (0..count)
        .map(|i| {
            let close = start_price + i as f64;
            HistoricalBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: Some(close),
                volume: 1_000 + i as u64,
            }
        })
        .collect()
}

pub fn make_fetch(bars: Vec<HistoricalBar>) -> HistoryFetch {
    HistoryFetch {
        bars,
        dividends: Vec::new(),
        splits: Vec::new(),
    }
}

pub fn make_fetch_with_events(bars: Vec<HistoricalBar>) -> HistoryFetch {
    let first_date = bars.first().map(|b| b.date).unwrap_or_else(|| day("2024-01-01"));
    HistoryFetch {
        bars,
        dividends: vec![Dividend {
            date: first_date,
            amount: 0.24,
        }],
        splits: vec![Split {
            date: first_date,
            numerator: 4,
            denominator: 1,
        }],
    }
}

pub fn make_profile(symbol: &str) -> CompanyProfile {
    let mut fields = BTreeMap::new();
    fields.insert(
        "shortName".to_string(),
        serde_json::Value::String(format!("{} Inc.", symbol)),
    );
    CompanyProfile {
        symbol: symbol.to_uppercase(),
        fields,
    }
}

pub fn make_statement_table() -> FundamentalTable {
    FundamentalTable {
        columns: vec!["netIncome".into(), "totalRevenue".into()],
        rows: vec![FundamentalRow {
            period: "2024-03-31".into(),
            values: vec![Some(2.3e10), Some(9.0e10)],
        }],
    }
}
