//! Yahoo Finance provider adapter.
//!
//! Yahoo's unofficial API needs a session cookie from fc.yahoo.com and a
//! crumb token from /v1/test/getcrumb. Both are fetched lazily; a 401/429
//! response invalidates them and the request is retried once.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::domain::error::StockdeckError;
use crate::domain::fundamentals::{
    CompanyProfile, FundamentalRow, FundamentalTable, StatementKind,
};
use crate::domain::history::{Dividend, HistoricalBar, HistoryFetch, Split};
use crate::ports::provider_port::ProviderPort;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUERY_BASE: &str = "https://query1.finance.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) stockdeck/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    crumb: Mutex<Option<String>>,
}

struct RawResponse {
    status: u16,
    body: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, StockdeckError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StockdeckError::Provider {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
        })
    }

    fn transport_err(e: reqwest::Error) -> StockdeckError {
        StockdeckError::Provider {
            reason: format!("transport error: {}", e),
        }
    }

    fn crumb(&self) -> Result<String, StockdeckError> {
        if let Some(crumb) = self
            .crumb
            .lock()
            .expect("crumb cache should not be poisoned")
            .clone()
        {
            return Ok(crumb);
        }
        self.refresh_crumb()
    }

    fn invalidate_crumb(&self) {
        *self
            .crumb
            .lock()
            .expect("crumb cache should not be poisoned") = None;
    }

    fn refresh_crumb(&self) -> Result<String, StockdeckError> {
        // fc.yahoo.com answers 404 but sets the session cookies we need.
        let _ = self
            .client
            .get(COOKIE_URL)
            .header("referer", REFERER)
            .send()
            .map_err(Self::transport_err)?;

        for url in CRUMB_URLS {
            let response = match self.client.get(url).header("referer", REFERER).send() {
                Ok(response) => response,
                Err(_) => continue,
            };
            if !response.status().is_success() {
                continue;
            }
            let body = match response.text() {
                Ok(body) => body,
                Err(_) => continue,
            };
            let candidate = body.trim();
            if is_plausible_crumb(candidate) {
                let crumb = candidate.to_string();
                *self
                    .crumb
                    .lock()
                    .expect("crumb cache should not be poisoned") = Some(crumb.clone());
                return Ok(crumb);
            }
            if candidate.to_lowercase().contains("too many requests") {
                return Err(StockdeckError::RateLimited {
                    reason: "rate limited while fetching crumb".into(),
                });
            }
        }

        Err(StockdeckError::Provider {
            reason: "failed to obtain crumb from any endpoint".into(),
        })
    }

    /// One authenticated GET, with a single crumb refresh and retry on
    /// 401/429. Transport failures map to [`StockdeckError::Provider`].
    fn fetch(&self, build_url: &dyn Fn(&str) -> String) -> Result<RawResponse, StockdeckError> {
        let crumb = self.crumb()?;
        let response = self
            .client
            .get(build_url(&crumb))
            .header("referer", REFERER)
            .send()
            .map_err(Self::transport_err)?;

        let status = response.status().as_u16();
        if status != 401 && status != 429 {
            let body = response.text().map_err(Self::transport_err)?;
            return Ok(RawResponse { status, body });
        }

        self.invalidate_crumb();
        let crumb = self.refresh_crumb()?;
        let retry = self
            .client
            .get(build_url(&crumb))
            .header("referer", REFERER)
            .send()
            .map_err(Self::transport_err)?;

        let status = retry.status().as_u16();
        let body = retry.text().map_err(Self::transport_err)?;
        Ok(RawResponse { status, body })
    }

    fn check_status(response: &RawResponse) -> Result<(), StockdeckError> {
        match response.status {
            200..=299 => Ok(()),
            429 => Err(StockdeckError::RateLimited {
                reason: "upstream returned status 429".into(),
            }),
            status => Err(StockdeckError::Provider {
                reason: format!("upstream returned status {}", status),
            }),
        }
    }
}

impl ProviderPort for YahooAdapter {
    fn profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, StockdeckError> {
        let ticker = ticker.to_uppercase();
        let response = self.fetch(&|crumb| {
            format!(
                "{}/v10/finance/quoteSummary/{}?modules=price&crumb={}",
                QUERY_BASE,
                urlencoding::encode(&ticker),
                urlencoding::encode(crumb)
            )
        })?;

        // Unknown symbols come back as 404 with an error envelope.
        if response.status == 404 {
            return Ok(None);
        }
        Self::check_status(&response)?;

        parse_profile(&response.body).map_err(|reason| StockdeckError::Provider { reason })
    }

    fn history(&self, ticker: &str) -> Result<HistoryFetch, StockdeckError> {
        let ticker = ticker.to_uppercase();
        let response = self.fetch(&|crumb| {
            format!(
                "{}/v8/finance/chart/{}?range=max&interval=1d&events=div%2Csplit&crumb={}",
                QUERY_BASE,
                urlencoding::encode(&ticker),
                urlencoding::encode(crumb)
            )
        })?;
        Self::check_status(&response)?;

        parse_chart(&response.body).map_err(|reason| StockdeckError::Provider { reason })
    }

    fn statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Option<FundamentalTable>, StockdeckError> {
        let ticker = ticker.to_uppercase();
        let module = statement_module(kind);
        let response = self.fetch(&|crumb| {
            format!(
                "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
                QUERY_BASE,
                urlencoding::encode(&ticker),
                module,
                urlencoding::encode(crumb)
            )
        })?;

        if response.status == 404 {
            return Ok(None);
        }
        Self::check_status(&response)?;

        parse_statement(&response.body, kind)
            .map_err(|reason| StockdeckError::Provider { reason })
    }
}

fn is_plausible_crumb(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() < 100
        && !candidate.contains(' ')
        && !candidate.contains("<html")
        && !candidate.contains("<!DOCTYPE")
        && !candidate.to_lowercase().contains("too many requests")
}

fn statement_module(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::QuarterlyIncome => "incomeStatementHistoryQuarterly",
        StatementKind::QuarterlyBalanceSheet => "balanceSheetHistoryQuarterly",
        StatementKind::QuarterlyCashflow => "cashflowStatementHistoryQuarterly",
        StatementKind::AnnualIncome => "incomeStatementHistory",
        StatementKind::AnnualBalanceSheet => "balanceSheetHistory",
        StatementKind::AnnualCashflow => "cashflowStatementHistory",
    }
}

fn statement_list_key(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::QuarterlyIncome | StatementKind::AnnualIncome => "incomeStatementHistory",
        StatementKind::QuarterlyBalanceSheet | StatementKind::AnnualBalanceSheet => {
            "balanceSheetStatements"
        }
        StatementKind::QuarterlyCashflow | StatementKind::AnnualCashflow => "cashflowStatements",
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartPayload,
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: Option<BTreeMap<String, DividendEvent>>,
    #[serde(default)]
    splits: Option<BTreeMap<String, SplitEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// Flatten the quoteSummary `price` module into a profile.
///
/// Scalar fields are kept as-is; wrapper objects contribute their `raw`
/// value. Returns `Ok(None)` when the envelope has no usable result.
fn parse_profile(body: &str) -> Result<Option<CompanyProfile>, String> {
    let parsed: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| format!("failed to parse quoteSummary response: {}", e))?;

    if parsed.quote_summary.error.as_ref().is_some_and(|e| !e.is_null()) {
        return Ok(None);
    }

    let result = match parsed.quote_summary.result.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.remove(0))
        }
    }) {
        Some(result) => result,
        None => return Ok(None),
    };

    let price = match result.get("price").and_then(|v| v.as_object()) {
        Some(price) => price,
        None => return Ok(None),
    };

    let symbol = match price.get("symbol").and_then(|v| v.as_str()) {
        Some(symbol) if !symbol.is_empty() => symbol.to_string(),
        _ => return Ok(None),
    };

    let mut fields = BTreeMap::new();
    for (key, value) in price {
        if key == "symbol" {
            continue;
        }
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Object(wrapper) => {
                if let Some(raw) = wrapper.get("raw") {
                    fields.insert(key.clone(), raw.clone());
                }
            }
            scalar => {
                fields.insert(key.clone(), scalar.clone());
            }
        }
    }

    Ok(Some(CompanyProfile { symbol, fields }))
}

/// Decode the v8 chart payload into bars plus dividend/split events.
///
/// Rows with any missing OHLC component are skipped. Duplicate dates (the
/// live intraday candle next to the last settled one) collapse to the later
/// row, keeping dates strictly increasing.
fn parse_chart(body: &str) -> Result<HistoryFetch, String> {
    let parsed: ChartResponse =
        serde_json::from_str(body).map_err(|e| format!("failed to parse chart response: {}", e))?;

    if let Some(error) = &parsed.chart.error {
        if !error.is_null() {
            return Err(format!("chart API error: {}", error));
        }
    }

    let result = match parsed.chart.result.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.remove(0))
        }
    }) {
        Some(result) => result,
        None => return Ok(HistoryFetch::default()),
    };

    let timestamps = match &result.timestamp {
        Some(timestamps) => timestamps,
        None => return Ok(HistoryFetch::default()),
    };

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or("no quote data in chart response")?;
    let adjclose = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|series| series.first());

    let mut bars: Vec<HistoricalBar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = match timestamp_to_date(ts) {
            Some(date) => date,
            None => continue,
        };

        let (open, high, low, close) = match (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let bar = HistoricalBar {
            date,
            open,
            high,
            low,
            close,
            adj_close: adjclose.and_then(|a| a.adjclose.get(i).copied().flatten()),
            volume: quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .map(|v| v.max(0) as u64)
                .unwrap_or(0),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }
    bars.sort_by_key(|b| b.date);

    let mut dividends: Vec<Dividend> = result
        .events
        .as_ref()
        .and_then(|e| e.dividends.as_ref())
        .map(|events| {
            events
                .values()
                .filter_map(|event| {
                    timestamp_to_date(event.date).map(|date| Dividend {
                        date,
                        amount: event.amount,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    dividends.sort_by_key(|d| d.date);

    let mut splits: Vec<Split> = result
        .events
        .as_ref()
        .and_then(|e| e.splits.as_ref())
        .map(|events| {
            events
                .values()
                .filter_map(|event| {
                    timestamp_to_date(event.date).map(|date| Split {
                        date,
                        numerator: event.numerator.max(0.0) as u32,
                        denominator: event.denominator.max(0.0) as u32,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    splits.sort_by_key(|s| s.date);

    Ok(HistoryFetch {
        bars,
        dividends,
        splits,
    })
}

/// Decode one quoteSummary statement module into a period-keyed table.
///
/// Columns are the union of numeric `{raw}` fields across all periods,
/// sorted by name. `Ok(None)` when the provider does not offer the module.
fn parse_statement(body: &str, kind: StatementKind) -> Result<Option<FundamentalTable>, String> {
    let parsed: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| format!("failed to parse quoteSummary response: {}", e))?;

    if parsed.quote_summary.error.as_ref().is_some_and(|e| !e.is_null()) {
        return Ok(None);
    }

    let result = match parsed.quote_summary.result.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.remove(0))
        }
    }) {
        Some(result) => result,
        None => return Ok(None),
    };

    let statements = match result
        .get(statement_module(kind))
        .and_then(|module| module.get(statement_list_key(kind)))
        .and_then(|list| list.as_array())
    {
        Some(statements) if !statements.is_empty() => statements,
        _ => return Ok(None),
    };

    let mut columns = BTreeSet::new();
    let mut raw_rows: Vec<(String, BTreeMap<String, f64>)> = Vec::new();

    for statement in statements {
        let object = match statement.as_object() {
            Some(object) => object,
            None => continue,
        };

        let period = object
            .get("endDate")
            .and_then(|end| {
                end.get("fmt")
                    .and_then(|f| f.as_str())
                    .map(str::to_string)
                    .or_else(|| {
                        end.get("raw")
                            .and_then(|r| r.as_i64())
                            .and_then(timestamp_to_date)
                            .map(|d| d.format("%Y-%m-%d").to_string())
                    })
            })
            .unwrap_or_default();
        if period.is_empty() {
            continue;
        }

        let mut values = BTreeMap::new();
        for (key, value) in object {
            if key == "endDate" || key == "maxAge" {
                continue;
            }
            if let Some(raw) = value.get("raw").and_then(|r| r.as_f64()) {
                columns.insert(key.clone());
                values.insert(key.clone(), raw);
            }
        }
        raw_rows.push((period, values));
    }

    if raw_rows.is_empty() {
        return Ok(None);
    }

    let columns: Vec<String> = columns.into_iter().collect();
    let rows = raw_rows
        .into_iter()
        .map(|(period, values)| FundamentalRow {
            values: columns.iter().map(|c| values.get(c).copied()).collect(),
            period,
        })
        .collect();

    Ok(Some(FundamentalTable { columns, rows }))
}
