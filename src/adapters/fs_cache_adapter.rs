//! Filesystem cache adapter: one directory per ticker, CSV/JSON datasets.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::error::StockdeckError;
use crate::domain::fundamentals::{CompanyProfile, Dataset, FundamentalTable, StatementKind};
use crate::domain::history::{Dividend, HistoricalBar, Split};
use crate::ports::cache_port::CachePort;

pub const DEFAULT_CACHE_DIR: &str = "my_portfolio_data";

const HISTORICAL_FILE: &str = "historical.csv";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct FsCacheAdapter {
    root: PathBuf,
}

impl FsCacheAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ticker_dir(&self, ticker: &str) -> PathBuf {
        self.root.join(ticker.to_uppercase())
    }

    fn history_path(&self, ticker: &str) -> PathBuf {
        self.ticker_dir(ticker).join(HISTORICAL_FILE)
    }

    fn cache_err(context: &str, err: impl std::fmt::Display) -> StockdeckError {
        StockdeckError::Cache {
            reason: format!("{}: {}", context, err),
        }
    }

    fn parse_history(content: &str) -> Result<Vec<HistoricalBar>, String> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

            let date_str = record.get(0).ok_or("missing date column")?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| format!("invalid date {:?}: {}", date_str, e))?;

            let field = |idx: usize, name: &str| -> Result<f64, String> {
                record
                    .get(idx)
                    .ok_or_else(|| format!("missing {} column", name))?
                    .parse()
                    .map_err(|e| format!("invalid {} value: {}", name, e))
            };

            let open = field(1, "open")?;
            let high = field(2, "high")?;
            let low = field(3, "low")?;
            let close = field(4, "close")?;

            let adj_close = match record.get(5) {
                Some("") | None => None,
                Some(raw) => Some(
                    raw.parse()
                        .map_err(|e| format!("invalid adj_close value: {}", e))?,
                ),
            };

            let volume: u64 = record
                .get(6)
                .ok_or("missing volume column")?
                .parse()
                .map_err(|e| format!("invalid volume value: {}", e))?;

            bars.push(HistoricalBar {
                date,
                open,
                high,
                low,
                close,
                adj_close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl CachePort for FsCacheAdapter {
    fn ensure_ticker_dir(&self, ticker: &str) -> Result<(), StockdeckError> {
        let dir = self.ticker_dir(ticker);
        fs::create_dir_all(&dir)
            .map_err(|e| Self::cache_err(&format!("failed to create {}", dir.display()), e))
    }

    fn write_history(&self, ticker: &str, bars: &[HistoricalBar]) -> Result<(), StockdeckError> {
        let path = self.history_path(ticker);
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::cache_err(&format!("failed to open {}", path.display()), e))?;

        wtr.write_record(["date", "open", "high", "low", "close", "adj_close", "volume"])
            .map_err(|e| Self::cache_err("failed to write history header", e))?;

        for bar in bars {
            wtr.write_record([
                bar.date.format(DATE_FORMAT).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.adj_close.map(|v| v.to_string()).unwrap_or_default(),
                bar.volume.to_string(),
            ])
            .map_err(|e| Self::cache_err("failed to write history row", e))?;
        }

        wtr.flush()
            .map_err(|e| Self::cache_err("failed to flush history file", e))
    }

    fn write_dividends(
        &self,
        ticker: &str,
        dividends: &[Dividend],
    ) -> Result<(), StockdeckError> {
        let path = self.ticker_dir(ticker).join(Dataset::Dividends.file_name());
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::cache_err(&format!("failed to open {}", path.display()), e))?;

        wtr.write_record(["date", "amount"])
            .map_err(|e| Self::cache_err("failed to write dividends header", e))?;
        for dividend in dividends {
            wtr.write_record([
                dividend.date.format(DATE_FORMAT).to_string(),
                dividend.amount.to_string(),
            ])
            .map_err(|e| Self::cache_err("failed to write dividends row", e))?;
        }

        wtr.flush()
            .map_err(|e| Self::cache_err("failed to flush dividends file", e))
    }

    fn write_splits(&self, ticker: &str, splits: &[Split]) -> Result<(), StockdeckError> {
        let path = self.ticker_dir(ticker).join(Dataset::Splits.file_name());
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::cache_err(&format!("failed to open {}", path.display()), e))?;

        wtr.write_record(["date", "numerator", "denominator"])
            .map_err(|e| Self::cache_err("failed to write splits header", e))?;
        for split in splits {
            wtr.write_record([
                split.date.format(DATE_FORMAT).to_string(),
                split.numerator.to_string(),
                split.denominator.to_string(),
            ])
            .map_err(|e| Self::cache_err("failed to write splits row", e))?;
        }

        wtr.flush()
            .map_err(|e| Self::cache_err("failed to flush splits file", e))
    }

    fn write_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
        table: &FundamentalTable,
    ) -> Result<(), StockdeckError> {
        let path = self.ticker_dir(ticker).join(kind.file_name());
        let mut wtr = csv::Writer::from_path(&path)
            .map_err(|e| Self::cache_err(&format!("failed to open {}", path.display()), e))?;

        let mut header = vec!["period".to_string()];
        header.extend(table.columns.iter().cloned());
        wtr.write_record(&header)
            .map_err(|e| Self::cache_err("failed to write statement header", e))?;

        for row in &table.rows {
            let mut record = vec![row.period.clone()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)
                .map_err(|e| Self::cache_err("failed to write statement row", e))?;
        }

        wtr.flush()
            .map_err(|e| Self::cache_err("failed to flush statement file", e))
    }

    fn write_profile(
        &self,
        ticker: &str,
        profile: &CompanyProfile,
    ) -> Result<(), StockdeckError> {
        let path = self.ticker_dir(ticker).join(Dataset::Profile.file_name());

        let mut doc = serde_json::Map::new();
        doc.insert(
            "symbol".to_string(),
            serde_json::Value::String(profile.symbol.clone()),
        );
        for (key, value) in &profile.fields {
            doc.insert(key.clone(), value.clone());
        }

        let content = serde_json::to_string_pretty(&serde_json::Value::Object(doc))
            .map_err(|e| Self::cache_err("failed to serialize profile", e))?;
        fs::write(&path, content)
            .map_err(|e| Self::cache_err(&format!("failed to write {}", path.display()), e))
    }

    fn load_history(&self, ticker: &str) -> Option<Vec<HistoricalBar>> {
        let path = self.history_path(ticker);
        if !path.exists() {
            eprintln!("No historical data file found for {}", ticker.to_uppercase());
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                return None;
            }
        };

        match Self::parse_history(&content) {
            Ok(bars) => Some(bars),
            Err(reason) => {
                eprintln!("Error loading data for {}: {}", ticker.to_uppercase(), reason);
                None
            }
        }
    }

    fn list_cached_tickers(&self) -> Result<Vec<String>, StockdeckError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            Self::cache_err(&format!("failed to read directory {}", self.root.display()), e)
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::cache_err("directory entry error", e))?;
            let path = entry.path();
            if path.is_dir() && path.join(HISTORICAL_FILE).exists() {
                tickers.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn list_root_files(&self) -> Result<Vec<String>, StockdeckError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            Self::cache_err(&format!("failed to read directory {}", self.root.display()), e)
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::cache_err("directory entry error", e))?;
            if entry.path().is_file() {
                files.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::FundamentalRow;
    use tempfile::TempDir;

    fn sample_bars() -> Vec<HistoricalBar> {
        ["2024-01-15", "2024-01-16", "2024-01-17"]
            .iter()
            .enumerate()
            .map(|(i, date)| HistoricalBar {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                open: 100.0 + i as f64,
                high: 101.5 + i as f64,
                low: 99.0 + i as f64,
                close: 100.5 + i as f64,
                adj_close: if i == 0 { None } else { Some(100.4 + i as f64) },
                volume: 50_000 + i as u64,
            })
            .collect()
    }

    fn setup() -> (TempDir, FsCacheAdapter) {
        let dir = TempDir::new().unwrap();
        let adapter = FsCacheAdapter::new(dir.path().to_path_buf());
        (dir, adapter)
    }

    #[test]
    fn history_round_trip() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("aapl").unwrap();
        cache.write_history("AAPL", &sample_bars()).unwrap();

        let loaded = cache.load_history("AAPL").unwrap();
        assert_eq!(loaded, sample_bars());
    }

    #[test]
    fn load_is_case_insensitive_on_ticker() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();
        cache.write_history("AAPL", &sample_bars()).unwrap();

        assert!(cache.load_history("aapl").is_some());
    }

    #[test]
    fn load_missing_ticker_returns_none() {
        let (_dir, cache) = setup();
        assert!(cache.load_history("XYZ").is_none());
    }

    #[test]
    fn load_corrupt_file_returns_none() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("BAD").unwrap();
        fs::write(
            cache.history_path("BAD"),
            "date,open,high,low,close,adj_close,volume\nnot-a-date,1,2,3,4,,5\n",
        )
        .unwrap();

        assert!(cache.load_history("BAD").is_none());
    }

    #[test]
    fn list_cached_tickers_requires_historical_file() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();
        cache.write_history("AAPL", &sample_bars()).unwrap();
        cache.ensure_ticker_dir("EMPTY").unwrap();

        assert_eq!(cache.list_cached_tickers().unwrap(), vec!["AAPL"]);
    }

    #[test]
    fn list_cached_tickers_on_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = FsCacheAdapter::new(dir.path().join("never_created"));
        assert!(cache.list_cached_tickers().unwrap().is_empty());
    }

    #[test]
    fn list_root_files_excludes_ticker_dirs() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();
        cache.write_history("AAPL", &sample_bars()).unwrap();
        fs::write(cache.root().join("notes.txt"), "hello").unwrap();

        assert_eq!(cache.list_root_files().unwrap(), vec!["notes.txt"]);
    }

    #[test]
    fn statement_file_has_period_header() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();

        let table = FundamentalTable {
            columns: vec!["totalRevenue".into(), "netIncome".into()],
            rows: vec![FundamentalRow {
                period: "2024-03-31".into(),
                values: vec![Some(1.0e9), None],
            }],
        };
        cache
            .write_statement("AAPL", StatementKind::QuarterlyIncome, &table)
            .unwrap();

        let content = fs::read_to_string(
            cache
                .ticker_dir("AAPL")
                .join(StatementKind::QuarterlyIncome.file_name()),
        )
        .unwrap();
        assert!(content.starts_with("period,totalRevenue,netIncome"));
        assert!(content.contains("2024-03-31,1000000000,"));
    }

    #[test]
    fn profile_round_trips_fields() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();

        let mut fields = std::collections::BTreeMap::new();
        fields.insert(
            "shortName".to_string(),
            serde_json::Value::String("Apple Inc.".into()),
        );
        fields.insert("marketCap".to_string(), serde_json::json!(3.0e12));
        let profile = CompanyProfile {
            symbol: "AAPL".into(),
            fields,
        };
        cache.write_profile("AAPL", &profile).unwrap();

        let content =
            fs::read_to_string(cache.ticker_dir("AAPL").join("info.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["symbol"], "AAPL");
        assert_eq!(parsed["shortName"], "Apple Inc.");
    }

    #[test]
    fn dividends_and_splits_are_written() {
        let (_dir, cache) = setup();
        cache.ensure_ticker_dir("AAPL").unwrap();

        cache
            .write_dividends(
                "AAPL",
                &[Dividend {
                    date: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
                    amount: 0.24,
                }],
            )
            .unwrap();
        cache
            .write_splits(
                "AAPL",
                &[Split {
                    date: NaiveDate::from_ymd_opt(2020, 8, 31).unwrap(),
                    numerator: 4,
                    denominator: 1,
                }],
            )
            .unwrap();

        let dividends =
            fs::read_to_string(cache.ticker_dir("AAPL").join("dividends.csv")).unwrap();
        assert!(dividends.contains("2024-02-09,0.24"));
        let splits = fs::read_to_string(cache.ticker_dir("AAPL").join("splits.csv")).unwrap();
        assert!(splits.contains("2020-08-31,4,1"));
    }
}
