//! Fundamental datasets: financial statements, corporate actions, metadata.

use std::collections::BTreeMap;

/// Financial statement kinds fetched per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    QuarterlyIncome,
    QuarterlyBalanceSheet,
    QuarterlyCashflow,
    AnnualIncome,
    AnnualBalanceSheet,
    AnnualCashflow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 6] = [
        StatementKind::QuarterlyIncome,
        StatementKind::QuarterlyBalanceSheet,
        StatementKind::QuarterlyCashflow,
        StatementKind::AnnualIncome,
        StatementKind::AnnualBalanceSheet,
        StatementKind::AnnualCashflow,
    ];

    /// Cache file name for this statement.
    pub fn file_name(self) -> &'static str {
        match self {
            StatementKind::QuarterlyIncome => "quarterly_income.csv",
            StatementKind::QuarterlyBalanceSheet => "quarterly_balance_sheet.csv",
            StatementKind::QuarterlyCashflow => "quarterly_cashflow.csv",
            StatementKind::AnnualIncome => "annual_income.csv",
            StatementKind::AnnualBalanceSheet => "annual_balance_sheet.csv",
            StatementKind::AnnualCashflow => "annual_cashflow.csv",
        }
    }
}

/// A labeled table keyed by reporting period.
///
/// `columns` excludes the leading period label; each row carries one value
/// slot per column, `None` where the provider omitted the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalTable {
    pub columns: Vec<String>,
    pub rows: Vec<FundamentalRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalRow {
    pub period: String,
    pub values: Vec<Option<f64>>,
}

impl FundamentalTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Descriptive provider metadata for a ticker; persisted as `info.json`.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub symbol: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl CompanyProfile {
    /// A profile counts as valid when the provider echoed a symbol back.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
    }
}

/// The optional datasets written alongside a ticker's historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Statement(StatementKind),
    Dividends,
    Splits,
    Profile,
}

impl Dataset {
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Statement(kind) => kind.file_name(),
            Dataset::Dividends => "dividends.csv",
            Dataset::Splits => "splits.csv",
            Dataset::Profile => "info.json",
        }
    }
}

/// Outcome of one optional dataset during a download.
///
/// Never feeds into the per-ticker success flag; that is decided by the
/// historical series alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    Written,
    Absent,
    Failed(String),
}
