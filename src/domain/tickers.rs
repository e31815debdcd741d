//! Ticker symbol list parsing and normalization.

use std::collections::HashSet;

/// Parse a comma- or whitespace-separated ticker list into uppercased,
/// de-duplicated symbols. First occurrence wins; empty tokens are dropped.
pub fn parse_tickers(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let ticker = token.trim().to_uppercase();
        if ticker.is_empty() || seen.contains(&ticker) {
            continue;
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    tickers
}

/// Normalize an already-collected symbol list the same way [`parse_tickers`]
/// normalizes raw input.
pub fn normalize_tickers(input: &[String]) -> Vec<String> {
    parse_tickers(&input.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comma_separated() {
        assert_eq!(parse_tickers("AAPL,MSFT,GOOG"), vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn parse_space_separated() {
        assert_eq!(parse_tickers("aapl msft"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn parse_mixed_separators_and_whitespace() {
        assert_eq!(parse_tickers(" aapl , MSFT  goog "), vec!["AAPL", "MSFT", "GOOG"]);
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        assert_eq!(parse_tickers("AAPL,aapl,MSFT,AAPL"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_tickers("").is_empty());
        assert!(parse_tickers(" , ,, ").is_empty());
    }

    #[test]
    fn normalize_slice_matches_parse() {
        let input = vec!["aapl".to_string(), "AAPL".to_string(), "msft".to_string()];
        assert_eq!(normalize_tickers(&input), vec!["AAPL", "MSFT"]);
    }
}
