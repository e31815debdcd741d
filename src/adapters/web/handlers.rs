//! HTTP request handlers for the dashboard.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::chart::{build_chart, ChartMode, DateRange};

use super::chart_svg::render_chart;
use super::templates::{DashboardTemplate, ErrorPageTemplate, ErrorTemplate, MetricsRow};
use super::{is_htmx_request, AppState, WebError};

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let rows: Vec<MetricsRow> = state
        .portfolio
        .tickers
        .iter()
        .map(|(ticker, series)| MetricsRow {
            ticker: ticker.clone(),
            total_return: format!("{:.2}", series.metrics.total_return_pct),
            volatility: format!("{:.2}", series.metrics.annualized_volatility_pct),
            sharpe: format!("{:.2}", series.metrics.sharpe_like),
        })
        .collect();

    let (default_start, default_end) = match state.portfolio.date_bounds() {
        Some((lo, hi)) => (lo.to_string(), hi.to_string()),
        None => (String::new(), String::new()),
    };

    let template = DashboardTemplate {
        modes: &ChartMode::ALL,
        rows,
        default_start,
        default_end,
        has_data: !state.portfolio.is_empty(),
    };

    if is_htmx_request(&headers) {
        Ok(Html(template.fragment()).into_response())
    } else {
        let html = template
            .render()
            .map_err(|e| WebError::internal(e.to_string()))?;
        Ok(Html(html).into_response())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub mode: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

pub async fn chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChartParams>,
) -> Result<Response, WebError> {
    let mode = match params.mode.as_deref() {
        None | Some("") => ChartMode::Price,
        Some(raw) => ChartMode::parse(raw)
            .ok_or_else(|| WebError::bad_request(format!("unknown chart mode {:?}", raw)))?,
    };

    // A date that does not parse means "unbounded on that side": the ticker
    // keeps its whole series rather than disappearing.
    let range = DateRange {
        start: parse_date(params.start.as_deref()),
        end: parse_date(params.end.as_deref()),
    };

    let data = build_chart(&state.portfolio, mode, &range);
    Ok(Html(render_chart(&data)).into_response())
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub async fn not_found(headers: HeaderMap) -> Response {
    let message = "Page not found";
    if is_htmx_request(&headers) {
        let fragment = ErrorTemplate {
            message,
            status: 404,
        };
        match fragment.render() {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, message).into_response(),
        }
    } else {
        let page = ErrorPageTemplate {
            message,
            status: 404,
        };
        match page.render() {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, message).into_response(),
        }
    }
}
