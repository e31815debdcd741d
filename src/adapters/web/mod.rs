//! Web dashboard adapter.
//!
//! Axum server with an HTMX-based frontend over the cached portfolio:
//! one page, a chart endpoint, static assets, nothing else.

mod chart_svg;
mod error;
mod handlers;
mod templates;

pub use chart_svg::render_chart;
pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::domain::portfolio::PortfolioData;

/// Application state built once at startup and shared with every handler.
pub struct AppState {
    pub portfolio: Arc<PortfolioData>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/chart", get(handlers::chart))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
