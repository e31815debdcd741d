//! HTML templates using Askama.

use askama::Template;

use crate::domain::chart::ChartMode;

/// One pre-formatted row of the metrics table.
pub struct MetricsRow {
    pub ticker: String,
    pub total_return: String,
    pub volatility: String,
    pub sharpe: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub modes: &'a [ChartMode],
    pub rows: Vec<MetricsRow>,
    pub default_start: String,
    pub default_end: String,
    pub has_data: bool,
}

impl<'a> DashboardTemplate<'a> {
    pub fn fragment(&self) -> String {
        let mut html = String::from("<div id=\"content\"><h2>Portfolio Dashboard</h2>");
        if self.has_data {
            html.push_str(&format!("<p>{} ticker(s) loaded</p>", self.rows.len()));
        } else {
            html.push_str(
                "<div class=\"chart-placeholder\">No cached data. \
                 Run `stockdeck download` first.</div>",
            );
        }
        html.push_str("</div>");
        html
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}

#[derive(Template)]
#[template(path = "error_page.html")]
pub struct ErrorPageTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
