//! Server-rendered SVG charts for the dashboard.

use chrono::NaiveDate;

use crate::domain::chart::{ChartData, LineSeries, ScatterPoint};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 420.0;
const PADDING: f64 = 55.0;

const SERIES_COLORS: [&str; 8] = [
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#be185d", "#65a30d",
];

/// Render chart data as an HTML fragment: an `<svg>` plus legend, or a
/// placeholder when there is nothing to draw.
pub fn render_chart(data: &ChartData) -> String {
    match data {
        ChartData::Empty => placeholder("No cached data. Run `stockdeck download` first."),
        ChartData::Lines { series, unit } => {
            if series.is_empty() {
                placeholder("No data in the selected date range.")
            } else {
                render_lines(series, unit)
            }
        }
        ChartData::Scatter(points) => {
            if points.is_empty() {
                placeholder("No cached data. Run `stockdeck download` first.")
            } else {
                render_scatter(points)
            }
        }
    }
}

fn placeholder(message: &str) -> String {
    format!("<div class=\"chart-placeholder\">{}</div>", message)
}

fn color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

fn x_of_date(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> f64 {
    let span = (max - min).num_days() as f64;
    let offset = (date - min).num_days() as f64;
    let scale = if span > 0.0 {
        (WIDTH - 2.0 * PADDING) / span
    } else {
        0.0
    };
    PADDING + offset * scale
}

fn render_lines(series: &[LineSeries], unit: &str) -> String {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut min_date: Option<NaiveDate> = None;
    let mut max_date: Option<NaiveDate> = None;

    for line in series {
        for &(date, value) in &line.points {
            min_y = min_y.min(value);
            max_y = max_y.max(value);
            min_date = Some(min_date.map_or(date, |d| d.min(date)));
            max_date = Some(max_date.map_or(date, |d| d.max(date)));
        }
    }

    let (min_date, max_date) = match (min_date, max_date) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => return placeholder("No data in the selected date range."),
    };

    let y_range = max_y - min_y;
    let scale_y = if y_range > 0.0 {
        (HEIGHT - 2.0 * PADDING) / y_range
    } else {
        1.0
    };

    let mut svg = svg_open();
    svg.push_str(&axes());

    for (i, line) in series.iter().enumerate() {
        let points: Vec<String> = line
            .points
            .iter()
            .map(|&(date, value)| {
                let x = x_of_date(date, min_date, max_date);
                let y = HEIGHT - PADDING - (value - min_y) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect();

        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>",
            color(i),
            points.join(" ")
        ));
    }

    svg.push_str(&y_labels(min_y, max_y));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-label\">{}</text>",
        PADDING,
        HEIGHT - PADDING + 30.0,
        min_date
    ));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-label\" text-anchor=\"end\">{}</text>",
        WIDTH - PADDING,
        HEIGHT - PADDING + 30.0,
        max_date
    ));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-unit\">{}</text>",
        PADDING,
        PADDING - 15.0,
        unit
    ));
    svg.push_str("</svg>");

    svg.push_str("<div class=\"legend\">");
    for (i, line) in series.iter().enumerate() {
        svg.push_str(&format!(
            "<span class=\"legend-item\"><span class=\"swatch\" style=\"background:{}\"></span>{}</span>",
            color(i),
            line.ticker
        ));
    }
    svg.push_str("</div>");
    svg
}

fn render_scatter(points: &[ScatterPoint]) -> String {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.volatility_pct);
        max_x = max_x.max(point.volatility_pct);
        min_y = min_y.min(point.total_return_pct);
        max_y = max_y.max(point.total_return_pct);
    }

    // Pad the bounds so single points and flat clusters stay visible.
    let pad_x = ((max_x - min_x) * 0.1).max(1.0);
    let pad_y = ((max_y - min_y) * 0.1).max(1.0);
    min_x -= pad_x;
    max_x += pad_x;
    min_y -= pad_y;
    max_y += pad_y;

    let scale_x = (WIDTH - 2.0 * PADDING) / (max_x - min_x);
    let scale_y = (HEIGHT - 2.0 * PADDING) / (max_y - min_y);

    let mut svg = svg_open();
    svg.push_str(&axes());

    for (i, point) in points.iter().enumerate() {
        let x = PADDING + (point.volatility_pct - min_x) * scale_x;
        let y = HEIGHT - PADDING - (point.total_return_pct - min_y) * scale_y;
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"5\" fill=\"{}\"/>",
            x,
            y,
            color(i)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" class=\"point-label\">{}</text>",
            x + 8.0,
            y + 4.0,
            point.ticker
        ));
    }

    svg.push_str(&y_labels(min_y, max_y));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-label\">{:.1}%</text>",
        PADDING,
        HEIGHT - PADDING + 30.0,
        min_x
    ));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-label\" text-anchor=\"end\">{:.1}%</text>",
        WIDTH - PADDING,
        HEIGHT - PADDING + 30.0,
        max_x
    ));
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" class=\"axis-unit\">total return % vs annualized volatility %</text>",
        PADDING,
        PADDING - 15.0
    ));
    svg.push_str("</svg>");
    svg
}

fn svg_open() -> String {
    format!(
        "<svg viewBox=\"0 0 {:.0} {:.0}\" xmlns=\"http://www.w3.org/2000/svg\" class=\"chart\">",
        WIDTH, HEIGHT
    )
}

fn axes() -> String {
    format!(
        "<line x1=\"{p:.0}\" y1=\"{p:.0}\" x2=\"{p:.0}\" y2=\"{b:.0}\" class=\"axis\"/>\
         <line x1=\"{p:.0}\" y1=\"{b:.0}\" x2=\"{r:.0}\" y2=\"{b:.0}\" class=\"axis\"/>",
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    )
}

fn y_labels(min_y: f64, max_y: f64) -> String {
    format!(
        "<text x=\"{x:.0}\" y=\"{top:.0}\" class=\"axis-label\" text-anchor=\"end\">{max:.2}</text>\
         <text x=\"{x:.0}\" y=\"{bottom:.0}\" class=\"axis-label\" text-anchor=\"end\">{min:.2}</text>",
        x = PADDING - 8.0,
        top = PADDING + 4.0,
        bottom = HEIGHT - PADDING + 4.0,
        max = max_y,
        min = min_y
    )
}
