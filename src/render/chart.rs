use crate::services::dashboard::ChartPoint;
use std::fmt::Write;

const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 16.0;
const PAD_BOTTOM: f64 = 28.0;

/// Inline SVG line chart of power over time.
pub fn render_chart(points: &[ChartPoint], width: u32, height: u32) -> String {
    if points.is_empty() {
        return r#"<div class="chart-empty">No readings to plot</div>"#.to_string();
    }

    let w = width as f64;
    let h = height as f64;
    let plot_w = w - PAD_LEFT - PAD_RIGHT;
    let plot_h = h - PAD_TOP - PAD_BOTTOM;

    let first = points[0].timestamp;
    let last = points[points.len() - 1].timestamp;
    let span_ms = (last - first).num_milliseconds() as f64;

    let (min_p, max_p) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.power_w), hi.max(p.power_w))
    });
    let range_p = max_p - min_p;

    let project = |p: &ChartPoint| -> (f64, f64) {
        let x = if span_ms > 0.0 {
            PAD_LEFT + (p.timestamp - first).num_milliseconds() as f64 / span_ms * plot_w
        } else {
            PAD_LEFT + plot_w / 2.0
        };
        let y = if range_p > 0.0 {
            PAD_TOP + (1.0 - (p.power_w - min_p) / range_p) * plot_h
        } else {
            PAD_TOP + plot_h / 2.0
        };
        (x, y)
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {w} {h}" width="100%" preserveAspectRatio="none" role="img" aria-label="Power usage over time">"#,
        w = width,
        h = height
    );
    let _ = write!(
        svg,
        r#"<line class="axis" x1="{x0:.1}" y1="{y1:.1}" x2="{x0:.1}" y2="{y0:.1}"/><line class="axis" x1="{x0:.1}" y1="{y1:.1}" x2="{x1:.1}" y2="{y1:.1}"/>"#,
        x0 = PAD_LEFT,
        x1 = w - PAD_RIGHT,
        y0 = PAD_TOP,
        y1 = h - PAD_BOTTOM,
    );

    if points.len() == 1 {
        let (x, y) = project(&points[0]);
        let _ = write!(svg, r#"<circle class="line" cx="{:.1}" cy="{:.1}" r="3"/>"#, x, y);
    } else {
        let coords: Vec<String> = points
            .iter()
            .map(|p| {
                let (x, y) = project(p);
                format!("{:.1},{:.1}", x, y)
            })
            .collect();
        let _ = write!(
            svg,
            r#"<polyline class="line" fill="none" points="{}"/>"#,
            coords.join(" ")
        );
    }

    // Axis labels
    let _ = write!(
        svg,
        r#"<text class="label" x="{x:.1}" y="{y:.1}" text-anchor="end">{max:.1} W</text>"#,
        x = PAD_LEFT - 6.0,
        y = PAD_TOP + 4.0,
        max = max_p
    );
    let _ = write!(
        svg,
        r#"<text class="label" x="{x:.1}" y="{y:.1}" text-anchor="end">{min:.1} W</text>"#,
        x = PAD_LEFT - 6.0,
        y = h - PAD_BOTTOM,
        min = min_p
    );
    let _ = write!(
        svg,
        r#"<text class="label" x="{x:.1}" y="{y:.1}" text-anchor="start">{t}</text>"#,
        x = PAD_LEFT,
        y = h - 8.0,
        t = first.format("%H:%M:%S")
    );
    let _ = write!(
        svg,
        r#"<text class="label" x="{x:.1}" y="{y:.1}" text-anchor="end">{t}</text>"#,
        x = w - PAD_RIGHT,
        y = h - 8.0,
        t = last.format("%H:%M:%S")
    );

    svg.push_str("</svg>");
    svg
}
