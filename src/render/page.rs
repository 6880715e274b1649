use super::{escape_html, render_chart};
use crate::models::{Command, Reading};
use crate::services::dashboard::{DashboardSettings, DashboardView};
use crate::services::{DashboardSnapshot, SnapshotStatus};
use std::fmt::Write;

const CHART_WIDTH: u32 = 960;
const CHART_HEIGHT: u32 = 320;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1.5rem; color: #1f2933; }
h1 { margin-bottom: 0.2rem; }
.caption { color: #616e7c; margin-top: 0; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; margin: 1.5rem 0; }
.metric { border: 1px solid #e4e7eb; border-radius: 8px; padding: 1rem; }
.metric-label { font-size: 0.9rem; color: #616e7c; }
.metric-value { font-size: 1.8rem; font-weight: 600; }
.chart .axis { stroke: #9aa5b1; stroke-width: 1; }
.chart .line { stroke: #2680c2; stroke-width: 2; fill: none; }
.chart circle.line { fill: #2680c2; }
.chart .label { font-size: 11px; fill: #616e7c; }
.panel { border-radius: 8px; padding: 0.8rem 1rem; margin: 1rem 0; }
.warning { background: #fffbea; border: 1px solid #f7c948; }
.error { background: #ffeeee; border: 1px solid #e12d39; }
.info { background: #e6f6ff; border: 1px solid #47a3f3; }
.controls form { display: inline; margin-right: 0.5rem; }
.controls button { font-size: 1rem; padding: 0.5rem 1.2rem; border-radius: 6px; border: 1px solid #9aa5b1; cursor: pointer; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: right; padding: 0.3rem 0.6rem; border-bottom: 1px solid #e4e7eb; }
th:first-child, td:first-child { text-align: left; }
"#;

/// Per-request bits of the page that are not part of the snapshot.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Command just sent from the controls, shown as a confirmation.
    pub sent: Option<Command>,
}

pub fn render_page(
    snapshot: &DashboardSnapshot,
    settings: &DashboardSettings,
    ctx: &PageContext,
) -> String {
    let title = escape_html(&settings.title);
    let mut html = String::with_capacity(16 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n"
    );
    if settings.polling {
        let _ = writeln!(
            html,
            "<meta http-equiv=\"refresh\" content=\"{}\">",
            settings.refresh_secs
        );
    }
    let _ = write!(
        html,
        "<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>Refrigerator Real-Time Energy Monitor</h1>\n"
    );
    let caption = if settings.polling {
        "Powered by a local collector and a cloud database. This page will auto-refresh."
    } else {
        "Powered by a local collector and a cloud database. Reload the page for fresh data."
    };
    let _ = writeln!(html, "<p class=\"caption\">{}</p>", caption);

    if settings.controls_enabled {
        html.push_str(&render_controls(ctx));
    }

    match &snapshot.status {
        SnapshotStatus::Loading => {
            html.push_str(&panel("info", "Loading the first readings..."));
        }
        SnapshotStatus::Waiting { message } => {
            html.push_str(&panel("warning", &escape_html(message)));
        }
        SnapshotStatus::Error {
            message,
            retry_in_secs,
        } => {
            html.push_str(&panel(
                "error",
                &format!("An error occurred: {}", escape_html(message)),
            ));
            let retry = match retry_in_secs {
                Some(secs) => format!("Will attempt to reconnect in {} seconds...", secs),
                None => "Reload the page to try again.".to_string(),
            };
            html.push_str(&panel("warning", &retry));
        }
        SnapshotStatus::Ready(view) => {
            html.push_str(&render_view(view, settings));
        }
    }

    let _ = writeln!(
        html,
        "<p class=\"caption\">Last updated {}</p>",
        snapshot.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn panel(class: &str, body: &str) -> String {
    format!("<div class=\"panel {}\">{}</div>\n", class, body)
}

fn render_controls(ctx: &PageContext) -> String {
    let mut html = String::from("<div class=\"controls\">\n");
    html.push_str(
        "<form method=\"post\" action=\"/commands/on\"><button type=\"submit\">Turn ON</button></form>\n\
         <form method=\"post\" action=\"/commands/off\"><button type=\"submit\">Turn OFF</button></form>\n",
    );
    html.push_str("</div>\n");
    if let Some(command) = ctx.sent {
        html.push_str(&panel("info", &format!("Command '{}' sent.", command)));
    }
    html
}

fn render_view(view: &DashboardView, settings: &DashboardSettings) -> String {
    let mut html = String::new();

    html.push_str("<section class=\"metrics\">\n");
    for (label, value) in [
        ("Power", &view.metrics.power),
        ("Voltage", &view.metrics.voltage),
        ("Current", &view.metrics.current),
        ("Total Usage", &view.metrics.total_usage),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"metric\"><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>",
            label,
            escape_html(value)
        );
    }
    html.push_str("</section>\n");

    let _ = writeln!(
        html,
        "<h2>Power Usage Over Time (Last {} Readings)</h2>",
        settings.chart_points
    );
    html.push_str(&render_chart(&view.chart, CHART_WIDTH, CHART_HEIGHT));
    html.push('\n');

    html.push_str("<details>\n<summary>Show Raw Data Log</summary>\n");
    html.push_str(&render_table(&view.raw_log));
    html.push_str("</details>\n");

    html
}

fn render_table(readings: &[Reading]) -> String {
    let mut html = String::from(
        "<table>\n<thead><tr><th>timestamp</th><th>power_w</th><th>voltage_v</th><th>current_ma</th></tr></thead>\n<tbody>\n",
    );
    for r in readings {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            r.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            r.power_w,
            r.voltage_v,
            r.current_ma
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}
