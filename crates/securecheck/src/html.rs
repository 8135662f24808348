//! HTML rendering of a dashboard [`Page`].
//!
//! The output is one self-contained document: inline CSS, inline SVG charts
//! and CSS-only tabs, so the file works offline and without scripts.

use std::fmt::Write as _;

use crate::catalog::CATALOG;
use crate::charts::{self, Dimension};
use crate::config::DashboardConfig;
use crate::dashboard::{Notice, NoticeLevel, Page, PredictionPanel, QueryPanel};
use crate::predict::PredictionForm;
use crate::table::Table;

/// Render a page as a complete HTML document.
#[must_use]
pub fn render_page(page: &Page, config: &DashboardConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <header><h1>{title}</h1></header>
        {notices}
        {overview}
        {charts}
        {queries}
        {prediction}
        {footer}
    </div>
</body>
</html>"#,
        title = escape(&config.title),
        css = inline_css(),
        notices = render_notices(&page.notices),
        overview = render_overview(page),
        charts = render_charts(page),
        queries = render_queries(page.query.as_ref()),
        prediction = render_prediction(page),
        footer = render_footer(),
    )
}

fn inline_css() -> &'static str {
    r"
* { box-sizing: border-box; }
body {
    margin: 0;
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    color: #1f2933;
    background: #f4f7f6;
}
.container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
header h1 { color: #004d40; text-align: center; }
section {
    background: #ffffff;
    border-radius: 8px;
    padding: 1rem 1.5rem;
    margin-bottom: 1.5rem;
    box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}
h2 { color: #004d40; }
.scroll { max-height: 420px; overflow: auto; }
table { border-collapse: collapse; width: 100%; font-size: 0.875rem; }
th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
th { background: #e0f2f1; position: sticky; top: 0; }
.notice { padding: 0.75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.notice-warning { background: #fff8e1; border: 1px solid #ffb300; }
.notice-error { background: #fdecea; border: 1px solid #e53935; }
.tabs input[type=radio] { display: none; }
.tabs label {
    display: inline-block;
    padding: 0.5rem 1rem;
    cursor: pointer;
    border-bottom: 3px solid transparent;
}
.tab-panel { display: none; padding-top: 1rem; }
#tab-0:checked ~ .labels label[for=tab-0],
#tab-1:checked ~ .labels label[for=tab-1],
#tab-2:checked ~ .labels label[for=tab-2] { border-bottom-color: #004d40; font-weight: 600; }
#tab-0:checked ~ .panel-0,
#tab-1:checked ~ .panel-1,
#tab-2:checked ~ .panel-2 { display: block; }
.chart { width: 100%; max-width: 720px; }
.menu li.selected { font-weight: 600; color: #004d40; }
.menu code { background: #eef2f1; padding: 0 0.3rem; border-radius: 3px; }
.info { background: #e0f7fa; padding: 15px; border-radius: 8px; color: #004d40; }
.summary { background: #f0f8ff; padding: 20px; border-radius: 8px; border: 2px solid #004d40; }
footer { text-align: center; color: #004d40; margin-top: 2rem; }
"
}

fn render_notices(notices: &[Notice]) -> String {
    notices.iter().map(render_notice).collect()
}

fn render_notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Warning => "notice-warning",
        NoticeLevel::Error => "notice-error",
    };
    format!(
        r#"<div class="notice {class}">{message}</div>"#,
        message = escape(&notice.message)
    )
}

fn render_overview(page: &Page) -> String {
    let shown = if page.overview.len() < page.total_rows {
        format!(
            r#"<p>Showing {} of {} stops.</p>"#,
            page.overview.len(),
            page.total_rows
        )
    } else {
        String::new()
    };
    format!(
        r#"<section>
    <h2>Police Logs Overview</h2>
    {shown}
    <div class="scroll">{table}</div>
</section>"#,
        table = render_table(&page.overview),
    )
}

fn render_charts(page: &Page) -> String {
    let mut radios = String::new();
    let mut labels = String::new();
    let mut panels = String::new();
    for (i, (dimension, chart)) in Dimension::ALL.iter().zip(&page.charts).enumerate() {
        let checked = if i == 0 { " checked" } else { "" };
        let _ = write!(radios, r#"<input type="radio" name="chart" id="tab-{i}"{checked}>"#);
        let _ = write!(
            labels,
            r#"<label for="tab-{i}">{}</label>"#,
            escape(dimension.tab_label())
        );
        let body = match chart {
            Ok(table) => charts::render_svg(table),
            Err(unavailable) => render_notice(&Notice::warning(unavailable.to_string())),
        };
        let _ = write!(panels, r#"<div class="tab-panel panel-{i}">{body}</div>"#);
    }
    format!(
        r#"<section>
    <h2>Visual Insights</h2>
    <div class="tabs">{radios}<div class="labels">{labels}</div>{panels}</div>
</section>"#
    )
}

fn render_queries(panel: Option<&QueryPanel>) -> String {
    let selected = panel.map(|p| p.entry.key);
    let items: String = CATALOG
        .iter()
        .map(|entry| {
            let class = if selected == Some(entry.key) {
                r#" class="selected""#
            } else {
                ""
            };
            format!(
                r#"<li{class}><code>{key}</code> {description}</li>"#,
                key = escape(entry.key),
                description = escape(entry.description),
            )
        })
        .collect();

    let result = panel.map_or_else(String::new, |panel| {
        let body = match &panel.notice {
            Some(notice) => render_notice(notice),
            None => render_table(&panel.table),
        };
        format!(
            r#"<h3>{description}</h3><div class="scroll">{body}</div>"#,
            description = escape(panel.entry.description),
        )
    });

    format!(
        r#"<section>
    <h2>Advanced Queries</h2>
    <p>Run one with <code>securecheck report --query KEY</code>.</p>
    <ul class="menu">{items}</ul>
    {result}
</section>"#
    )
}

fn render_prediction(page: &Page) -> String {
    let durations = page
        .durations
        .iter()
        .map(|d| escape(d))
        .collect::<Vec<_>>()
        .join(", ");
    let summary = page
        .prediction
        .as_ref()
        .map(render_summary)
        .unwrap_or_default();
    format!(
        r#"<section>
    <h2>Add New Police Log &amp; Predict Outcome</h2>
    <div class="info">
        <p>Fill in the details of a traffic stop to predict the most likely stop outcome and violation based on similar historical records.</p>
        <p>Submit a stop with <code>securecheck report --predict</code> and the <code>predict</code> flags.</p>
        <p>Recorded stop durations: {durations}</p>
    </div>
    {summary}
</section>"#
    )
}

fn render_summary(panel: &PredictionPanel) -> String {
    let basis = if panel.prediction.used_fallback {
        "No similar stops were found; showing the default prediction.".to_string()
    } else {
        format!(
            "Based on {} similar stop(s).",
            panel.prediction.matched_rows
        )
    };
    format!(
        r#"<div class="summary">
    <h3>Prediction Summary</h3>
    <ul>
        <li><strong>Predicted Violation:</strong> {violation}</li>
        <li><strong>Predicted Stop Outcome:</strong> {outcome}</li>
    </ul>
    <p>{summary}</p>
    <p><em>{basis}</em></p>
    <h4>Submitted stop</h4>
    {fields}
</div>"#,
        violation = escape(&panel.prediction.violation),
        outcome = escape(&panel.prediction.outcome),
        summary = escape(&panel.summary),
        fields = render_form_fields(&panel.form),
    )
}

fn render_form_fields(form: &PredictionForm) -> String {
    let fields = [
        ("Stop date", form.stop_date.to_string()),
        ("Stop time", form.stop_time.format("%H:%M").to_string()),
        ("Country", form.country_name.clone()),
        ("Driver gender", form.driver_gender.to_string()),
        ("Driver age", form.driver_age.to_string()),
        ("Driver race", form.driver_race.clone()),
        ("Search conducted", form.search_conducted.to_string()),
        ("Search type", form.search_type.clone()),
        ("Drugs related stop", form.drugs_related_stop.to_string()),
        ("Stop duration", form.stop_duration.clone()),
        ("Vehicle number", form.vehicle_number.clone()),
    ];
    let mut html = String::from(r#"<table class="form">"#);
    for (label, value) in fields {
        let _ = write!(html, "<tr><th>{label}</th><td>{}</td></tr>", escape(&value));
    }
    html.push_str("</table>");
    html
}

/// Render a result table.
#[must_use]
pub fn render_table(table: &Table) -> String {
    let mut html = String::from("<table><thead><tr>");
    for column in table.columns() {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in table.rows() {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(&cell.to_string()));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn render_footer() -> String {
    r"<footer>
    <p><strong>Thank you for using SecureCheck!</strong></p>
</footer>"
        .to_string()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::charts::ChartUnavailable;
    use crate::table::Value;

    fn page() -> Page {
        let data = Table::new(
            vec!["violation".to_string(), "driver_gender".to_string()],
            vec![
                vec![Value::from("Speeding"), Value::from("male")],
                vec![Value::from("<b>DUI</b>"), Value::from("female")],
            ],
        );
        Page {
            overview: data.clone(),
            total_rows: 2,
            charts: charts::all_frequencies(&data),
            durations: vec!["0-15 Min".to_string()],
            query: None,
            prediction: None,
            notices: Vec::new(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_page_structure() {
        let html = render_page(&page(), &DashboardConfig::default());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>SecureCheck: Police Vehicle Check Dashboard</title>"));
        assert!(html.contains("Stops by Violation"));
        assert!(html.contains("Driver Gender Distribution"));
        assert!(html.contains("Driver Race Metrics"));
        assert_eq!(html.matches(r#"type="radio""#).count(), 3);
        for entry in &CATALOG {
            assert!(html.contains(&escape(entry.description)));
        }
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let html = render_page(&page(), &DashboardConfig::default());
        assert!(html.contains("&lt;b&gt;DUI&lt;/b&gt;"));
        assert!(!html.contains("<b>DUI</b>"));
    }

    #[test]
    fn test_unavailable_chart_shows_warning() {
        let html = render_page(&page(), &DashboardConfig::default());
        let warning = ChartUnavailable {
            dimension: Dimension::Race,
        };
        assert!(html.contains(&warning.to_string()));
    }

    #[test]
    fn test_query_panel_notice_replaces_table() {
        let mut page = page();
        page.query = Some(QueryPanel {
            entry: catalog::find("night-arrests").unwrap(),
            table: Table::empty(),
            notice: Some(Notice::warning(crate::dashboard::EMPTY_QUERY_WARNING)),
        });
        let html = render_page(&page, &DashboardConfig::default());

        assert!(html.contains(r#"<li class="selected"><code>night-arrests</code>"#));
        assert!(html.contains("No results found for the selected query."));
    }

    #[test]
    fn test_prediction_echoes_submitted_fields() {
        let form = PredictionForm {
            stop_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            stop_time: chrono::NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
            country_name: "Canada".to_string(),
            driver_gender: crate::record::Gender::Female,
            driver_age: 41,
            driver_race: "Asian".to_string(),
            search_conducted: crate::predict::Flag::Yes,
            search_type: "Frisk".to_string(),
            drugs_related_stop: crate::predict::Flag::No,
            stop_duration: "16-30 Min".to_string(),
            vehicle_number: "<AB12>".to_string(),
        };
        let prediction = crate::predict::Prediction {
            outcome: "Citation".to_string(),
            violation: "Speeding".to_string(),
            matched_rows: 3,
            used_fallback: false,
        };
        let mut page = page();
        page.prediction = Some(PredictionPanel {
            summary: prediction.summary(&form),
            form,
            prediction,
        });
        let html = render_page(&page, &DashboardConfig::default());

        assert!(html.contains("<tr><th>Stop date</th><td>2024-03-02</td></tr>"));
        assert!(html.contains("<tr><th>Stop time</th><td>14:05</td></tr>"));
        assert!(html.contains("<tr><th>Driver age</th><td>41</td></tr>"));
        assert!(html.contains("<tr><th>Search conducted</th><td>1</td></tr>"));
        assert!(html.contains("<tr><th>Vehicle number</th><td>&lt;AB12&gt;</td></tr>"));
        assert_eq!(html.matches("</th><td>").count(), 11);
    }

    #[test]
    fn test_render_table() {
        let table = Table::new(
            vec!["a".to_string()],
            vec![vec![Value::Integer(1)], vec![Value::Null]],
        );
        assert_eq!(
            render_table(&table),
            "<table><thead><tr><th>a</th></tr></thead><tbody>\
             <tr><td>1</td></tr><tr><td></td></tr></tbody></table>"
        );
    }
}
