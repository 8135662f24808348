//! Frequency charts over the base dataset.
//!
//! Each [`Dimension`] names one column of `traffic_stops`, how its counts are
//! drawn and what the chart is called. [`frequency`] turns the dataset into a
//! two-column (category, count) table; the `render_*` functions draw it as
//! SVG for the HTML page or as bars for the terminal.

use std::f64::consts::TAU;
use std::fmt::Write as _;

use thiserror::Error;
use tracing::warn;

use crate::html::escape;
use crate::table::{Table, Value};

/// Colours assigned to categories in order.
const PALETTE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 360.0;
const TEXT_BAR_WIDTH: usize = 40;

/// How a dimension is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars, one colour per category.
    Bar,
    /// Pie slices with percentages.
    Pie,
}

/// A column the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Stops by violation type.
    Violation,
    /// Driver gender distribution.
    Gender,
    /// Stops by driver race.
    Race,
}

impl Dimension {
    /// Every dimension, in tab order.
    pub const ALL: [Dimension; 3] = [Self::Violation, Self::Gender, Self::Race];

    /// Source column in `traffic_stops`.
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Violation => "violation",
            Self::Gender => "driver_gender",
            Self::Race => "driver_race",
        }
    }

    /// Header of the category column of the frequency table.
    #[must_use]
    pub fn category_label(&self) -> &'static str {
        match self {
            Self::Violation => "Violation",
            Self::Gender => "Gender",
            Self::Race => "Driver Race",
        }
    }

    /// Tab caption.
    #[must_use]
    pub fn tab_label(&self) -> &'static str {
        match self {
            Self::Violation => "Stops by Violation",
            Self::Gender => "Driver Gender Distribution",
            Self::Race => "Driver Race Metrics",
        }
    }

    /// Chart title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Violation => "Stops by Violation Type",
            Self::Gender => "Driver Gender Distribution",
            Self::Race => "Driver Race Metrics",
        }
    }

    /// Chart kind.
    #[must_use]
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Gender => ChartKind::Pie,
            Self::Violation | Self::Race => ChartKind::Bar,
        }
    }

    fn subject(self) -> &'static str {
        match self {
            Self::Violation => "Violation",
            Self::Gender => "Driver Gender",
            Self::Race => "Driver Race",
        }
    }
}

/// A chart could not be drawn: no data or the column is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No data available for {} chart.", .dimension.subject())]
pub struct ChartUnavailable {
    /// The chart that was skipped.
    pub dimension: Dimension,
}

/// Category counts for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    /// The charted dimension.
    pub dimension: Dimension,
    /// `(category, count)` ordered by count descending, then category.
    pub counts: Vec<(String, usize)>,
}

impl FrequencyTable {
    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// The two-column table the chart is drawn from.
    #[must_use]
    pub fn to_table(&self) -> Table {
        Table::new(
            vec![self.dimension.category_label().to_string(), "Count".to_string()],
            self.counts
                .iter()
                .map(|(category, n)| {
                    vec![
                        Value::from(category.as_str()),
                        Value::Integer(i64::try_from(*n).unwrap_or(i64::MAX)),
                    ]
                })
                .collect(),
        )
    }
}

/// Count the values of one dimension in the dataset.
///
/// # Errors
///
/// Returns [`ChartUnavailable`] if the dataset is empty or lacks the column.
pub fn frequency(data: &Table, dimension: Dimension) -> Result<FrequencyTable, ChartUnavailable> {
    let unavailable = ChartUnavailable { dimension };
    if data.is_empty() {
        warn!("{unavailable}");
        return Err(unavailable);
    }
    let Some(counts) = data.value_counts(dimension.column()) else {
        warn!("{unavailable} (no '{}' column)", dimension.column());
        return Err(unavailable);
    };
    Ok(FrequencyTable { dimension, counts })
}

/// Frequency tables for every dimension, in tab order.
#[must_use]
pub fn all_frequencies(data: &Table) -> Vec<Result<FrequencyTable, ChartUnavailable>> {
    Dimension::ALL.iter().map(|d| frequency(data, *d)).collect()
}

/// Draw a frequency table as an inline SVG element.
#[must_use]
pub fn render_svg(table: &FrequencyTable) -> String {
    match table.dimension.kind() {
        ChartKind::Bar => render_bar_svg(table),
        ChartKind::Pie => render_pie_svg(table),
    }
}

fn colour(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[allow(clippy::cast_precision_loss)]
fn render_bar_svg(table: &FrequencyTable) -> String {
    let (left, right, top, bottom) = (48.0, 16.0, 40.0, 72.0);
    let plot_width = SVG_WIDTH - left - right;
    let plot_height = SVG_HEIGHT - top - bottom;
    let max = table.counts.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1) as f64;
    let slot = plot_width / table.counts.len().max(1) as f64;
    let bar_width = slot * 0.7;

    let mut svg = svg_open(table.dimension.title());
    let _ = write!(
        svg,
        r##"<line x1="{left}" y1="{base}" x2="{end}" y2="{base}" stroke="#444"/>"##,
        base = top + plot_height,
        end = left + plot_width,
    );
    for (i, (category, n)) in table.counts.iter().enumerate() {
        let height = *n as f64 / max * plot_height;
        let x = left + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = top + plot_height - height;
        let centre = x + bar_width / 2.0;
        let _ = write!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{fill}"><title>{label}: {n}</title></rect><text x="{centre:.1}" y="{count_y:.1}" text-anchor="middle" font-size="12">{n}</text><text x="{centre:.1}" y="{label_y:.1}" text-anchor="middle" font-size="12">{label}</text>"#,
            fill = colour(i),
            label = escape(category),
            count_y = y - 4.0,
            label_y = top + plot_height + 18.0,
        );
    }
    svg.push_str("</svg>");
    svg
}

#[allow(clippy::cast_precision_loss)]
fn render_pie_svg(table: &FrequencyTable) -> String {
    let (cx, cy, r) = (SVG_WIDTH / 2.0 - 80.0, SVG_HEIGHT / 2.0 + 12.0, 130.0);
    let total = table.total().max(1) as f64;

    let mut svg = svg_open(table.dimension.title());
    let mut angle = -TAU / 4.0;
    for (i, (category, n)) in table.counts.iter().enumerate() {
        let share = *n as f64 / total;
        let label = escape(category);
        if table.counts.len() == 1 {
            let _ = write!(
                svg,
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"><title>{label}: {n}</title></circle>"#,
                fill = colour(i),
            );
        } else {
            let end = angle + share * TAU;
            let large = i32::from(share > 0.5);
            let _ = write!(
                svg,
                r#"<path d="M {cx} {cy} L {x1:.2} {y1:.2} A {r} {r} 0 {large} 1 {x2:.2} {y2:.2} Z" fill="{fill}"><title>{label}: {n}</title></path>"#,
                x1 = cx + r * angle.cos(),
                y1 = cy + r * angle.sin(),
                x2 = cx + r * end.cos(),
                y2 = cy + r * end.sin(),
                fill = colour(i),
            );
            angle = end;
        }
        let legend_y = 80.0 + 22.0 * i as f64;
        let _ = write!(
            svg,
            r#"<rect x="{lx}" y="{ry}" width="12" height="12" fill="{fill}"/><text x="{tx}" y="{legend_y}" font-size="13">{label} ({pct:.1}%)</text>"#,
            lx = cx + r + 40.0,
            ry = legend_y - 10.0,
            tx = cx + r + 58.0,
            fill = colour(i),
            pct = share * 100.0,
        );
    }
    svg.push_str("</svg>");
    svg
}

fn svg_open(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {SVG_WIDTH} {SVG_HEIGHT}" role="img" class="chart"><text x="{x}" y="24" text-anchor="middle" font-size="16" font-weight="bold">{title}</text>"#,
        x = SVG_WIDTH / 2.0,
        title = escape(title),
    )
}

/// Draw a frequency table as terminal bars.
///
/// Pie dimensions show percentages instead of raw bars lengths relative to
/// the largest category.
#[must_use]
pub fn render_text(table: &FrequencyTable) -> String {
    let label_width = table
        .counts
        .iter()
        .map(|(c, _)| c.chars().count())
        .chain(std::iter::once(table.dimension.category_label().len()))
        .max()
        .unwrap_or(0);
    let max = table.counts.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    let total = table.total().max(1);

    let mut out = format!("{}\n", table.dimension.title());
    out.push_str(&"=".repeat(table.dimension.title().len()));
    out.push('\n');
    for (category, n) in &table.counts {
        let _ = match table.dimension.kind() {
            ChartKind::Bar => {
                let bar = "#".repeat((n * TEXT_BAR_WIDTH).div_ceil(max));
                writeln!(out, "{category:<label_width$}  {bar} {n}")
            }
            ChartKind::Pie => {
                let bar = "#".repeat((n * TEXT_BAR_WIDTH).div_ceil(total));
                #[allow(clippy::cast_precision_loss)]
                let pct = *n as f64 * 100.0 / total as f64;
                writeln!(out, "{category:<label_width$}  {bar} {n} ({pct:.1}%)")
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(violations: &[&str]) -> Table {
        Table::new(
            vec!["violation".to_string(), "driver_gender".to_string()],
            violations
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let gender = if i % 3 == 0 { "female" } else { "male" };
                    vec![Value::from(*v), Value::from(gender)]
                })
                .collect(),
        )
    }

    #[test]
    fn test_frequency_counts_every_distinct_value() {
        let data = dataset(&["Speeding", "DUI", "Speeding", "Seatbelt", "Speeding", "DUI"]);
        let table = frequency(&data, Dimension::Violation).unwrap();

        assert_eq!(table.counts.len(), 3);
        assert!(table.counts.iter().all(|(_, n)| *n >= 1));
        assert_eq!(table.total(), data.len());
        assert_eq!(table.counts[0], ("Speeding".to_string(), 3));
        assert_eq!(table.counts[1], ("DUI".to_string(), 2));
    }

    #[test]
    fn test_frequency_empty_dataset_is_unavailable() {
        let err = frequency(&Table::empty(), Dimension::Gender).unwrap_err();
        assert_eq!(err.dimension, Dimension::Gender);
        assert_eq!(err.to_string(), "No data available for Driver Gender chart.");
    }

    #[test]
    fn test_frequency_missing_column_is_unavailable() {
        let data = dataset(&["Speeding"]);
        let err = frequency(&data, Dimension::Race).unwrap_err();
        assert_eq!(err.to_string(), "No data available for Driver Race chart.");
    }

    #[test]
    fn test_all_frequencies_in_tab_order() {
        let data = dataset(&["Speeding", "DUI"]);
        let all = all_frequencies(&data);

        assert_eq!(all.len(), 3);
        assert_eq!(all[0].as_ref().unwrap().dimension, Dimension::Violation);
        assert_eq!(all[1].as_ref().unwrap().dimension, Dimension::Gender);
        assert!(all[2].is_err());
    }

    #[test]
    fn test_to_table_uses_chart_labels() {
        let data = dataset(&["Speeding", "DUI", "Speeding"]);
        let table = frequency(&data, Dimension::Violation).unwrap().to_table();

        assert_eq!(table.columns(), ["Violation", "Count"]);
        assert_eq!(table.rows()[0], vec![Value::from("Speeding"), Value::Integer(2)]);
    }

    #[test]
    fn test_dimension_kinds() {
        assert_eq!(Dimension::Violation.kind(), ChartKind::Bar);
        assert_eq!(Dimension::Gender.kind(), ChartKind::Pie);
        assert_eq!(Dimension::Race.kind(), ChartKind::Bar);
        assert_eq!(Dimension::Race.column(), "driver_race");
    }

    #[test]
    fn test_bar_svg_has_one_rect_per_category() {
        let data = dataset(&["Speeding", "DUI", "<script>"]);
        let svg = render_svg(&frequency(&data, Dimension::Violation).unwrap());

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("&lt;script&gt;"));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn test_pie_svg_slices_and_legend() {
        let data = dataset(&["a", "b", "c", "d"]);
        let svg = render_svg(&frequency(&data, Dimension::Gender).unwrap());

        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("male (50.0%)"));
        assert!(svg.contains("female (50.0%)"));
    }

    #[test]
    fn test_pie_svg_single_category_is_a_circle() {
        let data = dataset(&["a"]);
        let svg = render_svg(&frequency(&data, Dimension::Gender).unwrap());

        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_render_text() {
        let data = dataset(&["Speeding", "DUI", "Speeding"]);
        let text = render_text(&frequency(&data, Dimension::Violation).unwrap());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Stops by Violation Type");
        assert!(lines[2].starts_with("Speeding"));
        assert!(lines[2].ends_with(&format!("{} 2", "#".repeat(40))));
        assert!(lines[3].ends_with(&format!("{} 1", "#".repeat(20))));
    }
}
