//! Geometry for the rentability simulation charts.
//!
//! All coordinates are in the SVG user space the site draws into: an 800×300 view box
//! for the line chart, a 240px tall plot for the bars and a 200×200 donut.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

pub const LINE_VIEW_BOX: (f64, f64) = (800.0, 300.0);
const LINE_LEFT: f64 = 60.0;
const LINE_WIDTH: f64 = 680.0;
const LINE_BASELINE: f64 = 252.0;
const LINE_PLOT_HEIGHT: f64 = 192.0;
const GRID_TOP: f64 = 60.0;
const GRID_STEP: f64 = 48.0;
const GRID_LINES: usize = 5;

const BAR_PLOT_HEIGHT: f64 = 240.0;

const PIE_CENTER: f64 = 100.0;
const PIE_RADIUS: f64 = 80.0;
const PIE_START_ANGLE: f64 = -90.0;

/// Animation length of a chart switch, in milliseconds
pub const ANIMATION_MS: u64 = 800;

/// One year of the investment projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub period: String,
    pub investment: f64,
    pub revenue: f64,
    /// Accumulated profit
    pub profit: f64,
    /// Yearly return in percent
    pub roi: f64,
}

impl ProjectionRow {
    fn new(period: &str, investment: f64, revenue: f64, profit: f64, roi: f64) -> Self {
        Self {
            period: period.to_string(),
            investment,
            revenue,
            profit,
            roi,
        }
    }

    /// "Ano 10" -> "10"
    pub fn short_label(&self) -> &str {
        self.period.strip_prefix("Ano ").unwrap_or(&self.period)
    }
}

/// Projection horizon in years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "5")]
    Five,
    #[default]
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "15")]
    Fifteen,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Five, Horizon::Ten, Horizon::Fifteen];

    pub fn years(&self) -> u32 {
        match self {
            Horizon::Five => 5,
            Horizon::Ten => 10,
            Horizon::Fifteen => 15,
        }
    }

    pub fn from_years(years: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.years() == years)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} anos", self.years())
    }
}

/// Projection tables per horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDatasets {
    pub five_years: Vec<ProjectionRow>,
    pub ten_years: Vec<ProjectionRow>,
    pub fifteen_years: Vec<ProjectionRow>,
}

impl ChartDatasets {
    pub fn rows(&self, horizon: Horizon) -> &[ProjectionRow] {
        match horizon {
            Horizon::Five => &self.five_years,
            Horizon::Ten => &self.ten_years,
            Horizon::Fifteen => &self.fifteen_years,
        }
    }
}

impl Default for ChartDatasets {
    fn default() -> Self {
        let r = ProjectionRow::new;
        let ten_years = vec![
            r("Ano 1", 320000.0, 38400.0, 38400.0, 12.0),
            r("Ano 2", 320000.0, 42240.0, 80640.0, 13.2),
            r("Ano 3", 320000.0, 46464.0, 127104.0, 14.5),
            r("Ano 4", 320000.0, 51110.0, 178214.0, 16.0),
            r("Ano 5", 320000.0, 56221.0, 234435.0, 17.6),
            r("Ano 6", 320000.0, 61843.0, 296278.0, 19.3),
            r("Ano 7", 320000.0, 68027.0, 364305.0, 21.3),
            r("Ano 8", 320000.0, 74830.0, 439135.0, 23.4),
            r("Ano 9", 320000.0, 82313.0, 521448.0, 25.7),
            r("Ano 10", 320000.0, 90544.0, 611992.0, 28.3),
        ];
        let fifteen_years = vec![
            r("Ano 1", 320000.0, 38400.0, 38400.0, 12.0),
            r("Ano 3", 320000.0, 46464.0, 127104.0, 14.5),
            r("Ano 5", 320000.0, 56221.0, 234435.0, 17.6),
            r("Ano 7", 320000.0, 68027.0, 364305.0, 21.3),
            r("Ano 10", 320000.0, 90544.0, 611992.0, 28.3),
            r("Ano 12", 320000.0, 109853.0, 831847.0, 34.3),
            r("Ano 15", 320000.0, 142847.0, 1284705.0, 44.6),
        ];
        Self {
            five_years: ten_years[..5].to_vec(),
            ten_years,
            fifteen_years,
        }
    }
}

/// Easing used by the chart entry animation
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Animation progress in `[0, 1]` after `elapsed_ms`
pub fn animation_progress(elapsed_ms: u64, reduced_motion: bool) -> f64 {
    if reduced_motion {
        return 1.0;
    }
    ease_out_cubic(elapsed_ms as f64 / ANIMATION_MS as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn max_of(rows: &[ProjectionRow], value: impl Fn(&ProjectionRow) -> f64) -> f64 {
    rows.iter().map(value).fold(0.0, f64::max)
}

/// Accumulated profit and ROI polylines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub profit: Vec<Point>,
    pub roi: Vec<Point>,
    pub labels: Vec<String>,
    pub grid: Vec<f64>,
}

impl LineChart {
    pub fn compute(rows: &[ProjectionRow], progress: f64) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        let max_profit = max_of(rows, |r| r.profit);
        let max_roi = max_of(rows, |r| r.roi);
        let step = if rows.len() > 1 {
            LINE_WIDTH / (rows.len() - 1) as f64
        } else {
            0.0
        };

        let y_for = |value: f64, max: f64| {
            if max > 0.0 {
                LINE_BASELINE - (value / max) * LINE_PLOT_HEIGHT * progress
            } else {
                LINE_BASELINE
            }
        };

        let mut profit = Vec::with_capacity(rows.len());
        let mut roi = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let x = LINE_LEFT + i as f64 * step;
            profit.push(Point {
                x,
                y: y_for(row.profit, max_profit),
            });
            roi.push(Point {
                x,
                y: y_for(row.roi, max_roi),
            });
        }

        Self {
            profit,
            roi,
            labels: rows.iter().map(|r| r.short_label().to_string()).collect(),
            grid: (0..GRID_LINES)
                .map(|i| GRID_TOP + i as f64 * GRID_STEP)
                .collect(),
        }
    }

    pub fn profit_points(&self) -> String {
        points_attr(&self.profit)
    }

    pub fn roi_points(&self) -> String {
        points_attr(&self.roi)
    }

    pub fn to_svg(&self) -> String {
        let (width, height) = LINE_VIEW_BOX;
        let mut svg = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}">"#);
        for y in &self.grid {
            let _ = write!(
                svg,
                r##"<line x1="{LINE_LEFT}" y1="{y}" x2="{}" y2="{y}" stroke="#e5e7eb" stroke-width="1" stroke-dasharray="5,5"/>"##,
                LINE_LEFT + LINE_WIDTH
            );
        }
        let _ = write!(
            svg,
            r##"<polyline fill="none" stroke="#3b82f6" stroke-width="4" points="{}"/>"##,
            self.profit_points()
        );
        let _ = write!(
            svg,
            r##"<polyline fill="none" stroke="#10b981" stroke-width="3" stroke-dasharray="8,4" points="{}"/>"##,
            self.roi_points()
        );
        for ((profit, roi), label) in self.profit.iter().zip(&self.roi).zip(&self.labels) {
            let _ = write!(
                svg,
                r##"<circle cx="{}" cy="{}" r="6" fill="#3b82f6"/><circle cx="{}" cy="{}" r="4" fill="#10b981"/><text x="{}" y="275" text-anchor="middle">{label}</text>"##,
                profit.x, profit.y, roi.x, roi.y, profit.x
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub period: String,
    pub height: f64,
    /// Revenue in thousands, e.g. "R$ 38k"
    pub label: String,
}

/// Yearly revenue bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn compute(rows: &[ProjectionRow], progress: f64) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        let max_revenue = max_of(rows, |r| r.revenue);
        let bars = rows
            .iter()
            .map(|row| Bar {
                period: row.period.clone(),
                height: if max_revenue > 0.0 {
                    row.revenue / max_revenue * BAR_PLOT_HEIGHT * progress
                } else {
                    0.0
                },
                label: format_thousands(row.revenue),
            })
            .collect();
        Self { bars }
    }
}

pub fn format_thousands(value: f64) -> String {
    format!("R$ {:.0}k", value / 1000.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: String,
    pub start_angle: f64,
    pub end_angle: f64,
    /// SVG path data for the wedge
    pub path: String,
}

/// Initial investment against net gain at the end of the horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn compute(rows: &[ProjectionRow], progress: f64) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Self { slices: Vec::new() };
        };

        let initial = first.investment.max(0.0);
        let net_gain = (last.profit - first.investment).max(0.0);
        let parts = [
            ("Investimento Inicial", initial, "#ef4444"),
            ("Lucro Líquido", net_gain, "#10b981"),
        ];

        let total: f64 = parts.iter().map(|(_, value, _)| value).sum();
        if total <= 0.0 {
            return Self { slices: Vec::new() };
        }

        let mut cursor = PIE_START_ANGLE;
        let mut slices = Vec::new();
        for (label, value, color) in parts {
            let share = value / total * 360.0;
            // a full circle collapses to a zero-length arc
            let sweep = (share * progress).min(359.99);
            let start_angle = cursor;
            let end_angle = cursor + sweep;
            cursor += share;

            if value <= 0.0 {
                continue;
            }
            slices.push(PieSlice {
                label: label.to_string(),
                value,
                color: color.to_string(),
                start_angle,
                end_angle,
                path: wedge_path(start_angle, end_angle),
            });
        }
        Self { slices }
    }

    pub fn to_svg(&self, caption: &str) -> String {
        let mut svg =
            String::from(r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200">"#);
        for slice in &self.slices {
            let _ = write!(svg, r#"<path d="{}" fill="{}"/>"#, slice.path, slice.color);
        }
        let _ = write!(
            svg,
            r#"<circle cx="100" cy="100" r="40" fill="white"/><text x="100" y="95" text-anchor="middle">{caption}</text><text x="100" y="110" text-anchor="middle">ROI Total</text></svg>"#
        );
        svg
    }
}

fn polar(angle_deg: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point {
        x: PIE_CENTER + PIE_RADIUS * rad.cos(),
        y: PIE_CENTER + PIE_RADIUS * rad.sin(),
    }
}

fn wedge_path(start_angle: f64, end_angle: f64) -> String {
    let start = polar(start_angle);
    let end = polar(end_angle);
    let large_arc = if end_angle - start_angle > 180.0 { 1 } else { 0 };
    format!(
        "M {c} {c} L {} {} A {r} {r} 0 {large_arc} 1 {} {} Z",
        start.x,
        start.y,
        end.x,
        end.y,
        c = PIE_CENTER,
        r = PIE_RADIUS
    )
}

/// Headline figure of the simulation: ROI of the last projected year
pub fn headline_roi(rows: &[ProjectionRow]) -> Option<f64> {
    rows.last().map(|r| r.roi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> Vec<ProjectionRow> {
        ChartDatasets::default().ten_years
    }

    #[test]
    fn test_default_tables() {
        let data = ChartDatasets::default();
        assert_eq!(data.rows(Horizon::Five).len(), 5);
        assert_eq!(data.rows(Horizon::Ten).len(), 10);
        assert_eq!(data.rows(Horizon::Fifteen).len(), 7);
        assert_eq!(headline_roi(data.rows(Horizon::Fifteen)), Some(44.6));
        assert_eq!(Horizon::from_years(15), Some(Horizon::Fifteen));
        assert_eq!(Horizon::from_years(7), None);
    }

    #[test]
    fn test_line_chart_spans_plot() {
        let chart = LineChart::compute(&ten(), 1.0);
        let first = chart.profit.first().unwrap();
        let last = chart.profit.last().unwrap();
        assert_eq!(first.x, 60.0);
        assert_eq!(last.x, 740.0);
        // the maximum sits at the top of the plot area
        assert_eq!(last.y, 60.0);
        assert_eq!(chart.roi.last().unwrap().y, 60.0);
        assert_eq!(chart.labels[9], "10");
        assert_eq!(chart.grid, vec![60.0, 108.0, 156.0, 204.0, 252.0]);
    }

    #[test]
    fn test_line_chart_at_zero_progress_is_flat() {
        let chart = LineChart::compute(&ten(), 0.0);
        assert!(chart.profit.iter().all(|p| p.y == 252.0));
    }

    #[test]
    fn test_single_row_does_not_divide_by_zero() {
        let rows = vec![ten()[0].clone()];
        let chart = LineChart::compute(&rows, 1.0);
        assert_eq!(chart.profit, vec![Point { x: 60.0, y: 60.0 }]);
        assert_eq!(chart.profit_points(), "60,60");
    }

    #[test]
    fn test_bar_heights_and_labels() {
        let chart = BarChart::compute(&ten(), 1.0);
        let last = chart.bars.last().unwrap();
        assert_eq!(last.height, 240.0);
        assert_eq!(last.label, "R$ 91k");
        assert_eq!(chart.bars[0].label, "R$ 38k");

        let half = BarChart::compute(&ten(), 0.5);
        assert_eq!(half.bars.last().unwrap().height, 120.0);
    }

    #[test]
    fn test_pie_slices_cover_circle() {
        let chart = PieChart::compute(&ten(), 1.0);
        assert_eq!(chart.slices.len(), 2);
        let investment = &chart.slices[0];
        let gain = &chart.slices[1];
        assert_eq!(investment.value, 320000.0);
        assert_eq!(gain.value, 291992.0);
        assert_eq!(investment.start_angle, -90.0);
        assert!((gain.end_angle - 270.0).abs() < 1e-9);
        assert!(investment.path.starts_with("M 100 100 L 100 20 A 80 80 0 1 1"));
    }

    #[test]
    fn test_pie_with_loss_shows_only_investment() {
        let data = ChartDatasets::default();
        let chart = PieChart::compute(data.rows(Horizon::Five), 1.0);
        assert_eq!(chart.slices.len(), 1);
        assert_eq!(chart.slices[0].label, "Investimento Inicial");
        assert!(chart.slices[0].end_angle - chart.slices[0].start_angle < 360.0);
    }

    #[test]
    fn test_easing() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(animation_progress(0, true), 1.0);
        assert_eq!(animation_progress(800, false), 1.0);
    }
}
