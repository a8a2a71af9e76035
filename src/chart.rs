use serde::Serialize;
use std::fmt::Write;

use crate::error::{AppError, AppResult};
use crate::result_parser::{SentimentLabel, SentimentTally};

const CANVAS_SIZE: f64 = 480.0;
const RADIUS: f64 = 160.0;
const START_ANGLE_DEG: f64 = 140.0;
const LABEL_DISTANCE: f64 = 1.1;
const PCT_DISTANCE: f64 = 0.6;
const FONT: &str = "Inter, Segoe UI, sans-serif";

/// Green, red, yellow in label order.
const COLORS: [&str; 3] = ["#4CAF50", "#F44336", "#FFC107"];
/// Positive and Negative are pulled out slightly.
const EXPLODE: [f64; 3] = [0.1, 0.1, 0.0];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: SentimentLabel,
    pub value: u32,
    /// Share of the total in percent.
    pub share: f64,
    pub color: &'static str,
    /// Offset of the wedge from the center, as a fraction of the radius.
    pub explode: f64,
    /// Counter-clockwise angles in degrees, 0 pointing right.
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Slice {
    pub fn pct_label(&self) -> String {
        format!("{:.1}%", self.share)
    }

    fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PieChart {
    slices: Vec<Slice>,
}

pub fn generate_pie_chart(tally: &SentimentTally) -> AppResult<PieChart> {
    let total = tally.total();
    if total == 0 {
        return Err(AppError::Chart("all sentiment values are zero, nothing to draw".to_string()));
    }

    let mut angle = START_ANGLE_DEG;
    let slices = tally
        .entries()
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let fraction = value as f64 / total as f64;
            let start_angle = angle;
            angle += fraction * 360.0;
            Slice {
                label,
                value,
                share: fraction * 100.0,
                color: COLORS[i],
                explode: EXPLODE[i],
                start_angle,
                end_angle: angle,
            }
        })
        .collect();

    Ok(PieChart { slices })
}

fn point(cx: f64, cy: f64, r: f64, angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    // SVG y grows downwards.
    (cx + r * rad.cos(), cy - r * rad.sin())
}

impl PieChart {
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.slices.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn to_svg(&self) -> String {
        let center = CANVAS_SIZE / 2.0;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{s:.0}' height='{s:.0}' viewBox='0 0 {s:.0} {s:.0}' role='img' aria-label='Sentiment distribution'>",
            s = CANVAS_SIZE
        );
        let _ = writeln!(svg, "  <defs>");
        let _ = writeln!(svg, "    <filter id='shadow' x='-20%' y='-20%' width='140%' height='140%'>");
        let _ = writeln!(
            svg,
            "      <feDropShadow dx='4' dy='-4' stdDeviation='2' flood-color='#000' flood-opacity='0.35'/>"
        );
        let _ = writeln!(svg, "    </filter>");
        let _ = writeln!(svg, "  </defs>");

        for slice in self.slices.iter().filter(|s| s.span() > 0.0) {
            let (cx, cy) = point(center, center, slice.explode * RADIUS, slice.mid_angle());
            let _ = writeln!(svg, "  <g class='slice' data-label='{}'>", slice.label);

            if slice.span() >= 360.0 - 1e-9 {
                let _ = writeln!(
                    svg,
                    "    <circle cx='{cx:.2}' cy='{cy:.2}' r='{RADIUS:.2}' fill='{}' filter='url(#shadow)'/>",
                    slice.color
                );
            } else {
                let (x1, y1) = point(cx, cy, RADIUS, slice.start_angle);
                let (x2, y2) = point(cx, cy, RADIUS, slice.end_angle);
                let large_arc = if slice.span() > 180.0 { 1 } else { 0 };
                let _ = writeln!(
                    svg,
                    "    <path d='M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {RADIUS:.2} {RADIUS:.2} 0 {large_arc} 0 {x2:.2} {y2:.2} Z' fill='{}' filter='url(#shadow)'/>",
                    slice.color
                );
            }

            let mid = slice.mid_angle();
            let (lx, ly) = point(cx, cy, RADIUS * LABEL_DISTANCE, mid);
            let anchor = if mid.to_radians().cos() >= 0.0 { "start" } else { "end" };
            let _ = writeln!(
                svg,
                "    <text x='{lx:.2}' y='{ly:.2}' text-anchor='{anchor}' dominant-baseline='middle' font-family='{FONT}' font-size='16' fill='#262730'>{}</text>",
                slice.label
            );
            let (px, py) = point(cx, cy, RADIUS * PCT_DISTANCE, mid);
            let _ = writeln!(
                svg,
                "    <text x='{px:.2}' y='{py:.2}' text-anchor='middle' dominant-baseline='middle' font-family='{FONT}' font-size='14' fill='#262730'>{}</text>",
                slice.pct_label()
            );
            let _ = writeln!(svg, "  </g>");
        }

        svg.push_str("</svg>\n");
        svg
    }
}
