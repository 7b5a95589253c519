// Bar chart of post counts per ranked topic, written as a standalone SVG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::RankedReport;

/// File name of the chart inside the output directory.
pub const CHART_FILE_NAME: &str = "topic_chart.svg";

/// Produces a chart image for a report and returns its path.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, report: &RankedReport, output_dir: &Path) -> Result<PathBuf>;
}

/// Vertical bar chart: one bar per topic, keyword names as rotated x labels.
pub struct SvgBarChart {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgBarChart {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

// Plot margins. The bottom one leaves room for rotated labels.
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 260.0;
const BAR_FILL: &str = "#87ceeb";
const LABEL_MAX_CHARS: usize = 40;

impl SvgBarChart {
    /// Build the SVG document for a report.
    pub fn to_svg(&self, report: &RankedReport) -> String {
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let plot_w = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_h;

        let max_size = report.rows.iter().map(|r| r.size).max().unwrap_or(0).max(1);
        let y_max = nice_ceiling(max_size);
        let slot = plot_w / report.rows.len().max(1) as f64;
        let bar_w = slot * 0.8;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
            w = self.width,
            h = self.height
        ));
        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"40\" text-anchor=\"middle\" font-size=\"24\">Top {} Topics of the Day</text>\n",
            width / 2.0,
            report.rows.len()
        ));
        svg.push_str(&format!(
            "<text x=\"20\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"16\" transform=\"rotate(-90 20 {y:.1})\">Number of Posts</text>\n",
            y = MARGIN_TOP + plot_h / 2.0
        ));

        // Y axis with five gridlines.
        for step in 0..=5 {
            let value = y_max * step / 5;
            let y = baseline - plot_h * value as f64 / y_max as f64;
            svg.push_str(&format!(
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#dddddd\"/>\n",
                MARGIN_LEFT + plot_w
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"12\">{value}</text>\n",
                MARGIN_LEFT - 8.0,
                y + 4.0
            ));
        }
        svg.push_str(&format!(
            "<line x1=\"{MARGIN_LEFT}\" y1=\"{baseline:.1}\" x2=\"{:.1}\" y2=\"{baseline:.1}\" stroke=\"black\"/>\n",
            MARGIN_LEFT + plot_w
        ));

        for (i, row) in report.rows.iter().enumerate() {
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let bar_h = plot_h * row.size as f64 / y_max as f64;
            svg.push_str(&format!(
                "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" fill=\"{BAR_FILL}\"><title>{}: {}</title></rect>\n",
                baseline - bar_h,
                escape_xml(&row.name),
                row.size
            ));

            let label_x = x + bar_w / 2.0;
            let label_y = baseline + 14.0;
            svg.push_str(&format!(
                "<text x=\"{label_x:.1}\" y=\"{label_y:.1}\" text-anchor=\"end\" font-size=\"11\" transform=\"rotate(-45 {label_x:.1} {label_y:.1})\">{}</text>\n",
                escape_xml(&super::truncate_chars(&row.name, LABEL_MAX_CHARS))
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl ChartRenderer for SvgBarChart {
    fn render(&self, report: &RankedReport, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        let path = output_dir.join(CHART_FILE_NAME);
        std::fs::write(&path, self.to_svg(report))
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;

        info!(path = %path.display(), bars = report.rows.len(), "Chart written");
        Ok(path)
    }
}

/// Round an axis maximum up to 1, 2 or 5 times a power of ten.
fn nice_ceiling(value: usize) -> usize {
    let mut magnitude = 1;
    loop {
        for factor in [1, 2, 5] {
            if factor * magnitude >= value {
                return factor * magnitude;
            }
        }
        magnitude *= 10;
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
