// Markdown report writer.
//
// The layout (title, timestamp line, chart embed, three-column table) is what
// downstream readers of report.md depend on. Column order and two-decimal
// sentiment rounding must not change.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::RankedReport;

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "report.md";

/// Render the report as markdown. `chart_file_name` is embedded as a path
/// relative to the report itself.
pub fn render_report(report: &RankedReport, chart_file_name: &str) -> String {
    let mut md = String::new();
    md.push_str("# Daily Trend Insight Report\n\n");
    md.push_str(&format!(
        "**Generated at:** {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str(&format!("## Top {} Topics Today\n\n", report.rows.len()));
    md.push_str(&format!(
        "![Top {} Topics](./{})\n\n",
        report.rows.len(),
        chart_file_name
    ));

    md.push_str("## Topic Details and Sentiment\n\n");
    md.push_str("| Topic Keywords | Post Count | Mean Sentiment (-1 negative ~ 1 positive) |\n");
    md.push_str("|---|:---:|:---:|\n");
    for row in &report.rows {
        md.push_str(&format!(
            "| `{}` | {} | **{:.2}** |\n",
            row.name, row.size, row.mean_sentiment
        ));
    }

    md
}

/// Write `report.md` into `output_dir`, creating the directory if needed.
pub fn write_report(
    report: &RankedReport,
    chart_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let chart_file_name = chart_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Chart path has no file name: {}", chart_path.display()))?;

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let path = output_dir.join(REPORT_FILE_NAME);
    std::fs::write(&path, render_report(report, chart_file_name))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), topics = report.rows.len(), "Report written");
    Ok(path)
}

/// Write the report as JSON next to the markdown (`--json`).
pub fn write_json(report: &RankedReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let path = output_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
