// Status display: configuration, model presence, last report.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::output::chart::CHART_FILE_NAME;
use crate::output::markdown::REPORT_FILE_NAME;
use crate::topics::download;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    let subreddits: Vec<&str> = config.subreddits.iter().map(String::as_str).collect();
    println!("Subreddits: {}", subreddits.join(", "));
    println!(
        "Fetch: top {} per subreddit, window '{}', pinned posts {}",
        config.per_source_limit,
        config.time_window,
        if config.include_pinned {
            "included"
        } else {
            "excluded"
        }
    );
    println!(
        "Clustering: min topic size {}, similarity threshold {:.2}",
        config.min_topic_size, config.similarity_threshold
    );
    println!(
        "Ranking: top {}, outlier policy {:?}",
        config.top_n, config.outlier_policy
    );

    // Embedding model
    let embed_dir = download::embedding_model_dir(&config.model_dir);
    if download::embedding_files_present(&config.model_dir) {
        let size = dir_size(&embed_dir).map(format_bytes);
        println!(
            "Embedding model: {} ({})",
            embed_dir.display(),
            size.unwrap_or_else(|| "unknown size".to_string())
        );
    } else {
        println!("Embedding model: not downloaded");
        println!("  Run `trendscope download-model` to fetch it");
    }

    // Last report
    let report_path = config.output_dir.join(REPORT_FILE_NAME);
    match modified_at(&report_path) {
        Some(when) => {
            println!(
                "Last report: {} (written {})",
                report_path.display(),
                when.format("%Y-%m-%d %H:%M:%S UTC")
            );
            if !config.output_dir.join(CHART_FILE_NAME).exists() {
                println!("  Chart file is missing");
            }
        }
        None => {
            println!("Last report: never");
            println!("  Run `trendscope run` to generate one");
        }
    }

    Ok(())
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

fn dir_size(dir: &Path) -> Option<u64> {
    let entries = std::fs::read_dir(dir).ok()?;
    Some(
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.metadata().ok())
            .filter(|m| m.is_file())
            .map(|m| m.len())
            .sum(),
    )
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
