// Daily trend pipeline: fetch, cluster, score, rank, write.
//
// Stages run strictly one after another. The clustering engine is
// synchronous and can take a while, so it runs on the blocking pool.
// The chart is rendered before report.md is written, so a report never
// points at a chart that failed to render.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::config::{parse_subreddits, DEFAULT_SUBREDDITS};
use crate::error::PipelineError;
use crate::models::{DocumentBatch, RankedReport};
use crate::output::chart::ChartRenderer;
use crate::output::markdown;
use crate::report;
use crate::sentiment::aggregate::aggregate;
use crate::sentiment::traits::SentimentScorer;
use crate::sources::traits::DocumentSource;
use crate::topics::clusterer::{TopicClusterer, DEFAULT_MIN_TOPIC_SIZE};
use crate::topics::normalize::normalize_batch;
use crate::topics::ranker::{self, OutlierPolicy, DEFAULT_TOP_N};
use crate::topics::traits::ClusteringEngine;

/// Knobs for a single run. Built from `Config` plus CLI overrides.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub sources: BTreeSet<String>,
    pub per_source_limit: usize,
    pub exclude_pinned: bool,
    pub min_topic_size: usize,
    pub top_n: usize,
    pub outlier_policy: OutlierPolicy,
    pub output_dir: PathBuf,
    /// Also write report.json next to report.md
    pub write_json: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            sources: parse_subreddits(DEFAULT_SUBREDDITS),
            per_source_limit: 50,
            exclude_pinned: true,
            min_topic_size: DEFAULT_MIN_TOPIC_SIZE,
            top_n: DEFAULT_TOP_N,
            outlier_policy: OutlierPolicy::default(),
            output_dir: PathBuf::from("output"),
            write_json: false,
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The source returned nothing. No files were written.
    NoDocuments,
    /// Chart and report were written. The report may have no rows when
    /// every topic was filtered out by ranking.
    Written {
        report: RankedReport,
        report_path: PathBuf,
        chart_path: PathBuf,
        json_path: Option<PathBuf>,
        documents: usize,
    },
}

/// Run the full pipeline once.
pub async fn run(
    source: &dyn DocumentSource,
    engine: Arc<dyn ClusteringEngine>,
    scorer: &dyn SentimentScorer,
    renderer: &dyn ChartRenderer,
    settings: &RunSettings,
) -> Result<RunOutcome> {
    // Validate before doing any network work
    let clusterer = TopicClusterer::new(engine, settings.min_topic_size)?;

    // Step 1: Collect documents
    println!(
        "Fetching top posts from {} source(s) (up to {} each)...",
        settings.sources.len(),
        settings.per_source_limit
    );
    let documents = source
        .fetch(
            &settings.sources,
            settings.per_source_limit,
            settings.exclude_pinned,
        )
        .await
        .context("Failed to fetch documents")?;

    let batch = match DocumentBatch::new(documents) {
        Ok(batch) => batch,
        Err(PipelineError::EmptyInput) => {
            warn!("No documents collected, nothing to report");
            return Ok(RunOutcome::NoDocuments);
        }
        Err(e) => return Err(e.into()),
    };
    info!(documents = batch.len(), "Documents collected");

    // Step 2: Normalize and cluster
    println!("Clustering {} posts into topics...", batch.len());
    let normalized = normalize_batch(&batch);
    let clustering = tokio::task::spawn_blocking(move || clusterer.cluster(&normalized))
        .await
        .map_err(|e| PipelineError::Engine(anyhow::anyhow!("clustering task failed: {e}")))??;

    // Step 3: Score sentiment on the raw text
    println!("Scoring sentiment...");
    let scores = scorer
        .score_batch(&batch.full_texts())
        .await
        .map_err(PipelineError::Scoring)?;
    let sentiments = aggregate(&clustering.assignments, &scores)?;

    // Step 4: Rank and assemble
    let ranked = ranker::rank(&clustering.topics, settings.top_n, settings.outlier_policy);
    if ranked.is_empty() {
        warn!(
            documents = batch.len(),
            "No topics left after ranking, writing an empty report"
        );
    }
    let report = report::assemble(&ranked, &sentiments, Utc::now())?;

    // Step 5: Chart first, then the report that embeds it
    let chart_path = renderer
        .render(&report, &settings.output_dir)
        .map_err(PipelineError::Render)?;
    let report_path = markdown::write_report(&report, &chart_path, &settings.output_dir)?;
    let json_path = if settings.write_json {
        Some(markdown::write_json(&report, &settings.output_dir)?)
    } else {
        None
    };

    info!(
        topics = report.rows.len(),
        report = %report_path.display(),
        "Run complete"
    );

    Ok(RunOutcome::Written {
        report,
        report_path,
        chart_path,
        json_path,
        documents: batch.len(),
    })
}
