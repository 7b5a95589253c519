// Composition tests: the daily pipeline wired to fake collaborators.
//
// These tests exercise the data flow between stages:
//   source -> normalize -> cluster -> score -> aggregate -> rank -> chart -> report
// without network calls or model files. Output goes to per-test directories
// under the system temp dir.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use trendscope::error::PipelineError;
use trendscope::models::{Document, Topic, TopicInfo};
use trendscope::output::chart::{ChartRenderer, SvgBarChart, CHART_FILE_NAME};
use trendscope::pipeline::daily::{run, RunOutcome, RunSettings};
use trendscope::report::assemble;
use trendscope::sentiment::traits::SentimentScorer;
use trendscope::sources::traits::DocumentSource;
use trendscope::topics::ranker::{rank, OutlierPolicy};
use trendscope::topics::traits::{ClusteringEngine, EngineOutput, EngineTopic};

// ============================================================
// Fakes
// ============================================================

struct FakeSource {
    documents: Vec<Document>,
}

#[async_trait]
impl DocumentSource for FakeSource {
    async fn fetch(
        &self,
        _source_names: &std::collections::BTreeSet<String>,
        _per_source_limit: usize,
        _exclude_pinned: bool,
    ) -> anyhow::Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

/// Labels by keyword: "space" -> 0, "chip" -> 1, anything else -> -1.
#[derive(Default)]
struct KeywordEngine {
    seen: Mutex<Vec<String>>,
}

impl ClusteringEngine for KeywordEngine {
    fn fit_and_assign(&self, texts: &[String], _min: usize) -> anyhow::Result<EngineOutput> {
        self.seen.lock().unwrap().extend(texts.iter().cloned());
        let labels = texts
            .iter()
            .map(|t| {
                if t.contains("space") {
                    0
                } else if t.contains("chip") {
                    1
                } else {
                    -1
                }
            })
            .collect();
        let topic = |label: i64, name: &str| EngineTopic {
            label,
            name: name.to_string(),
            size: 0,
        };
        Ok(EngineOutput {
            labels,
            topics: vec![
                topic(-1, "-1_misc"),
                topic(0, "0_space_rocket_launch"),
                topic(1, "1_chip_fab_wafer"),
            ],
        })
    }
}

struct FailingEngine;

impl ClusteringEngine for FailingEngine {
    fn fit_and_assign(&self, _: &[String], _: usize) -> anyhow::Result<EngineOutput> {
        anyhow::bail!("model exploded")
    }
}

/// "good" -> 0.5, "bad" -> -0.5, otherwise 0.0. Records what it was given.
#[derive(Default)]
struct WordScorer {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl SentimentScorer for WordScorer {
    async fn score_text(&self, text: &str) -> anyhow::Result<f64> {
        self.seen.lock().unwrap().push(text.to_string());
        let lower = text.to_lowercase();
        Ok(if lower.contains("good") {
            0.5
        } else if lower.contains("bad") {
            -0.5
        } else {
            0.0
        })
    }
}

struct FailingScorer;

#[async_trait]
impl SentimentScorer for FailingScorer {
    async fn score_text(&self, _: &str) -> anyhow::Result<f64> {
        anyhow::bail!("scorer offline")
    }
}

struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn render(&self, _: &trendscope::models::RankedReport, _: &Path) -> anyhow::Result<PathBuf> {
        anyhow::bail!("disk full")
    }
}

fn corpus() -> Vec<Document> {
    vec![
        Document::new("Space Rocket launch GOOD!", "https://example.com/rocket"),
        Document::new("space station", "good progress on the dock"),
        Document::new("Deep space probe", "telemetry update"),
        Document::new("Private space race", ""),
        Document::new("Chip shortage", "bad news for carmakers"),
        Document::new("chip fab", "bad yields again"),
        Document::new("New chip", "good benchmarks"),
        Document::new("Weekly discussion thread", ""),
    ]
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "trendscope-composition-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn settings(dir: &Path) -> RunSettings {
    RunSettings {
        min_topic_size: 3,
        top_n: 10,
        output_dir: dir.to_path_buf(),
        ..RunSettings::default()
    }
}

// ============================================================
// Full run
// ============================================================

#[tokio::test]
async fn full_run_writes_chart_and_report() {
    let dir = output_dir("full");
    let source = FakeSource {
        documents: corpus(),
    };
    let engine = Arc::new(KeywordEngine::default());
    let scorer = WordScorer::default();

    let outcome = run(
        &source,
        engine.clone(),
        &scorer,
        &SvgBarChart::default(),
        &RunSettings {
            write_json: true,
            ..settings(&dir)
        },
    )
    .await
    .unwrap();

    let RunOutcome::Written {
        report,
        report_path,
        chart_path,
        json_path,
        documents,
    } = outcome
    else {
        panic!("expected a written report");
    };

    assert_eq!(documents, 8);
    assert_eq!(chart_path, dir.join(CHART_FILE_NAME));
    assert!(chart_path.exists());

    // Outlier is not in slot 0 after sorting, so it stays in the ranking
    let ranked: Vec<(i64, usize)> = report
        .rows
        .iter()
        .map(|r| (r.topic.label(), r.size))
        .collect();
    assert_eq!(ranked, vec![(0, 4), (1, 3), (-1, 1)]);

    let md = std::fs::read_to_string(&report_path).unwrap();
    assert!(md.contains("![Top 3 Topics](./topic_chart.svg)"));
    assert!(md.contains("| `0_space_rocket_launch` | 4 | **0.25** |"));
    assert!(md.contains("| `1_chip_fab_wafer` | 3 | **-0.17** |"));
    assert!(md.contains("| `-1_misc` | 1 | **0.00** |"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path.unwrap()).unwrap()).unwrap();
    assert_eq!(json["rows"][2]["label"], -1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn engine_sees_normalized_text_and_scorer_sees_raw_text() {
    let dir = output_dir("texts");
    let source = FakeSource {
        documents: corpus(),
    };
    let engine = Arc::new(KeywordEngine::default());
    let scorer = WordScorer::default();

    run(&source, engine.clone(), &scorer, &SvgBarChart::default(), &settings(&dir))
        .await
        .unwrap();

    let clustered = engine.seen.lock().unwrap().clone();
    let scored = scorer.seen.lock().unwrap().clone();
    assert_eq!(clustered.len(), 8);
    assert_eq!(scored.len(), 8);
    assert_eq!(clustered[0], "space rocket launch good ");
    assert_eq!(
        scored[0],
        "Space Rocket launch GOOD! https://example.com/rocket"
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn always_policy_drops_outlier_anywhere() {
    let dir = output_dir("always");
    let source = FakeSource {
        documents: corpus(),
    };

    let outcome = run(
        &source,
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &RunSettings {
            outlier_policy: OutlierPolicy::Always,
            ..settings(&dir)
        },
    )
    .await
    .unwrap();

    let RunOutcome::Written { report, .. } = outcome else {
        panic!("expected a written report");
    };
    assert!(report.rows.iter().all(|r| !r.topic.is_outlier()));
    assert_eq!(report.rows.len(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}

// ============================================================
// Halts and failures
// ============================================================

#[tokio::test]
async fn zero_documents_halts_without_report() {
    let dir = output_dir("empty");
    let outcome = run(
        &FakeSource { documents: vec![] },
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &settings(&dir),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, RunOutcome::NoDocuments));
    assert!(!dir.join("report.md").exists());
}

#[tokio::test]
async fn single_document_writes_empty_report() {
    let dir = output_dir("single");
    let outcome = run(
        &FakeSource {
            documents: vec![Document::new("Lonely space post", "")],
        },
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &settings(&dir),
    )
    .await
    .unwrap();

    // One usable document skips the engine; the lone outlier leads and is dropped
    let RunOutcome::Written {
        report,
        report_path,
        chart_path,
        documents,
        ..
    } = outcome
    else {
        panic!("expected a written report");
    };
    assert_eq!(documents, 1);
    assert!(report.rows.is_empty());
    assert!(chart_path.exists());

    let md = std::fs::read_to_string(&report_path).unwrap();
    assert!(md.contains("## Top 0 Topics Today"));
    assert!(md.trim_end().ends_with("|---|:---:|:---:|"));
}

#[tokio::test]
async fn all_outlier_batch_still_writes_report() {
    let dir = output_dir("all-outliers");
    let documents = (0..20)
        .map(|i| Document::new(format!("Weekly thread {i}"), "nothing clusters here"))
        .collect();
    let outcome = run(
        &FakeSource { documents },
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &settings(&dir),
    )
    .await
    .unwrap();

    let RunOutcome::Written {
        report, documents, ..
    } = outcome
    else {
        panic!("expected a written report");
    };
    assert_eq!(documents, 20);
    assert!(report.rows.is_empty());
    assert!(dir.join("report.md").exists());
    assert!(dir.join(CHART_FILE_NAME).exists());
}

#[tokio::test]
async fn render_failure_leaves_no_report() {
    let dir = output_dir("render");
    let err = run(
        &FakeSource {
            documents: corpus(),
        },
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &FailingRenderer,
        &settings(&dir),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Render(_))
    ));
    assert!(!dir.join("report.md").exists());
}

#[tokio::test]
async fn engine_failure_is_fatal() {
    let dir = output_dir("engine");
    let err = run(
        &FakeSource {
            documents: corpus(),
        },
        Arc::new(FailingEngine),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &settings(&dir),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Engine(_))
    ));
    assert!(format!("{err:#}").contains("model exploded"));
    assert!(!dir.join("report.md").exists());
}

#[tokio::test]
async fn scorer_failure_is_fatal() {
    let dir = output_dir("scorer");
    let err = run(
        &FakeSource {
            documents: corpus(),
        },
        Arc::new(KeywordEngine::default()),
        &FailingScorer,
        &SvgBarChart::default(),
        &settings(&dir),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Scoring(_))
    ));
    assert!(!dir.join(CHART_FILE_NAME).exists());
}

#[tokio::test]
async fn zero_min_topic_size_fails_before_fetching() {
    let dir = output_dir("min-size");
    let err = run(
        &FakeSource {
            documents: corpus(),
        },
        Arc::new(KeywordEngine::default()),
        &WordScorer::default(),
        &SvgBarChart::default(),
        &RunSettings {
            min_topic_size: 0,
            ..settings(&dir)
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::InvalidMinTopicSize)
    ));
}

// ============================================================
// Chain: rank -> assemble
// ============================================================

#[test]
fn ranked_topic_without_aggregate_is_fatal() {
    let topics = vec![
        TopicInfo {
            topic: Topic::Cluster(0),
            name: "0_a".to_string(),
            size: 5,
        },
        TopicInfo {
            topic: Topic::Cluster(1),
            name: "1_b".to_string(),
            size: 4,
        },
    ];
    let sentiments = trendscope::sentiment::aggregate::aggregate(
        &[Topic::Cluster(0); 5],
        &[0.1; 5],
    )
    .unwrap();

    let ranked = rank(&topics, 10, OutlierPolicy::Leading);
    let err = assemble(&ranked, &sentiments, chrono::Utc::now()).unwrap_err();
    assert!(matches!(err, PipelineError::MissingAggregate(Topic::Cluster(1))));
    assert!(err.to_string().contains("topic 1"));
}

#[test]
fn re_ranking_report_topics_is_idempotent() {
    let topics = vec![
        TopicInfo {
            topic: Topic::Outlier,
            name: "-1_misc".to_string(),
            size: 20,
        },
        TopicInfo {
            topic: Topic::Cluster(0),
            name: "0_a".to_string(),
            size: 6,
        },
        TopicInfo {
            topic: Topic::Cluster(1),
            name: "1_b".to_string(),
            size: 6,
        },
        TopicInfo {
            topic: Topic::Cluster(2),
            name: "2_c".to_string(),
            size: 9,
        },
    ];
    let sentiments: BTreeMap<_, _> = trendscope::sentiment::aggregate::aggregate(
        &[
            Topic::Outlier,
            Topic::Cluster(0),
            Topic::Cluster(1),
            Topic::Cluster(2),
        ],
        &[0.0, 0.2, -0.2, 0.9],
    )
    .unwrap();

    let ranked = rank(&topics, 3, OutlierPolicy::Leading);
    let report = assemble(&ranked, &sentiments, chrono::Utc::now()).unwrap();
    let reranked = rank(&report.topic_infos(), 3, OutlierPolicy::Leading);
    assert_eq!(reranked, ranked);
}
