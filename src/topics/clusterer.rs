// Topic clusterer: enforces the assignment contract on top of an engine.
//
// Whatever the engine proposes, the result leaving this module satisfies:
//   - one Topic per input document, same order
//   - clusters smaller than min_topic_size are folded into the outlier bucket
//   - TopicInfo sizes are recounted from the final assignments, so they sum
//     to the document count
//
// Fewer than two usable documents skips the engine entirely.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use super::traits::{ClusteringEngine, EngineOutput};
use crate::error::PipelineError;
use crate::models::{NormalizedDocument, Topic, TopicInfo};

pub const DEFAULT_MIN_TOPIC_SIZE: usize = 3;

/// Name given to an outlier bucket the engine didn't describe itself.
pub const OUTLIER_NAME: &str = "-1_outliers";

/// Final topic assignment for a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// One entry per document, index-aligned with the batch
    pub assignments: Vec<Topic>,
    /// One entry per topic present, in discovery order
    pub topics: Vec<TopicInfo>,
}

impl Clustering {
    fn all_outliers(count: usize) -> Self {
        let topics = if count == 0 {
            Vec::new()
        } else {
            vec![TopicInfo {
                topic: Topic::Outlier,
                name: OUTLIER_NAME.to_string(),
                size: count,
            }]
        };
        Self {
            assignments: vec![Topic::Outlier; count],
            topics,
        }
    }
}

pub struct TopicClusterer {
    engine: Arc<dyn ClusteringEngine>,
    min_topic_size: usize,
}

impl TopicClusterer {
    pub fn new(
        engine: Arc<dyn ClusteringEngine>,
        min_topic_size: usize,
    ) -> Result<Self, PipelineError> {
        if min_topic_size == 0 {
            return Err(PipelineError::InvalidMinTopicSize);
        }
        Ok(Self {
            engine,
            min_topic_size,
        })
    }

    pub fn min_topic_size(&self) -> usize {
        self.min_topic_size
    }

    /// Assign every document to a topic or to the outlier bucket.
    ///
    /// Blocks for as long as the engine takes.
    pub fn cluster(&self, docs: &[NormalizedDocument]) -> Result<Clustering, PipelineError> {
        let usable = docs.iter().filter(|d| d.is_usable()).count();
        if usable < 2 {
            debug!(
                usable,
                total = docs.len(),
                "Too few usable documents, skipping clustering engine"
            );
            return Ok(Clustering::all_outliers(docs.len()));
        }

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let output = self
            .engine
            .fit_and_assign(&texts, self.min_topic_size)
            .map_err(PipelineError::Engine)?;

        apply_contract(output, docs.len(), self.min_topic_size)
    }
}

/// Validate raw engine output and turn it into a Clustering.
fn apply_contract(
    output: EngineOutput,
    doc_count: usize,
    min_topic_size: usize,
) -> Result<Clustering, PipelineError> {
    if output.labels.len() != doc_count {
        return Err(PipelineError::Engine(anyhow::anyhow!(
            "engine returned {} labels for {} documents",
            output.labels.len(),
            doc_count
        )));
    }

    let described: HashSet<i64> = output.topics.iter().map(|t| t.label).collect();

    let proposed: Vec<Topic> = output
        .labels
        .iter()
        .map(|&label| match Topic::from_label(label) {
            Some(Topic::Cluster(id)) if !described.contains(&label) => {
                Err(PipelineError::Engine(anyhow::anyhow!(
                    "engine assigned topic {id} without describing it"
                )))
            }
            Some(topic) => Ok(topic),
            None => Err(PipelineError::Engine(anyhow::anyhow!(
                "engine returned invalid label {label}"
            ))),
        })
        .collect::<Result<_, _>>()?;

    let proposed_sizes = count_members(&proposed);

    let assignments: Vec<Topic> = proposed
        .into_iter()
        .map(|topic| match topic {
            Topic::Cluster(_) if proposed_sizes[&topic] < min_topic_size => Topic::Outlier,
            other => other,
        })
        .collect();

    let sizes = count_members(&assignments);
    let folded = proposed_sizes
        .keys()
        .filter(|t| !t.is_outlier() && !sizes.contains_key(t))
        .count();

    // Discovery order: follow the engine's topic list, dropping folded
    // clusters. The outlier bucket keeps the engine's -1 slot if it had one.
    let mut topics = Vec::with_capacity(sizes.len());
    let mut listed = HashSet::new();
    for engine_topic in &output.topics {
        let Some(topic) = Topic::from_label(engine_topic.label) else {
            return Err(PipelineError::Engine(anyhow::anyhow!(
                "engine described invalid label {}",
                engine_topic.label
            )));
        };
        if !listed.insert(topic) {
            continue;
        }
        if let Some(&size) = sizes.get(&topic) {
            topics.push(TopicInfo {
                topic,
                name: engine_topic.name.clone(),
                size,
            });
        }
    }
    if !listed.contains(&Topic::Outlier) {
        if let Some(&size) = sizes.get(&Topic::Outlier) {
            topics.insert(
                0,
                TopicInfo {
                    topic: Topic::Outlier,
                    name: OUTLIER_NAME.to_string(),
                    size,
                },
            );
        }
    }

    info!(
        documents = doc_count,
        topics = topics.iter().filter(|t| !t.topic.is_outlier()).count(),
        outliers = sizes.get(&Topic::Outlier).copied().unwrap_or(0),
        folded_clusters = folded,
        "Clustered documents"
    );

    Ok(Clustering {
        assignments,
        topics,
    })
}

fn count_members(assignments: &[Topic]) -> HashMap<Topic, usize> {
    let mut counts = HashMap::new();
    for &topic in assignments {
        *counts.entry(topic).or_insert(0) += 1;
    }
    counts
}
