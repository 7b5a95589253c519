// Embedding-based clustering engine.
//
// Greedy single-pass clustering: walk the documents in order, and each
// unassigned document seeds a cluster that pulls in every other unassigned
// document whose embedding is at least `similarity_threshold` cosine-similar
// to the seed. Clusters below the minimum size and blank texts become -1.
//
// Surviving clusters are numbered 0.. by size (largest first, seed order on
// ties) and the outlier bucket, if any, is listed first.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::embeddings::cosine_similarity;
use super::tfidf::KeywordNamer;
use super::traits::{ClusteringEngine, EngineOutput, EngineTopic, TextEmbedder};
use crate::models::Topic;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.55;

pub struct EmbeddingClusterEngine<E: TextEmbedder> {
    embedder: E,
    namer: KeywordNamer,
    /// Minimum cosine similarity to the seed for a document to join its cluster
    pub similarity_threshold: f64,
}

impl<E: TextEmbedder> EmbeddingClusterEngine<E> {
    pub fn new(embedder: E, similarity_threshold: f64) -> Self {
        Self {
            embedder,
            namer: KeywordNamer::default(),
            similarity_threshold,
        }
    }
}

impl<E: TextEmbedder> ClusteringEngine for EmbeddingClusterEngine<E> {
    fn fit_and_assign(&self, texts: &[String], min_topic_size: usize) -> Result<EngineOutput> {
        let usable: Vec<usize> = (0..texts.len())
            .filter(|&i| !texts[i].trim().is_empty())
            .collect();

        let usable_texts: Vec<String> = usable.iter().map(|&i| texts[i].clone()).collect();
        let embeddings = self
            .embedder
            .embed(&usable_texts)
            .context("Failed to embed documents")?;
        if embeddings.len() != usable_texts.len() {
            anyhow::bail!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                usable_texts.len()
            );
        }

        let groups = greedy_groups(&embeddings, self.similarity_threshold);
        debug!(
            groups = groups.len(),
            threshold = self.similarity_threshold,
            "Grouped embeddings"
        );

        // Keep groups that meet the minimum size, largest first. sort_by is
        // stable, so equal sizes stay in seed order.
        let mut kept: Vec<Vec<usize>> = groups
            .into_iter()
            .filter(|g| g.len() >= min_topic_size.max(1))
            .map(|g| g.into_iter().map(|local| usable[local]).collect())
            .collect();
        kept.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut labels = vec![Topic::OUTLIER_LABEL; texts.len()];
        let mut topics = Vec::with_capacity(kept.len() + 1);

        for (id, members) in kept.iter().enumerate() {
            let label = id as i64;
            for &doc in members {
                labels[doc] = label;
            }
            let member_texts: Vec<String> = members.iter().map(|&i| texts[i].clone()).collect();
            topics.push(EngineTopic {
                label,
                name: self.namer.name(label, &member_texts),
                size: members.len(),
            });
        }

        let outlier_texts: Vec<String> = labels
            .iter()
            .zip(texts)
            .filter(|(&label, _)| label == Topic::OUTLIER_LABEL)
            .map(|(_, text)| text.clone())
            .collect();
        if !outlier_texts.is_empty() {
            topics.insert(
                0,
                EngineTopic {
                    label: Topic::OUTLIER_LABEL,
                    name: self.namer.name(Topic::OUTLIER_LABEL, &outlier_texts),
                    size: outlier_texts.len(),
                },
            );
        }

        info!(
            texts = texts.len(),
            clusters = kept.len(),
            outliers = outlier_texts.len(),
            "Embedding clustering complete"
        );

        Ok(EngineOutput { labels, topics })
    }
}

/// Partition vector indices into seed-similarity groups.
fn greedy_groups(embeddings: &[Vec<f64>], threshold: f64) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; embeddings.len()];
    let mut groups = Vec::new();

    for seed in 0..embeddings.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];

        for other in (seed + 1)..embeddings.len() {
            if !assigned[other]
                && cosine_similarity(&embeddings[seed], &embeddings[other]) >= threshold
            {
                assigned[other] = true;
                members.push(other);
            }
        }

        groups.push(members);
    }

    groups
}
