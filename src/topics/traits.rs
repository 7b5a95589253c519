// Clustering engine and embedder traits: the swap-ready abstractions.
//
// The pipeline never depends on a particular clustering library or label
// numbering. Anything that can turn texts into labels plus a topic list can
// sit behind ClusteringEngine; the clusterer enforces the outlier contract on
// top of whatever it returns.

use anyhow::Result;

/// A topic as described by an engine, in the engine's numeric convention
/// (-1 is the outlier bucket).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineTopic {
    pub label: i64,
    pub name: String,
    pub size: usize,
}

/// Raw engine result: one label per input text, plus the topics it found.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub labels: Vec<i64>,
    pub topics: Vec<EngineTopic>,
}

/// Trait for embedding-and-clustering backends.
///
/// Calls are synchronous and may be slow; the pipeline runs them on the
/// blocking pool.
pub trait ClusteringEngine: Send + Sync {
    fn fit_and_assign(&self, texts: &[String], min_topic_size: usize) -> Result<EngineOutput>;
}

/// Trait for turning texts into dense vectors.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}
