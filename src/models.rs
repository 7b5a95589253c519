// Data models: the values that flow between pipeline stages.
//
// Everything here is immutable once built. Per-document sequences (documents,
// normalized texts, assignments, scores) are always index-aligned.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PipelineError;

/// A single post pulled from a content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Title and body joined by a single space. Sentiment is always scored
    /// on this text, never on the normalized form.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// The documents collected for one run, in fetch order.
///
/// A batch is never empty: zero documents means there is nothing to report,
/// which callers treat as a clean halt.
#[derive(Debug, Clone)]
pub struct DocumentBatch {
    documents: Vec<Document>,
}

impl DocumentBatch {
    pub fn new(documents: Vec<Document>) -> Result<Self, PipelineError> {
        if documents.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn full_texts(&self) -> Vec<String> {
        self.documents.iter().map(Document::full_text).collect()
    }
}

/// Clustering-ready text for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub text: String,
}

impl NormalizedDocument {
    /// Whether anything besides whitespace survived normalization.
    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Topic membership for a document.
///
/// Engines speak the numeric convention where -1 marks an outlier. Inside
/// the pipeline the outlier bucket is its own variant so it can't be mixed
/// up with a real cluster id; the numeric form only comes back at the engine
/// boundary and when a report is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Outlier,
    Cluster(u32),
}

impl Topic {
    pub const OUTLIER_LABEL: i64 = -1;

    /// Convert an engine label. Returns None for anything below -1 or
    /// beyond the u32 range.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            Self::OUTLIER_LABEL => Some(Topic::Outlier),
            l if l >= 0 => u32::try_from(l).ok().map(Topic::Cluster),
            _ => None,
        }
    }

    pub fn label(self) -> i64 {
        match self {
            Topic::Outlier => Self::OUTLIER_LABEL,
            Topic::Cluster(id) => i64::from(id),
        }
    }

    pub fn is_outlier(self) -> bool {
        matches!(self, Topic::Outlier)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.label())
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = i64::deserialize(deserializer)?;
        Topic::from_label(label)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid topic label {label}")))
    }
}

/// A topic present in the final assignment, with its member count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    #[serde(rename = "label")]
    pub topic: Topic,
    /// Keyword summary, e.g. `0_ai_model_openai_release`
    pub name: String,
    pub size: usize,
}

/// Mean sentiment over a topic's members.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopicSentiment {
    #[serde(rename = "label")]
    pub topic: Topic,
    pub mean_sentiment: f64,
    pub members: usize,
}

/// One line of the ranked report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "label")]
    pub topic: Topic,
    pub name: String,
    pub size: usize,
    pub mean_sentiment: f64,
}

/// The ranked topics for one run, highest post count first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
}

impl RankedReport {
    /// The ranked topic set, in report order. Feeding this back through the
    /// ranker with the same `n` reproduces the same ordering.
    pub fn topic_infos(&self) -> Vec<TopicInfo> {
        self.rows
            .iter()
            .map(|row| TopicInfo {
                topic: row.topic,
                name: row.name.clone(),
                size: row.size,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
