// Per-topic sentiment means.
//
// The outlier bucket is averaged like any other topic. Keeping it out of the
// report is the ranker's job.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::PipelineError;
use crate::models::{Topic, TopicSentiment};

/// Mean score per topic. Topics with no members never appear.
pub fn aggregate(
    assignments: &[Topic],
    scores: &[f64],
) -> Result<BTreeMap<Topic, TopicSentiment>, PipelineError> {
    if assignments.len() != scores.len() {
        return Err(PipelineError::LengthMismatch {
            what: "sentiment scores",
            expected: assignments.len(),
            actual: scores.len(),
        });
    }

    let mut sums: BTreeMap<Topic, (f64, usize)> = BTreeMap::new();
    for (&topic, &score) in assignments.iter().zip(scores) {
        let entry = sums.entry(topic).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let means: BTreeMap<Topic, TopicSentiment> = sums
        .into_iter()
        .filter(|(_, (_, members))| *members > 0)
        .map(|(topic, (sum, members))| {
            (
                topic,
                TopicSentiment {
                    topic,
                    mean_sentiment: sum / members as f64,
                    members,
                },
            )
        })
        .collect();

    debug!(topics = means.len(), "Aggregated topic sentiment");

    Ok(means)
}
