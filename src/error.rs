// Domain error kinds for the topic pipeline.
//
// The CLI edge works in anyhow::Result; these variants exist so callers (and
// tests) can tell a clean halt from an invariant break from a collaborator
// failure without string matching.

use thiserror::Error;

use crate::models::Topic;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Nothing was fetched. Not a failure: the run halts without a report.
    #[error("no documents collected")]
    EmptyInput,

    /// A ranked topic has no sentiment aggregate.
    #[error("no sentiment aggregate for ranked topic {0}")]
    MissingAggregate(Topic),

    /// The clustering engine failed or broke its output contract.
    #[error("clustering engine failed: {0:#}")]
    Engine(anyhow::Error),

    /// The sentiment scorer failed.
    #[error("sentiment scorer failed: {0:#}")]
    Scoring(anyhow::Error),

    /// Chart generation failed.
    #[error("chart rendering failed: {0:#}")]
    Render(anyhow::Error),

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("min topic size must be at least 1")]
    InvalidMinTopicSize,
}
