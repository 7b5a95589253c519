// Sentiment scoring: trait-based abstraction plus per-topic aggregation.

pub mod aggregate;
pub mod lexicon;
pub mod traits;
