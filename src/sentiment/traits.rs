// Sentiment scorer trait: the swap-ready abstraction.
//
// The default implementation is a local lexicon scorer. Anything that maps
// text to a polarity in [-1, 1] can replace it, including providers that
// need an HTTP call, which is why the trait is async.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for scoring text polarity. Scores are in [-1.0, 1.0], where 0.0 is
/// neutral.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Score a single text.
    async fn score_text(&self, text: &str) -> Result<f64>;

    /// Score multiple texts, returning results in the same order.
    /// Default implementation calls score_text sequentially.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<f64>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.score_text(text).await?);
        }
        Ok(results)
    }
}
