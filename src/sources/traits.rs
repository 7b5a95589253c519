// Document source trait.
//
// The pipeline only needs a batch of documents; where they come from is the
// source's business. The shipped implementation reads Reddit listings.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Document;

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch up to `per_source_limit` documents from each named source.
    /// Pinned posts are skipped when `exclude_pinned` is set.
    async fn fetch(
        &self,
        source_names: &BTreeSet<String>,
        per_source_limit: usize,
        exclude_pinned: bool,
    ) -> Result<Vec<Document>>;
}
