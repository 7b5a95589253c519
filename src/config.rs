use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::sources::reddit::{TimeWindow, DEFAULT_REDDIT_API_URL};
use crate::topics::clusterer::DEFAULT_MIN_TOPIC_SIZE;
use crate::topics::download;
use crate::topics::engine::DEFAULT_SIMILARITY_THRESHOLD;
use crate::topics::ranker::{OutlierPolicy, DEFAULT_TOP_N};

/// Subreddits fetched when TRENDSCOPE_SUBREDDITS is unset.
pub const DEFAULT_SUBREDDITS: &str = "futurology,technology,singularity";

/// Central configuration loaded from environment variables.
///
/// Every value has a default, so a bare `trendscope run` works. The .env
/// file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Subreddits to pull from, deduplicated and sorted
    pub subreddits: BTreeSet<String>,
    /// Listing entries requested per subreddit
    pub per_source_limit: usize,
    pub time_window: TimeWindow,
    /// Keep pinned (stickied) posts. Off by default.
    pub include_pinned: bool,
    pub min_topic_size: usize,
    pub top_n: usize,
    pub outlier_policy: OutlierPolicy,
    /// Cosine similarity needed to join a cluster
    pub similarity_threshold: f64,
    pub output_dir: PathBuf,
    /// Directory containing the embedding model files
    pub model_dir: PathBuf,
    pub reddit_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. Set but unparseable ones are
    /// an error naming the variable.
    pub fn load() -> Result<Self> {
        let subreddits = parse_subreddits(
            &env::var("TRENDSCOPE_SUBREDDITS").unwrap_or_else(|_| DEFAULT_SUBREDDITS.to_string()),
        );
        if subreddits.is_empty() {
            anyhow::bail!("TRENDSCOPE_SUBREDDITS is set but names no subreddits");
        }

        let model_dir = env::var("TRENDSCOPE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| download::default_model_dir());

        let include_pinned = match env::var("TRENDSCOPE_INCLUDE_PINNED").as_deref() {
            Ok("1") | Ok("true") | Ok("yes") => true,
            // unset or anything else keeps pinned posts out
            _ => false,
        };

        Ok(Self {
            subreddits,
            per_source_limit: env_or("TRENDSCOPE_PER_SOURCE_LIMIT", 50)?,
            time_window: env_or("TRENDSCOPE_TIME_WINDOW", TimeWindow::default())?,
            include_pinned,
            min_topic_size: env_or("TRENDSCOPE_MIN_TOPIC_SIZE", DEFAULT_MIN_TOPIC_SIZE)?,
            top_n: env_or("TRENDSCOPE_TOP_N", DEFAULT_TOP_N)?,
            outlier_policy: env_or("TRENDSCOPE_OUTLIER_POLICY", OutlierPolicy::default())?,
            similarity_threshold: env_or(
                "TRENDSCOPE_SIMILARITY_THRESHOLD",
                DEFAULT_SIMILARITY_THRESHOLD,
            )?,
            output_dir: env::var("TRENDSCOPE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            model_dir,
            reddit_api_url: env::var("REDDIT_API_URL")
                .unwrap_or_else(|_| DEFAULT_REDDIT_API_URL.to_string()),
        })
    }

    /// Check that the embedding model has been downloaded.
    /// Call this before building the clustering engine.
    pub fn require_embedding_model(&self) -> Result<()> {
        if !download::embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `trendscope download-model` to download them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

/// Split a comma-separated subreddit list. Accepts `r/` prefixes and
/// ignores blanks and duplicates.
pub fn parse_subreddits(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches("r/").to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value for {name}: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subreddits_normalizes() {
        let subs = parse_subreddits(" Technology, r/futurology,,technology ");
        let subs: Vec<&str> = subs.iter().map(String::as_str).collect();
        assert_eq!(subs, vec!["futurology", "technology"]);
    }

    #[test]
    fn test_default_subreddits() {
        assert_eq!(parse_subreddits(DEFAULT_SUBREDDITS).len(), 3);
    }

    #[test]
    fn test_env_or_reports_variable_name() {
        // Unique name so parallel tests never collide
        let name = "TRENDSCOPE_TEST_ENV_OR_BAD_NUMBER";
        env::set_var(name, "lots");
        let err = env_or::<usize>(name, 1).unwrap_err();
        assert!(format!("{err:#}").contains(name));
        env::remove_var(name);

        assert_eq!(env_or::<usize>(name, 7).unwrap(), 7);
    }
}
