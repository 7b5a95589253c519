// Reddit listing client: unauthenticated JSON over HTTP.
//
// Top posts for a subreddit are public at /r/{sub}/top.json, so no OAuth
// app is needed. Listings are paged with the `after` cursor; each page holds
// at most 100 posts.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::rate_limiter::RateLimiter;
use super::traits::DocumentSource;
use crate::models::Document;

/// Default public endpoint for listing requests.
pub const DEFAULT_REDDIT_API_URL: &str = "https://www.reddit.com";

/// Reddit's maximum page size for listings.
const MAX_PAGE_SIZE: usize = 100;

/// Default pacing between listing requests.
const DEFAULT_REQUESTS_PER_SECOND: f64 = 0.5;

/// Time window for a top listing (`t=` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(TimeWindow::Hour),
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => anyhow::bail!(
                "unknown time window '{other}' (expected hour, day, week, month, year, or all)"
            ),
        }
    }
}

/// HTTP client for public subreddit listings.
pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    window: TimeWindow,
    rate_limiter: RateLimiter,
}

impl RedditClient {
    pub fn new(base_url: &str, window: TimeWindow) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("trendscope/0.1 (daily topic trend reports)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            window,
            rate_limiter: RateLimiter::new(DEFAULT_REQUESTS_PER_SECOND),
        })
    }

    /// GET a listing path and deserialize the response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Reddit GET request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Reddit request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }

    /// Fetch the top posts of one subreddit, following pagination until
    /// `limit` listing entries have been seen. Pinned posts count toward the
    /// limit before they are dropped.
    pub async fn fetch_top_posts(
        &self,
        subreddit: &str,
        limit: usize,
        exclude_pinned: bool,
    ) -> Result<Vec<Document>> {
        let path = format!("/r/{subreddit}/top.json");
        let mut documents = Vec::new();
        let mut seen = 0;
        let mut after: Option<String> = None;

        while seen < limit {
            let page_size = (limit - seen).min(MAX_PAGE_SIZE).to_string();
            let mut params: Vec<(&str, &str)> = vec![
                ("t", self.window.as_str()),
                ("limit", page_size.as_str()),
                ("raw_json", "1"),
            ];
            if let Some(ref cursor) = after {
                params.push(("after", cursor.as_str()));
            }

            let listing: Listing = self
                .get_json(&path, &params)
                .await
                .with_context(|| format!("Failed to fetch top posts for r/{subreddit}"))?;

            let page_len = listing.data.children.len();
            seen += page_len;
            after = listing.data.after.clone();
            documents.extend(documents_from_listing(listing, exclude_pinned));

            debug!(
                page_posts = page_len,
                total_collected = documents.len(),
                "Fetched page of posts for r/{}",
                subreddit
            );

            if after.is_none() || page_len == 0 {
                break;
            }
        }

        info!(
            count = documents.len(),
            subreddit = subreddit,
            window = %self.window,
            "Collected posts"
        );

        Ok(documents)
    }
}

#[async_trait]
impl DocumentSource for RedditClient {
    async fn fetch(
        &self,
        source_names: &BTreeSet<String>,
        per_source_limit: usize,
        exclude_pinned: bool,
    ) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for subreddit in source_names {
            documents.extend(
                self.fetch_top_posts(subreddit, per_source_limit, exclude_pinned)
                    .await?,
            );
        }
        Ok(documents)
    }
}

/// Turn a listing page into documents, in listing order.
pub fn documents_from_listing(listing: Listing, exclude_pinned: bool) -> Vec<Document> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| !(exclude_pinned && post.stickied))
        .map(|post| Document::new(post.title, post.selftext))
        .collect()
}

// -- Serde types for listing responses --

/// A `Listing` envelope as returned by /top.json.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: RedditPost,
}

/// The post fields trendscope reads. Missing text fields come back empty.
#[derive(Debug, Deserialize)]
pub struct RedditPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub stickied: bool,
}
