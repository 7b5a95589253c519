// Top-N topic selection.
//
// Topics are ordered by size, largest first. Equal sizes keep the order the
// topics were supplied in (discovery order) because the sort is stable.
//
// The default outlier rule is positional: the outlier bucket is dropped only
// when it lands in the first slot after sorting. Anywhere else it is ranked
// like any other topic. `OutlierPolicy::Always` drops it wherever it is.

use std::str::FromStr;

use crate::models::TopicInfo;

pub const DEFAULT_TOP_N: usize = 10;

/// How the outlier bucket is treated when picking the top topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlierPolicy {
    /// Drop the outlier bucket only if it sorts into slot 0.
    #[default]
    Leading,
    /// Never rank the outlier bucket.
    Always,
}

impl FromStr for OutlierPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leading" => Ok(OutlierPolicy::Leading),
            "always" => Ok(OutlierPolicy::Always),
            other => anyhow::bail!(
                "unknown outlier policy '{other}' (expected 'leading' or 'always')"
            ),
        }
    }
}

/// Pick at most `n` topics by size.
pub fn rank(topics: &[TopicInfo], n: usize, policy: OutlierPolicy) -> Vec<TopicInfo> {
    let mut sorted = topics.to_vec();
    sorted.sort_by(|a, b| b.size.cmp(&a.size));

    match policy {
        OutlierPolicy::Leading => {
            let skip = usize::from(sorted.first().is_some_and(|t| t.topic.is_outlier()));
            sorted.into_iter().skip(skip).take(n).collect()
        }
        OutlierPolicy::Always => sorted
            .into_iter()
            .filter(|t| !t.topic.is_outlier())
            .take(n)
            .collect(),
    }
}
