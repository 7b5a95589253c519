// Report assembly: joins the ranked topics with their sentiment aggregates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::models::{RankedReport, ReportRow, Topic, TopicInfo, TopicSentiment};

/// Build the final report from the ranker's output.
///
/// Every ranked topic must have an aggregate. A missing one means the
/// clustering and scoring stages disagree about which topics exist, so the
/// run stops rather than printing a made-up sentiment.
pub fn assemble(
    ranked: &[TopicInfo],
    sentiments: &BTreeMap<Topic, TopicSentiment>,
    generated_at: DateTime<Utc>,
) -> Result<RankedReport, PipelineError> {
    let rows = ranked
        .iter()
        .map(|info| {
            let sentiment = sentiments
                .get(&info.topic)
                .ok_or(PipelineError::MissingAggregate(info.topic))?;
            Ok(ReportRow {
                topic: info.topic,
                name: info.name.clone(),
                size: info.size,
                mean_sentiment: sentiment.mean_sentiment,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(RankedReport { generated_at, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info(topic: Topic, size: usize) -> TopicInfo {
        TopicInfo {
            topic,
            name: format!("{}_kw", topic.label()),
            size,
        }
    }

    fn sentiment(topic: Topic, mean: f64) -> (Topic, TopicSentiment) {
        (
            topic,
            TopicSentiment {
                topic,
                mean_sentiment: mean,
                members: 1,
            },
        )
    }

    #[test]
    fn rows_follow_ranked_order() {
        let ranked = vec![info(Topic::Cluster(4), 9), info(Topic::Cluster(1), 5)];
        let sentiments: BTreeMap<_, _> = [
            sentiment(Topic::Cluster(1), -0.25),
            sentiment(Topic::Cluster(4), 0.5),
            sentiment(Topic::Outlier, 0.1),
        ]
        .into_iter()
        .collect();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let report = assemble(&ranked, &sentiments, at).unwrap();
        assert_eq!(report.generated_at, at);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].topic, Topic::Cluster(4));
        assert_eq!(report.rows[0].mean_sentiment, 0.5);
        assert_eq!(report.rows[1].name, "1_kw");
        assert_eq!(report.topic_infos(), ranked);
    }

    #[test]
    fn missing_aggregate_names_topic() {
        let ranked = vec![info(Topic::Cluster(0), 3), info(Topic::Cluster(7), 2)];
        let sentiments: BTreeMap<_, _> = [sentiment(Topic::Cluster(0), 0.0)].into_iter().collect();

        let err = assemble(&ranked, &sentiments, Utc::now()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingAggregate(Topic::Cluster(7))));
    }

    #[test]
    fn empty_ranking_gives_empty_report() {
        let report = assemble(&[], &BTreeMap::new(), Utc::now()).unwrap();
        assert!(report.is_empty());
    }
}
