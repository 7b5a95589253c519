// Unit tests for sentiment scoring and per-topic aggregation.

use trendscope::error::PipelineError;
use trendscope::models::Topic;
use trendscope::sentiment::aggregate::aggregate;
use trendscope::sentiment::lexicon::LexiconScorer;
use trendscope::sentiment::traits::SentimentScorer;

// ============================================================
// aggregate: means per topic
// ============================================================

#[test]
fn mean_of_three_members() {
    let topic = Topic::Cluster(2);
    let means = aggregate(&[topic, topic, topic], &[0.5, -0.5, 1.0]).unwrap();
    let mean = means[&topic].mean_sentiment;
    assert!((mean - 0.3333).abs() < 1e-3, "got {mean}");
    assert_eq!(means[&topic].members, 3);
}

#[test]
fn outlier_bucket_is_aggregated_like_any_topic() {
    let assignments = [Topic::Outlier, Topic::Cluster(0), Topic::Outlier];
    let means = aggregate(&assignments, &[-1.0, 0.4, 0.0]).unwrap();
    assert_eq!(means.len(), 2);
    assert_eq!(means[&Topic::Outlier].mean_sentiment, -0.5);
    assert_eq!(means[&Topic::Cluster(0)].mean_sentiment, 0.4);
}

#[test]
fn only_topics_with_members_appear() {
    let means = aggregate(&[Topic::Cluster(4)], &[0.2]).unwrap();
    assert!(!means.contains_key(&Topic::Cluster(0)));
    assert!(aggregate(&[], &[]).unwrap().is_empty());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let err = aggregate(&[Topic::Cluster(0), Topic::Cluster(1)], &[0.1]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::LengthMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

// ============================================================
// LexiconScorer: through the trait
// ============================================================

#[tokio::test]
async fn scores_stay_in_range() {
    let scorer = LexiconScorer::new();
    let texts = vec![
        "Fusion breakthrough is amazing news, best day ever!!!".to_string(),
        "Massive layoffs are a disaster and a crisis for workers".to_string(),
        "The meeting is scheduled for Thursday".to_string(),
        String::new(),
    ];
    let scores = scorer.score_batch(&texts).await.unwrap();
    assert_eq!(scores.len(), texts.len());
    assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(scores[0] > 0.5);
    assert!(scores[1] < -0.5);
    assert_eq!(scores[2], 0.0);
    assert_eq!(scores[3], 0.0);
}

#[tokio::test]
async fn single_and_batch_scoring_agree() {
    let scorer = LexiconScorer::new();
    let text = "Not a great update, but the battery life is really good";
    let single = scorer.score_text(text).await.unwrap();
    let batch = scorer.score_batch(&[text.to_string()]).await.unwrap();
    assert_eq!(batch, vec![single]);
}

#[test]
fn raw_text_punctuation_adds_emphasis() {
    // Scoring sees the original text, so exclamation marks still count
    let scorer = LexiconScorer::new();
    assert!(scorer.polarity("GREAT news!!") > scorer.polarity("great news"));
}
