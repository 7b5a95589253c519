// TF-IDF topic naming.
//
// Each topic is named from its own members: every member text is a separate
// document for IDF, so words that show up in only some members get boosted
// and filler that is everywhere gets pushed down. The name follows the
// `{label}_{kw1}_{kw2}_...` shape used in the report table.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};
use tracing::debug;

/// Builds keyword names for topics.
pub struct KeywordNamer {
    /// How many keywords go into a name
    pub keywords_per_topic: usize,
    stop_words: Vec<String>,
}

impl Default for KeywordNamer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl KeywordNamer {
    pub fn new(keywords_per_topic: usize) -> Self {
        Self {
            keywords_per_topic,
            stop_words: get(LANGUAGE::English),
        }
    }

    /// Top keywords across the given member texts, highest score first.
    pub fn keywords(&self, texts: &[String]) -> Vec<String> {
        let docs: Vec<String> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        if docs.is_empty() {
            return Vec::new();
        }

        let params = TfIdfParams::UnprocessedDocuments(&docs, &self.stop_words, None);
        let tfidf = TfIdf::new(params);

        tfidf
            .get_ranked_word_scores(self.keywords_per_topic)
            .into_iter()
            .map(|(word, _)| word)
            .collect()
    }

    /// Name a topic from its members' texts. Falls back to the bare label
    /// when no keywords survive stop-word removal.
    pub fn name(&self, label: i64, texts: &[String]) -> String {
        let keywords = self.keywords(texts);
        debug!(label, keywords = ?keywords, "Named topic");
        generate_topic_name(label, &keywords)
    }
}

fn generate_topic_name(label: i64, keywords: &[String]) -> String {
    let mut parts = vec![label.to_string()];
    parts.extend(keywords.iter().cloned());
    parts.join("_")
}
