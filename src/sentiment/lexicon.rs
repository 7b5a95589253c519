// Lexicon-based sentiment scorer.
//
// Each known word carries a valence on a -4..4 scale. The raw sum is adjusted
// for nearby boosters ("very good"), negations within the three preceding
// words ("not good"), a contrastive "but" (the clause after it counts more),
// and exclamation marks, then squashed into [-1, 1] with s / sqrt(s^2 + 15).
// Runs locally with no model files.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;

use super::traits::SentimentScorer;

/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;
/// Valence shift contributed by a booster word.
const BOOSTER_INCREMENT: f64 = 0.293;
/// Multiplier applied to a word preceded by a negation.
const NEGATION_SCALAR: f64 = -0.74;
/// Emphasis added per exclamation mark, capped at four marks.
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// How far back to look for negations and boosters.
const LOOKBACK: usize = 3;

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("love", 3.2),
    ("loved", 2.9),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("excellent", 3.2),
    ("fantastic", 2.6),
    ("wonderful", 2.7),
    ("great", 3.1),
    ("good", 1.9),
    ("nice", 1.8),
    ("best", 3.2),
    ("better", 1.9),
    ("happy", 2.7),
    ("glad", 2.0),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("impressive", 2.3),
    ("breakthrough", 2.2),
    ("promising", 1.7),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("hope", 1.9),
    ("hopeful", 2.3),
    ("helpful", 1.8),
    ("benefit", 2.0),
    ("improve", 1.9),
    ("improved", 2.1),
    ("innovative", 1.9),
    ("incredible", 2.4),
    ("interesting", 1.7),
    ("useful", 1.9),
    ("safe", 1.9),
    ("free", 2.3),
    ("fun", 2.3),
    ("cool", 1.3),
    ("thanks", 1.9),
    ("agree", 1.5),
    ("support", 1.7),
    ("optimistic", 1.3),
    // negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("sad", -2.1),
    ("angry", -2.3),
    ("fear", -2.2),
    ("afraid", -2.0),
    ("scary", -2.2),
    ("dangerous", -2.1),
    ("danger", -2.4),
    ("threat", -2.4),
    ("risk", -1.1),
    ("crisis", -3.1),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("problem", -1.7),
    ("problems", -1.7),
    ("broken", -2.1),
    ("lose", -1.6),
    ("loss", -1.3),
    ("layoffs", -2.0),
    ("ban", -2.6),
    ("banned", -2.0),
    ("scam", -2.5),
    ("fake", -2.1),
    ("lies", -1.8),
    ("wrong", -2.1),
    ("useless", -1.8),
    ("disaster", -3.1),
    ("worried", -1.2),
    ("concern", -0.6),
    ("concerns", -0.8),
    ("stupid", -2.4),
    ("kill", -3.7),
    ("killed", -3.5),
    ("dead", -3.3),
    ("war", -2.9),
    ("collapse", -2.2),
    ("doom", -1.7),
];

const BOOSTERS: &[&str] = &[
    "very",
    "really",
    "extremely",
    "incredibly",
    "absolutely",
    "hugely",
    "so",
    "totally",
    "completely",
    "highly",
    "deeply",
    "most",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
    "cant", "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't",
    "wasnt", "wasn't", "arent", "aren't", "wont", "won't", "wouldnt", "wouldn't", "shouldnt",
    "shouldn't", "aint", "ain't",
];

/// Local lexicon scorer. Cheap to construct; holds only lookup tables.
pub struct LexiconScorer {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compound polarity of `text` in [-1.0, 1.0].
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(token.as_str()) else {
                valences.push(0.0);
                continue;
            };

            let mut valence = base;
            let window = i.saturating_sub(LOOKBACK)..i;

            // Boosters fade with distance: full, 95%, 90%
            for (distance, j) in window.clone().rev().enumerate() {
                if self.boosters.contains(tokens[j].as_str()) {
                    let decay = 1.0 - 0.05 * distance as f64;
                    valence += BOOSTER_INCREMENT * decay * base.signum();
                }
            }

            if window.clone().any(|j| self.negations.contains(tokens[j].as_str())) {
                valence *= NEGATION_SCALAR;
            }

            valences.push(valence);
        }

        // Contrast: "x but y" weights y over x
        if let Some(but) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < but {
                    *v *= 0.5;
                } else if i > but {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let marks = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += marks as f64 * EXCLAMATION_INCREMENT * sum.signum();
        }

        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score_text(&self, text: &str) -> Result<f64> {
        Ok(self.polarity(text))
    }
}

/// Lowercase words with surrounding punctuation trimmed. Inner apostrophes
/// are kept so contractions like "don't" match the negation list.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .trim_matches('\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}
