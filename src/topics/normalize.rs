// Text normalization for clustering input.
//
// The steps run in a fixed order: lowercase, drop URLs, drop [bracketed]
// segments, then drop everything that isn't a lowercase ASCII letter or
// whitespace. Running them in a different order gives different output
// (e.g. stripping punctuation first would break the URL match).
//
// Whitespace means Unicode whitespace: a no-break space ends a URL and
// survives the letter filter.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Document, DocumentBatch, NormalizedDocument};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("valid URL pattern"));
static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid bracket pattern"));
static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\s]").expect("valid letter pattern"));

/// Normalize a document's full text. The result may be empty.
pub fn normalize(doc: &Document) -> NormalizedDocument {
    NormalizedDocument {
        text: clean_text(&doc.full_text()),
    }
}

/// Normalize every document in the batch, preserving order.
pub fn normalize_batch(batch: &DocumentBatch) -> Vec<NormalizedDocument> {
    batch.documents().iter().map(normalize).collect()
}

pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, "");
    let no_brackets = BRACKET_RE.replace_all(&no_urls, "");
    NON_LETTER_RE.replace_all(&no_brackets, "").into_owned()
}
