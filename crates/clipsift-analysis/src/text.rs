//! Text feature extraction over caption windows
//!
//! Tokenization plus the corpus-level lexical statistics the scorer
//! consumes: TF-IDF-like salience across segments and neighbor-overlap
//! context scores. Segments are the "documents"; the document-frequency
//! table is built for one batch and never persisted across runs.

use std::collections::{HashMap, HashSet};

/// Generic function words excluded from all lexical statistics.
/// Sorted for binary search.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "i", "in", "is",
    "it", "of", "on", "or", "so", "that", "the", "this", "to", "we", "you",
];

/// High-arousal words counted per token.
pub const EXCITED_WORDS: &[&str] = &[
    "amazing", "awesome", "crazy", "epic", "excited", "fantastic", "huge", "incredible",
    "insane", "massive", "shocking", "unbelievable", "wild", "wow",
];

/// Emphasis cues matched as substrings of the raw text.
pub const EMPHASIS_PHRASES: &[&str] = &[
    "breakthrough", "critical", "hook", "insight", "must", "need", "perfect", "pro tip",
    "professional", "story", "strategy", "viral",
];

/// Rhetorical hook openers matched as substrings of the raw text.
pub const HOOK_PHRASES: &[&str] = &[
    "did you know", "here's", "how to", "let me tell", "listen", "step by step",
    "the secret", "this is why", "you won't believe",
];

/// Default context score for segments with no usable neighbors.
const CONTEXT_DEFAULT: f64 = 0.8;

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Tokenize caption text: case-fold, treat every non-alphanumeric
/// character as a separator, and drop stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Per-segment lexical material: joined caption text, filtered tokens,
/// and token counts.
#[derive(Debug, Clone, Default)]
pub struct SegmentText {
    /// Raw lower-cased caption text (phrase cues match against this)
    pub text: String,
    /// Filtered tokens in order
    pub words: Vec<String>,
    /// Token occurrence counts
    pub counts: HashMap<String, usize>,
}

impl SegmentText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into().to_lowercase();
        let words = tokenize(&text);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in &words {
            *counts.entry(word.clone()).or_insert(0) += 1;
        }
        Self { text, words, counts }
    }

    pub fn unique_words(&self) -> HashSet<&str> {
        self.words.iter().map(String::as_str).collect()
    }
}

/// Document-frequency-weighted salience per segment.
///
/// `idf = ln((N+1)/(df+1)) + 1`, summed as `(count/total) * idf` over a
/// segment's distinct tokens. Rewards tokens frequent locally but rare
/// across the batch.
pub fn tfidf_totals(segments: &[SegmentText]) -> Vec<f64> {
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for segment in segments {
        for word in segment.counts.keys() {
            *document_frequency.entry(word.as_str()).or_insert(0) += 1;
        }
    }

    let total_docs = segments.len().max(1) as f64;
    segments
        .iter()
        .map(|segment| {
            if segment.counts.is_empty() {
                return 0.0;
            }
            let total_words = segment.words.len().max(1) as f64;
            segment
                .counts
                .iter()
                .map(|(word, &count)| {
                    let df = document_frequency[word.as_str()] as f64;
                    let idf = ((total_docs + 1.0) / (df + 1.0)).ln() + 1.0;
                    (count as f64 / total_words) * idf
                })
                .sum()
        })
        .collect()
}

/// Jaccard-style overlap between each segment's token set and the
/// union of its chronological neighbors' sets.
///
/// Empty token sets score 0; segments with no usable neighbors score a
/// fixed default, treated as novel since nothing contradicts them.
pub fn context_overlap(segments: &[SegmentText]) -> Vec<f64> {
    let sets: Vec<HashSet<&str>> = segments.iter().map(SegmentText::unique_words).collect();

    sets.iter()
        .enumerate()
        .map(|(index, current)| {
            if current.is_empty() {
                return 0.0;
            }
            let mut combined: HashSet<&str> = HashSet::new();
            let mut has_neighbor = false;
            if index > 0 {
                combined.extend(&sets[index - 1]);
                has_neighbor = true;
            }
            if index + 1 < sets.len() {
                combined.extend(&sets[index + 1]);
                has_neighbor = true;
            }
            if !has_neighbor || combined.is_empty() {
                return CONTEXT_DEFAULT;
            }
            let intersection = current.intersection(&combined).count() as f64;
            let union = current.union(&combined).count().max(1) as f64;
            intersection / union
        })
        .collect()
}
