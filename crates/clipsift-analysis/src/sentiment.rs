//! Sentiment analyzer implementations

use crate::traits::SentimentAnalyzer;

/// Valence word lists for the lexicon analyzer. Small on purpose: the
/// scorer only needs a coarse polarity magnitude, not review-grade
/// sentiment classification.
const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "brilliant", "excellent", "excited",
    "fantastic", "good", "great", "happy", "incredible", "love", "perfect", "win",
    "wonderful", "wow",
];

const NEGATIVE_WORDS: &[&str] = &[
    "awful", "bad", "boring", "broken", "fail", "hate", "horrible", "lose", "problem",
    "sad", "terrible", "ugly", "worst", "wrong",
];

/// Degraded default: every text is neutral.
///
/// Used when no real analyzer is configured; callers should log a
/// warning so degraded runs are visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralSentiment;

impl SentimentAnalyzer for NeutralSentiment {
    fn name(&self) -> &str {
        "neutral"
    }

    fn score(&self, _text: &str) -> f32 {
        0.0
    }
}

/// Word-list polarity analyzer.
///
/// Counts positive and negative valence hits and squashes the raw tally
/// into [-1, 1] with the same normalization curve VADER uses for its
/// compound score, so a single hit never saturates the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    const NORMALIZATION_ALPHA: f32 = 15.0;
}

impl SentimentAnalyzer for LexiconSentiment {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let mut tally = 0i32;
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if POSITIVE_WORDS.binary_search(&word).is_ok() {
                tally += 1;
            } else if NEGATIVE_WORDS.binary_search(&word).is_ok() {
                tally -= 1;
            }
        }
        if tally == 0 {
            return 0.0;
        }
        let raw = tally as f32;
        raw / (raw * raw + Self::NORMALIZATION_ALPHA).sqrt()
    }
}
