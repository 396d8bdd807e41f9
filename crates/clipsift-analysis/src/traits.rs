//! Collaborator traits
//!
//! Optional collaborators are modeled as swappable strategies with a
//! neutral default, so the scoring algorithm never checks for their
//! availability itself.

/// Trait for sentiment polarity analyzers.
pub trait SentimentAnalyzer: Send + Sync {
    /// Analyzer name
    fn name(&self) -> &str;

    /// Polarity of `text` in [-1.0, 1.0]; 0.0 is neutral.
    fn score(&self, text: &str) -> f32;
}
