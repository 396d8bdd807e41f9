//! Highlight analysis crate for ClipSift
//!
//! Combines acoustic candidate segments with a caption track: caption
//! alignment, text feature extraction, multi-factor highlight scoring,
//! budget-constrained selection, and variant generation.

pub mod captions;
pub mod scorer;
pub mod sentiment;
pub mod text;
pub mod traits;
pub mod variants;

pub use captions::{
    captions_for_segment, load_captions, parse_srt, parse_timestamp, refine_bounds, CaptionError,
};
pub use scorer::{score_segments, select_within_budget, Ranking};
pub use sentiment::{LexiconSentiment, NeutralSentiment};
pub use text::{context_overlap, tfidf_totals, tokenize, SegmentText};
pub use traits::SentimentAnalyzer;
pub use variants::build_variants;
