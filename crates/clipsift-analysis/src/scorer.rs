//! Highlight scoring and budget-constrained selection
//!
//! Each candidate segment gets a composite score built from normalized
//! acoustic and lexical components, multiplicative excitement/
//! sentiment/novelty boosts, and an additive hook bonus. Selection is a
//! greedy pass over the ranked list under a total-duration budget.
//!
//! Scoring is a pure function of the candidate batch and caption track:
//! running it twice yields identical scores.

use clipsift_types::{round3, Caption, ScoreBreakdown, Segment};

use crate::captions::{captions_for_segment, refine_bounds};
use crate::text::{self, SegmentText};
use crate::traits::SentimentAnalyzer;

/// Segments shorter than this are never selected.
pub const MIN_CLIP_SECS: f64 = 0.4;

/// Slack allowed when a segment slightly overruns the budget.
pub const BUDGET_TOLERANCE_SECS: f64 = 0.05;

/// Component weights for the base score, energy weighted highest.
const WEIGHT_ENERGY: f64 = 0.35;
const WEIGHT_COVERAGE: f64 = 0.20;
const WEIGHT_LEXICAL: f64 = 0.10;
const WEIGHT_PACING: f64 = 0.10;
const WEIGHT_STORYTELLING: f64 = 0.08;
const WEIGHT_TFIDF: f64 = 0.06;
const WEIGHT_CONTEXT: f64 = 0.06;
const WEIGHT_IMPACT: f64 = 0.05;

/// Result of scoring one candidate batch.
#[derive(Debug, Clone)]
pub struct Ranking {
    /// Budget-constrained selection, sorted by start time
    pub selected: Vec<Segment>,
    /// Every candidate with its score, sorted by score descending
    pub ranked: Vec<Segment>,
}

/// Min-max normalize `value` against the batch. A flat batch (all
/// values equal) normalizes to 0 so the component drops out.
fn normalize(value: f64, values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let (min, max) = values.iter().fold((first, first), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    if (max - min).abs() < 1e-12 {
        return 0.0;
    }
    (value - min) / (max - min).max(1e-6)
}

/// Score candidate segments against the caption track and select a
/// chronological subset under `max_duration`.
pub fn score_segments(
    segments: &[Segment],
    captions: &[Caption],
    max_duration: f64,
    sentiment: &dyn SentimentAnalyzer,
) -> Ranking {
    if segments.is_empty() {
        return Ranking {
            selected: Vec::new(),
            ranked: Vec::new(),
        };
    }

    let energy_values: Vec<f64> = segments.iter().map(|s| s.energy).collect();

    // Align captions and refine boundaries first; the DF table must see
    // the whole batch before any per-segment TF-IDF score is computed.
    struct Window {
        refined_start: f64,
        refined_end: f64,
        caption_secs: f64,
        text: SegmentText,
    }

    let windows: Vec<Window> = segments
        .iter()
        .map(|segment| {
            let matched = captions_for_segment(segment.start, segment.end, captions);
            let (refined_start, refined_end) = refine_bounds(segment.start, segment.end, &matched);
            let caption_secs = matched.iter().map(|c| c.duration()).sum();
            let joined = matched
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Window {
                refined_start,
                refined_end,
                caption_secs,
                text: SegmentText::new(joined.trim()),
            }
        })
        .collect();

    let texts: Vec<SegmentText> = windows.iter().map(|w| w.text.clone()).collect();
    let tfidf = text::tfidf_totals(&texts);
    let context = text::context_overlap(&texts);

    let mut scored: Vec<Segment> = Vec::with_capacity(segments.len());
    for (idx, (segment, window)) in segments.iter().zip(&windows).enumerate() {
        let refined_duration = (window.refined_end - window.refined_start).max(1e-6);
        let words = window.text.words.len();
        let unique = window.text.unique_words().len();

        let coverage_raw = window.caption_secs / refined_duration;
        let words_per_second = words as f64 / refined_duration;
        let lexical_density = if words > 0 {
            unique as f64 / words as f64
        } else {
            0.0
        };

        let excitement_hits = window
            .text
            .words
            .iter()
            .filter(|w| text::EXCITED_WORDS.contains(&w.as_str()))
            .count() as f64;
        let emphasis_hits = text::EMPHASIS_PHRASES
            .iter()
            .filter(|p| window.text.text.contains(*p))
            .count() as f64;
        let hook_hits = text::HOOK_PHRASES
            .iter()
            .filter(|p| window.text.text.contains(*p))
            .count() as f64;
        let is_question = window.text.text.trim_end().ends_with('?');
        let punctuation = window.text.text.matches('!').count() as f64 * 0.15
            + window.text.text.matches('?').count() as f64 * 0.1;

        let polarity = if window.text.text.is_empty() {
            0.0
        } else {
            sentiment.score(&window.text.text) as f64
        };

        let energy_component = normalize(segment.energy, &energy_values);
        let pacing_component = (words_per_second / 3.0).min(1.2);
        let lexical_component = (lexical_density + 0.2).min(1.2);
        let tfidf_component = (normalize(tfidf[idx], &tfidf) + 0.05).min(1.3);
        let context_component = (0.5 + context[idx] * 0.4).min(1.1);
        let impact_component = (excitement_hits * 0.25 + emphasis_hits * 0.2 + punctuation).min(1.3);
        let excitement_multiplier =
            1.0 + (excitement_hits * 0.18 + emphasis_hits * 0.12 + punctuation).min(1.6);
        let sentiment_multiplier = 1.0 + (polarity.abs() * 0.6).min(0.6);
        let novelty_multiplier = 1.0 + (tfidf_component * 0.25).min(0.4);
        let hook_boost = (hook_hits * 0.25 + if is_question { 0.2 } else { 0.0 }).min(0.8);
        let storytelling_component =
            (coverage_raw * 0.6 + hook_boost + lexical_component * 0.3).min(1.5);
        let coverage_component = (coverage_raw + 0.1).min(1.3);

        let base_score = energy_component * WEIGHT_ENERGY
            + coverage_component * WEIGHT_COVERAGE
            + lexical_component * WEIGHT_LEXICAL
            + pacing_component * WEIGHT_PACING
            + storytelling_component * WEIGHT_STORYTELLING
            + tfidf_component * WEIGHT_TFIDF
            + context_component * WEIGHT_CONTEXT
            + impact_component * WEIGHT_IMPACT;
        let final_score = base_score * excitement_multiplier * sentiment_multiplier
            * novelty_multiplier
            + hook_boost * 0.5;

        let mut reasons = ScoreBreakdown::new();
        reasons.insert("energy".into(), round3(energy_component));
        reasons.insert("coverage".into(), round3(coverage_component));
        reasons.insert("lexical_density".into(), round3(lexical_component));
        reasons.insert("pacing".into(), round3(pacing_component));
        reasons.insert("tfidf".into(), round3(tfidf_component));
        reasons.insert("context".into(), round3(context_component));
        reasons.insert("impact".into(), round3(impact_component));
        reasons.insert(
            "excitement_multiplier".into(),
            round3(excitement_multiplier),
        );
        reasons.insert("novelty_multiplier".into(), round3(novelty_multiplier));
        reasons.insert("sentiment".into(), round3(polarity));
        reasons.insert("storytelling".into(), round3(storytelling_component));
        reasons.insert("hook_boost".into(), round3(hook_boost));
        reasons.insert("words".into(), words as f64);

        scored.push(Segment {
            start: window.refined_start,
            end: window.refined_end.min(window.refined_start + max_duration),
            energy: segment.energy,
            score: final_score,
            reasons: Some(reasons),
        });
    }

    // Stable sort: ties keep original (chronological) order.
    let mut ranked = scored;
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let selected = select_within_budget(&ranked, max_duration);

    tracing::debug!(
        candidates = ranked.len(),
        selected = selected.len(),
        max_duration,
        "ranked highlight candidates"
    );

    Ranking { selected, ranked }
}

/// Greedily pick ranked segments until the duration budget is filled,
/// then restore chronological order.
///
/// A segment overrunning the remaining budget by more than the
/// tolerance is truncated to exactly fill it and becomes the last pick.
/// If nothing qualifies, the top-ranked candidate is returned so output
/// is never empty when input is not.
pub fn select_within_budget(ranked: &[Segment], max_duration: f64) -> Vec<Segment> {
    let mut selected: Vec<Segment> = Vec::new();
    let mut total = 0.0;

    for segment in ranked {
        if segment.duration() < MIN_CLIP_SECS {
            continue;
        }
        let remaining = max_duration - total;
        if remaining <= 0.0 {
            break;
        }
        if segment.duration() <= remaining + BUDGET_TOLERANCE_SECS {
            total += segment.duration();
            selected.push(segment.clone());
        } else {
            let mut truncated = segment.clone();
            truncated.end = truncated.start + remaining;
            selected.push(truncated);
            break;
        }
    }

    if selected.is_empty() {
        if let Some(first) = ranked.first() {
            selected.push(first.clone());
        }
    }

    selected.sort_by(|a, b| a.start.total_cmp(&b.start));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{LexiconSentiment, NeutralSentiment};

    fn seg(start: f64, end: f64, energy: f64) -> Segment {
        Segment::new(start, end, energy)
    }

    fn caption_track() -> Vec<Caption> {
        vec![
            Caption::new(0.2, 1.8, "welcome back to the channel everyone"),
            Caption::new(2.2, 3.8, "WOW this is amazing!!"),
            Caption::new(4.2, 5.8, "the meeting continued as planned."),
        ]
    }

    #[test]
    fn excited_text_outscores_neutral_on_impact() {
        let segments = vec![seg(2.0, 4.0, 100.0), seg(4.0, 6.0, 100.0)];
        let ranking = score_segments(&segments, &caption_track(), 60.0, &NeutralSentiment);

        let by_start = {
            let mut v = ranking.ranked.clone();
            v.sort_by(|a, b| a.start.total_cmp(&b.start));
            v
        };
        let excited = by_start[0].reasons.as_ref().unwrap();
        let neutral = by_start[1].reasons.as_ref().unwrap();
        assert!(excited["impact"] > neutral["impact"]);
        assert!(excited["excitement_multiplier"] > neutral["excitement_multiplier"]);
    }

    #[test]
    fn scoring_is_idempotent() {
        let segments = vec![seg(0.0, 2.0, 50.0), seg(2.0, 4.0, 120.0), seg(4.0, 6.0, 80.0)];
        let captions = caption_track();
        let analyzer = LexiconSentiment::default();

        let first = score_segments(&segments, &captions, 30.0, &analyzer);
        let second = score_segments(&segments, &captions, 30.0, &analyzer);
        let a: Vec<f64> = first.ranked.iter().map(|s| s.score).collect();
        let b: Vec<f64> = second.ranked.iter().map(|s| s.score).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn budget_is_respected_and_output_chronological() {
        let ranked = vec![
            seg(10.0, 14.0, 1.0),
            seg(0.0, 3.0, 1.0),
            seg(20.0, 24.0, 1.0),
            seg(30.0, 34.0, 1.0),
        ];
        let selected = select_within_budget(&ranked, 8.0);

        let total: f64 = selected.iter().map(Segment::duration).sum();
        assert!(total <= 8.0 + BUDGET_TOLERANCE_SECS);
        for pair in selected.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert!(pair[0].end <= pair[1].start + 1e-9, "selection overlaps");
        }
    }

    #[test]
    fn overrunning_segment_is_truncated_to_fill_budget() {
        let ranked = vec![seg(0.0, 5.0, 1.0), seg(10.0, 20.0, 0.5)];
        let selected = select_within_budget(&ranked, 8.0);

        assert_eq!(selected.len(), 2);
        let total: f64 = selected.iter().map(Segment::duration).sum();
        assert!((total - 8.0).abs() < 1e-9);
        // The second pick was cut to the remaining 3 seconds.
        assert!((selected[1].end - 13.0).abs() < 1e-9);
    }

    #[test]
    fn selection_is_monotonic_in_score() {
        let mut ranked = vec![
            seg(0.0, 2.0, 1.0),
            seg(5.0, 7.0, 1.0),
            seg(10.0, 12.0, 1.0),
        ];
        ranked[0].score = 3.0;
        ranked[1].score = 2.0;
        ranked[2].score = 1.0;

        // Budget fits exactly two clips; the lowest-scored must be the
        // one left out.
        let selected = select_within_budget(&ranked, 4.0);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|s| s.score >= 2.0));
    }

    #[test]
    fn min_duration_cutoff_skips_blips() {
        let ranked = vec![seg(0.0, 0.3, 9.0), seg(5.0, 7.0, 1.0)];
        let selected = select_within_budget(&ranked, 10.0);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].start, 5.0);
    }

    #[test]
    fn fallback_keeps_output_non_empty() {
        // Every candidate fails the minimum-duration cutoff, yet the
        // top-ranked one is still returned.
        let ranked = vec![seg(0.0, 0.2, 1.0), seg(1.0, 1.3, 0.5)];
        let selected = select_within_budget(&ranked, 30.0);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].start, 0.0);
    }

    #[test]
    fn empty_candidates_yield_empty_ranking() {
        let ranking = score_segments(&[], &caption_track(), 30.0, &NeutralSentiment);
        assert!(ranking.selected.is_empty());
        assert!(ranking.ranked.is_empty());
    }

    #[test]
    fn segments_without_captions_still_score() {
        let segments = vec![seg(100.0, 102.0, 10.0), seg(200.0, 203.0, 90.0)];
        let ranking = score_segments(&segments, &caption_track(), 30.0, &NeutralSentiment);
        assert_eq!(ranking.ranked.len(), 2);
        // Higher energy wins when no text distinguishes the segments.
        assert!(ranking.ranked[0].energy > ranking.ranked[1].energy);
        assert!(!ranking.selected.is_empty());
    }

    #[test]
    fn refined_end_is_capped_by_max_duration() {
        let captions = vec![Caption::new(0.0, 10.0, "one very long caption block")];
        let segments = vec![seg(0.0, 10.0, 5.0)];
        let ranking = score_segments(&segments, &captions, 2.0, &NeutralSentiment);
        let scored = &ranking.ranked[0];
        assert!(scored.duration() <= 2.0 + 1e-9);
    }
}
