//! Variant generation
//!
//! Each variant is an independent chronological edit anchored at a
//! different high-scoring segment, built by walking the ranked list
//! from the anchor's position under the same duration budget as the
//! primary selection. A shared used-key set keeps variants from
//! repeating each other's exact clips (the anchor itself is exempt, so
//! every variant is guaranteed its seed).

use std::collections::HashSet;

use clipsift_types::{round3, Segment, Variant};

use crate::scorer::{BUDGET_TOLERANCE_SECS, MIN_CLIP_SECS};

/// Minimum duration for non-anchor candidates inside a variant.
const MIN_VARIANT_CLIP_SECS: f64 = 0.35;

/// Clip identity key, rounded to 2 decimals.
fn clip_key(segment: &Segment) -> (i64, i64) {
    (
        (segment.start * 100.0).round() as i64,
        (segment.end * 100.0).round() as i64,
    )
}

/// Build up to `limit` alternative edits from the ranked candidates.
pub fn build_variants(ranked: &[Segment], max_duration: f64, limit: usize) -> Vec<Variant> {
    let mut variants: Vec<Variant> = Vec::new();
    if limit == 0 {
        return variants;
    }

    let mut used_keys: HashSet<(i64, i64)> = HashSet::new();
    for (anchor_idx, anchor) in ranked.iter().enumerate() {
        if anchor.duration() < MIN_CLIP_SECS {
            continue;
        }

        let mut timeline: Vec<Segment> = Vec::new();
        let mut total = 0.0;
        for (offset, candidate) in ranked[anchor_idx..].iter().enumerate() {
            let is_anchor = offset == 0;
            if candidate.duration() < MIN_VARIANT_CLIP_SECS {
                continue;
            }
            if !is_anchor && used_keys.contains(&clip_key(candidate)) {
                continue;
            }
            let remaining = max_duration - total;
            if remaining <= 0.0 {
                break;
            }
            let clipped = if candidate.duration() <= remaining + BUDGET_TOLERANCE_SECS {
                total += candidate.duration();
                candidate.clone()
            } else {
                let mut truncated = candidate.clone();
                truncated.end = truncated.start + remaining;
                total = max_duration;
                truncated
            };
            used_keys.insert(clip_key(&clipped));
            timeline.push(clipped);
            if total >= max_duration - BUDGET_TOLERANCE_SECS {
                break;
            }
        }

        if !timeline.is_empty() {
            timeline.sort_by(|a, b| a.start.total_cmp(&b.start));
            let count = timeline.len() as f64;
            let mean_score: f64 = timeline.iter().map(|s| s.score).sum::<f64>() / count.max(1.0);
            let duration: f64 = timeline.iter().map(Segment::duration).sum();
            variants.push(Variant {
                id: format!("variant-{}", variants.len() + 1),
                score: round3(mean_score),
                duration: round3(duration),
                keep: timeline.iter().map(Segment::to_clip).collect(),
            });
        }
        if variants.len() >= limit {
            break;
        }
    }

    variants
}
