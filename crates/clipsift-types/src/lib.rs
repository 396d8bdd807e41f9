//! Shared types for ClipSift
//!
//! This crate contains the data model shared by the audio analysis,
//! highlight ranking, and CLI crates: captions, segments, timeline
//! regions, and the timeline JSON document itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Round a seconds/score value to 3 decimals for serialization.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ============================================================================
// Caption Types
// ============================================================================

/// A timed caption record from the subtitle track.
///
/// Produced externally (transcription); the analysis engine only reads
/// captions, never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Caption {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Caption text
    pub text: String,
}

impl Caption {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration in seconds, never negative.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

// ============================================================================
// Segment Types
// ============================================================================

/// Per-component score breakdown attached to a scored segment.
///
/// Descriptive output only; the ranking algorithm never reads it back.
pub type ScoreBreakdown = BTreeMap<String, f64>;

/// A candidate highlight segment.
///
/// Starts life as an acoustic region with an energy value, and is
/// decorated by the scorer with a final score and a reasons breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Acoustic energy of the underlying region
    pub energy: f64,
    /// Composite highlight score (0.0 until scored)
    pub score: f64,
    /// Component breakdown, present once scored
    pub reasons: Option<ScoreBreakdown>,
}

impl Segment {
    /// New unscored segment from an acoustic region.
    pub fn new(start: f64, end: f64, energy: f64) -> Self {
        Self {
            start,
            end,
            energy,
            score: 0.0,
            reasons: None,
        }
    }

    /// Duration in seconds, never negative.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Serializable clip entry with values rounded to 3 decimals.
    pub fn to_clip(&self) -> ClipSegment {
        ClipSegment {
            start: round3(self.start),
            end: round3(self.end),
            score: Some(round3(self.score)),
            energy: Some(round3(self.energy)),
            reasons: self.reasons.clone(),
        }
    }
}

/// A clip entry as persisted in the timeline document.
///
/// `score`/`energy`/`reasons` are absent on entries written by the
/// segmentation stage and present on entries written by the ranker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClipSegment {
    pub start: f64,
    pub end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<ScoreBreakdown>,
}

impl ClipSegment {
    /// Bare keep interval (segmentation stage output).
    pub fn interval(start: f64, end: f64) -> Self {
        Self {
            start: round3(start),
            end: round3(end),
            ..Default::default()
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

// ============================================================================
// Timeline Types
// ============================================================================

/// Interval kind in the alternating keep/drop timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Keep,
    Drop,
}

/// A typed interval in the segmenter's full-coverage timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineRegion {
    #[serde(rename = "type")]
    pub kind: RegionKind,
    pub start: f64,
    pub end: f64,
}

impl TimelineRegion {
    pub fn new(kind: RegionKind, start: f64, end: f64) -> Self {
        Self {
            kind,
            start: round3(start),
            end: round3(end),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// An alternative budget-constrained edit of the source material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub id: String,
    /// Mean score of the variant's segments
    pub score: f64,
    /// Total duration of the variant's segments in seconds
    pub duration: f64,
    pub keep: Vec<ClipSegment>,
}

/// The persisted timeline document.
///
/// Stages merge into this structure rather than replacing it: keys a
/// stage does not own are carried through untouched via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimelineDoc {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub keep: Vec<ClipSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<ClipSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<TimelineRegion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,
    /// Free-form provenance of the parameters each stage used.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    /// Keys written by other tools, preserved across merges.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round3_behaviour() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.0005), 0.001);
        assert_eq!(round3(2.0), 2.0);
    }

    #[test]
    fn caption_duration_never_negative() {
        let cap = Caption::new(5.0, 4.0, "backwards");
        assert_eq!(cap.duration(), 0.0);
    }

    #[test]
    fn bare_interval_omits_score_keys() {
        let clip = ClipSegment::interval(0.5, 1.5);
        let json = serde_json::to_value(&clip).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("start"));
        assert!(!obj.contains_key("score"));
        assert!(!obj.contains_key("energy"));
        assert!(!obj.contains_key("reasons"));
    }

    #[test]
    fn timeline_doc_preserves_unknown_keys() {
        let json = r#"{
            "duration": 10.0,
            "keep": [{"start": 1.0, "end": 2.0}],
            "source": "session-42.wav",
            "parameters": {"frame_ms": 30}
        }"#;
        let doc: TimelineDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.duration, 10.0);
        assert_eq!(doc.keep.len(), 1);
        assert_eq!(doc.extra.get("source").unwrap(), "session-42.wav");

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back.get("source").unwrap(), "session-42.wav");
        assert_eq!(
            back.get("parameters").unwrap().get("frame_ms").unwrap(),
            30
        );
    }

    #[test]
    fn region_kind_serializes_lowercase() {
        let region = TimelineRegion::new(RegionKind::Drop, 0.0, 1.0);
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json.get("type").unwrap(), "drop");
    }
}
