//! Hysteresis voice segmentation
//!
//! A single pass over the frame energy stream with minimum-run-length
//! speech/pause logic: a region only opens after `min_speech_ms` of
//! consecutive voiced frames and only closes after `min_pause_ms` of
//! consecutive unvoiced frames, which suppresses flicker around the
//! threshold. Confirmed regions are padded, merged, and complemented
//! into a full keep/drop timeline.

use clipsift_types::{ClipSegment, RegionKind, TimelineRegion};

use crate::energy::{self, Frame};

/// Gap below which padded regions are merged into one.
const MERGE_GAP_SECS: f64 = 0.02;

/// Intervals at or below this duration are dropped from the timeline.
const MIN_INTERVAL_SECS: f64 = 1e-3;

/// Segmentation parameters. Durations are in milliseconds for
/// readability; frame counts are derived from them.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Frame duration (ms)
    pub frame_ms: u32,
    /// Minimum voiced run to confirm speech start (ms)
    pub min_speech_ms: u32,
    /// Minimum unvoiced run to confirm a pause (ms)
    pub min_pause_ms: u32,
    /// Padding applied to both boundaries of a confirmed region (ms)
    pub padding_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            frame_ms: energy::FRAME_MS,
            min_speech_ms: 200,
            min_pause_ms: 350,
            padding_ms: 80,
        }
    }
}

impl SegmenterConfig {
    fn speech_frames(&self) -> usize {
        ((self.min_speech_ms / self.frame_ms) as usize).max(1)
    }

    fn pause_frames(&self) -> usize {
        ((self.min_pause_ms / self.frame_ms) as usize).max(1)
    }

    fn pad(&self) -> f64 {
        self.padding_ms as f64 / 1000.0
    }
}

/// An unrefined keep region emitted by the hysteresis pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub start: f64,
    pub end: f64,
}

impl Region {
    fn clamp(self, floor: f64, ceil: f64) -> Region {
        Region {
            start: self.start.max(floor),
            end: self.end.min(ceil),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Result of segmenting one audio buffer.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Total audio duration in seconds
    pub duration: f64,
    /// Energy threshold that was applied
    pub threshold: f64,
    /// Padded, merged, clamped keep regions
    pub keep: Vec<Region>,
    /// Alternating keep/drop timeline covering [0, duration]
    pub regions: Vec<TimelineRegion>,
}

impl Segmentation {
    /// Keep regions as serializable clip intervals, degenerate ones
    /// omitted.
    pub fn keep_clips(&self) -> Vec<ClipSegment> {
        self.keep
            .iter()
            .filter(|r| r.duration() > MIN_INTERVAL_SECS)
            .map(|r| ClipSegment::interval(r.start, r.end))
            .collect()
    }
}

/// Segment a mono PCM16 buffer into keep/drop regions.
pub fn segment_audio(samples: &[i16], rate: u32, config: &SegmenterConfig) -> Segmentation {
    let duration = if rate > 0 {
        samples.len() as f64 / rate as f64
    } else {
        0.0
    };

    let frames: Vec<Frame> = energy::frames(samples, rate, config.frame_ms).collect();
    let energies: Vec<f64> = frames.iter().map(|f| f.energy).collect();
    let threshold = energy::adaptive_threshold(&energies);

    let raw = detect_keep_regions(&frames, threshold, config);
    let keep: Vec<Region> = merge_adjacent(raw)
        .into_iter()
        .map(|r| r.clamp(0.0, duration))
        .collect();
    let regions = build_timeline(&keep, duration);

    tracing::debug!(
        frames = frames.len(),
        threshold,
        keep = keep.len(),
        "segmented {:.3}s of audio",
        duration
    );

    Segmentation {
        duration,
        threshold,
        keep,
        regions,
    }
}

/// Hysteresis accumulator threaded through the frame loop.
struct Hysteresis {
    in_speech: bool,
    speech_run: usize,
    silence_run: usize,
    region_start: f64,
}

/// Run the hysteresis state machine over the frame stream.
fn detect_keep_regions(frames: &[Frame], threshold: f64, config: &SegmenterConfig) -> Vec<Region> {
    let speech_frames = config.speech_frames();
    let pause_frames = config.pause_frames();
    let pad = config.pad();

    let mut keep = Vec::new();
    let mut state = Hysteresis {
        in_speech: false,
        speech_run: 0,
        silence_run: 0,
        region_start: 0.0,
    };

    for (idx, frame) in frames.iter().enumerate() {
        if frame.energy > threshold {
            state.speech_run += 1;
            state.silence_run = 0;
            if !state.in_speech && state.speech_run >= speech_frames {
                state.in_speech = true;
                // Backdate the start to the first frame of the
                // confirming run, minus padding.
                let first_voiced = &frames[idx + 1 - speech_frames];
                state.region_start = (first_voiced.start - pad).max(0.0);
            }
        } else {
            state.speech_run = 0;
            if state.in_speech {
                state.silence_run += 1;
                if state.silence_run >= pause_frames {
                    // Close at the last voiced frame, not the current
                    // unvoiced one.
                    let last_voiced = &frames[idx - pause_frames];
                    keep.push(Region {
                        start: state.region_start,
                        end: last_voiced.end() + pad,
                    });
                    state.in_speech = false;
                    state.silence_run = 0;
                }
            }
        }
    }

    if state.in_speech {
        if let Some(last) = frames.last() {
            keep.push(Region {
                start: state.region_start,
                end: last.end() + pad,
            });
        }
    }

    keep
}

/// Merge regions whose padded boundaries touch or overlap. Input is
/// already time-ordered, so a single pass suffices.
fn merge_adjacent(regions: Vec<Region>) -> Vec<Region> {
    let mut merged: Vec<Region> = Vec::with_capacity(regions.len());
    for region in regions {
        match merged.last_mut() {
            Some(prev) if region.start <= prev.end + MERGE_GAP_SECS => {
                prev.end = prev.end.max(region.end);
            }
            _ => merged.push(region),
        }
    }
    merged
}

/// Complement the keep regions into an alternating keep/drop timeline
/// covering `[0, duration]` exactly.
fn build_timeline(keep: &[Region], duration: f64) -> Vec<TimelineRegion> {
    let mut timeline = Vec::new();
    let mut cursor = 0.0;

    let mut push = |kind: RegionKind, region: Region| {
        let clamped = region.clamp(0.0, duration);
        if clamped.duration() > MIN_INTERVAL_SECS {
            timeline.push(TimelineRegion::new(kind, clamped.start, clamped.end));
        }
    };

    for region in keep {
        if region.start > cursor {
            push(
                RegionKind::Drop,
                Region {
                    start: cursor,
                    end: region.start,
                },
            );
        }
        push(RegionKind::Keep, *region);
        cursor = cursor.max(region.end);
    }
    if cursor < duration {
        push(
            RegionKind::Drop,
            Region {
                start: cursor,
                end: duration,
            },
        );
    }

    timeline
}
