//! Frame energy analysis and adaptive thresholding
//!
//! Raw PCM is sliced into fixed-duration frames; each frame carries its
//! mean squared sample value. A per-file energy threshold is derived
//! from the empirical energy distribution, since a fixed constant fails
//! across differing recording gains and noise floors.

/// Default frame duration in milliseconds. Matches the 30ms window of
/// common VAD setups while keeping per-frame work cheap.
pub const FRAME_MS: u32 = 30;

/// A fixed-duration audio slice with its energy statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Start time in seconds
    pub start: f64,
    /// Frame duration in seconds
    pub duration: f64,
    /// Mean squared sample value
    pub energy: f64,
}

impl Frame {
    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Number of samples per frame for a given rate and frame duration.
pub fn frame_samples(rate: u32, frame_ms: u32) -> usize {
    ((rate as f64 * frame_ms as f64 / 1000.0).round() as usize).max(1)
}

/// Slice samples into consecutive non-overlapping frames.
///
/// A truncated final frame (fewer samples than the nominal size) is
/// dropped rather than emitted, so every frame's energy is computed
/// over the same window length.
pub fn frames(samples: &[i16], rate: u32, frame_ms: u32) -> impl Iterator<Item = Frame> + '_ {
    let size = frame_samples(rate, frame_ms);
    let duration = size as f64 / rate as f64;
    samples
        .chunks_exact(size)
        .enumerate()
        .map(move |(index, chunk)| Frame {
            start: index as f64 * duration,
            duration,
            energy: mean_square(chunk),
        })
}

fn mean_square(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    sum / samples.len() as f64
}

/// Derive a voiced/unvoiced energy threshold from the distribution of
/// frame energies.
///
/// The 20th percentile estimates the noise floor and the 90th the
/// speech level; the threshold sits a fixed fraction above the floor.
/// Empty or silent input yields 0, classifying everything as silence.
pub fn adaptive_threshold(energies: &[f64]) -> f64 {
    if energies.is_empty() {
        return 0.0;
    }
    let mut sorted = energies.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted[sorted.len() - 1] <= 0.0 {
        return 0.0;
    }

    // Index clamped so tiny inputs (<= 5 frames) stay in bounds.
    let percentile = |fraction: f64| -> f64 {
        let pos = (sorted.len() as f64 * fraction) as usize;
        sorted[pos.min(sorted.len() - 1)]
    };

    let noise = percentile(0.2);
    let speech = percentile(0.9);
    if speech <= noise {
        return (noise * 0.6).max(noise + 1.0);
    }
    (noise * 1.2).max(noise + (speech - noise) * 0.2)
}
