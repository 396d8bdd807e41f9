//! Audio analysis crate for ClipSift
//!
//! Turns raw mono PCM16 audio into a keep/drop timeline:
//! - **WAV input** via hound, with fail-fast format validation
//! - **Frame energy analysis** over fixed 30ms windows
//! - **Adaptive thresholding** from the per-file energy distribution
//! - **Hysteresis segmentation** with padding and merge passes

pub mod energy;
pub mod file_io;
pub mod segmenter;

pub use energy::{adaptive_threshold, frames, Frame, FRAME_MS};
pub use file_io::{read_pcm16, AudioError};
pub use segmenter::{segment_audio, Region, Segmentation, SegmenterConfig};

use std::path::Path;

use anyhow::Context;

/// Load a mono PCM16 WAV file, returning samples and the sample rate.
pub fn load_pcm16(path: &Path) -> anyhow::Result<(Vec<i16>, u32)> {
    file_io::read_pcm16(path).with_context(|| format!("failed to load audio from {}", path.display()))
}
