//! Audio file I/O

use std::path::Path;

use hound::{SampleFormat, WavReader};

/// Errors raised while reading PCM input.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The WAV file is not mono
    #[error("expected mono audio, got {0} channels")]
    ChannelCount(u16),
    /// The WAV file is not 16-bit integer PCM
    #[error("expected 16-bit integer PCM, got {bits}-bit {format}")]
    SampleWidth { bits: u16, format: &'static str },
    /// Underlying WAV decode failure
    #[error("failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),
}

/// Read a mono PCM16 WAV file, returning raw samples and the sample rate.
///
/// Any sample rate is accepted; channel count and sample width are
/// validated up front so malformed input fails before analysis starts.
pub fn read_pcm16(path: &Path) -> Result<(Vec<i16>, u32), AudioError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(AudioError::ChannelCount(spec.channels));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(AudioError::SampleWidth {
            bits: spec.bits_per_sample,
            format: match spec.sample_format {
                SampleFormat::Int => "integer",
                SampleFormat::Float => "float",
            },
        });
    }

    let rate = spec.sample_rate;
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()?;

    tracing::debug!(
        samples = samples.len(),
        rate,
        "loaded PCM16 audio from {}",
        path.display()
    );

    Ok((samples, rate))
}
