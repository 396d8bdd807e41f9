//! ClipSift command-line interface
//!
//! Two-stage pipeline over a recorded session:
//! - `detect` runs energy-based voice segmentation over a WAV file and
//!   writes a keep/drop timeline document.
//! - `rank` scores the document's candidate segments against an SRT
//!   caption track and merges the highlight selection and variants back
//!   into the document.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipsift_analysis::traits::SentimentAnalyzer;
use clipsift_analysis::{build_variants, load_captions, score_segments};
use clipsift_analysis::{LexiconSentiment, NeutralSentiment};
use clipsift_audio::SegmenterConfig;
use clipsift_types::{round3, ClipSegment, Segment, TimelineDoc};

#[derive(Parser)]
#[command(name = "clipsift", version, about = "highlight clip extraction for recorded sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect speech regions and write a keep/drop timeline
    Detect {
        /// Mono PCM16 WAV input
        #[arg(long)]
        audio: PathBuf,
        /// Timeline JSON output path
        #[arg(long)]
        out: PathBuf,
    },
    /// Score timeline candidates against captions and rank highlights
    Rank {
        /// Timeline JSON produced by the detect stage
        #[arg(long)]
        timeline: PathBuf,
        /// SRT caption track
        #[arg(long)]
        captions: PathBuf,
        /// Output path [default: the timeline path]
        #[arg(long)]
        out: Option<PathBuf>,
        /// Maximum total highlight duration in seconds
        #[arg(long, default_value_t = 59.0)]
        max_duration: f64,
        /// Maximum number of alternative edits to generate
        #[arg(long, default_value_t = 3)]
        max_variants: usize,
        /// Sentiment analyzer: lexicon or neutral
        #[arg(long, default_value = "lexicon")]
        sentiment: String,
    },
}

fn main() {
    // Log to stderr; stdout stays clean for scripting.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Detect { audio, out } => run_detect(&audio, &out),
        Command::Rank {
            timeline,
            captions,
            out,
            max_duration,
            max_variants,
            sentiment,
        } => {
            let out = out.unwrap_or_else(|| timeline.clone());
            run_rank(
                &timeline,
                &captions,
                &out,
                max_duration,
                max_variants,
                &sentiment,
            )
        }
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_detect(audio: &Path, out: &Path) -> Result<()> {
    let (samples, rate) = clipsift_audio::load_pcm16(audio)?;
    let config = SegmenterConfig::default();
    let segmentation = clipsift_audio::segment_audio(&samples, rate, &config);

    let mut doc = TimelineDoc {
        duration: round3(segmentation.duration),
        keep: segmentation.keep_clips(),
        regions: segmentation.regions.clone(),
        ..Default::default()
    };
    doc.parameters.insert(
        "silence_detection".into(),
        json!({
            "frame_ms": config.frame_ms,
            "min_speech_ms": config.min_speech_ms,
            "min_pause_ms": config.min_pause_ms,
            "padding_ms": config.padding_ms,
            "threshold": segmentation.threshold,
        }),
    );

    write_doc(out, &doc)?;
    tracing::info!(
        keep = doc.keep.len(),
        duration = doc.duration,
        "wrote timeline to {}",
        out.display()
    );
    Ok(())
}

fn run_rank(
    timeline: &Path,
    captions_path: &Path,
    out: &Path,
    max_duration: f64,
    max_variants: usize,
    sentiment: &str,
) -> Result<()> {
    let content = std::fs::read_to_string(timeline)
        .with_context(|| format!("timeline not found at {}", timeline.display()))?;
    let mut doc: TimelineDoc = serde_json::from_str(&content)
        .with_context(|| format!("invalid timeline JSON at {}", timeline.display()))?;

    let candidates = candidate_segments(&doc);
    let captions = load_captions(captions_path)?;
    let analyzer = select_sentiment(sentiment);

    let ranking = score_segments(&candidates, &captions, max_duration, analyzer.as_ref());
    let variants = build_variants(&ranking.ranked, max_duration, max_variants.max(1));

    // Candidates keep their full set: every evaluated segment, with
    // scored entries replacing the bare ones they came from.
    let mut combined: std::collections::BTreeMap<(i64, i64), ClipSegment> = candidates
        .iter()
        .map(|s| (doc_key(s), s.to_clip()))
        .collect();
    for segment in &ranking.ranked {
        combined.insert(doc_key(segment), segment.to_clip());
    }

    doc.keep = ranking.selected.iter().map(Segment::to_clip).collect();
    doc.candidates = combined.into_values().collect();
    doc.candidates
        .sort_by(|a, b| a.start.total_cmp(&b.start));
    doc.variants = variants;
    doc.parameters.insert(
        "highlight_ranking".into(),
        json!({
            "max_duration": max_duration,
            "caption_count": captions.len(),
            "variants": doc.variants.len(),
            "sentiment": analyzer.name(),
        }),
    );

    write_doc(out, &doc)?;
    tracing::info!(
        selected = doc.keep.len(),
        variants = doc.variants.len(),
        "refined timeline saved to {}",
        out.display()
    );
    Ok(())
}

/// Acoustic candidates from the document: the `candidates` list when
/// present, otherwise the detect stage's `keep` list. The persisted
/// `score` field carries the upstream energy value.
fn candidate_segments(doc: &TimelineDoc) -> Vec<Segment> {
    let source = if doc.candidates.is_empty() {
        &doc.keep
    } else {
        &doc.candidates
    };
    source
        .iter()
        .filter(|clip| clip.end > clip.start)
        .map(|clip| Segment::new(clip.start, clip.end, clip.score.unwrap_or(0.0)))
        .collect()
}

fn select_sentiment(name: &str) -> Box<dyn SentimentAnalyzer> {
    match name {
        "lexicon" => Box::new(LexiconSentiment),
        "neutral" => Box::new(NeutralSentiment),
        other => {
            tracing::warn!("unknown sentiment analyzer {:?}, using neutral scores", other);
            Box::new(NeutralSentiment)
        }
    }
}

fn doc_key(segment: &Segment) -> (i64, i64) {
    (
        (segment.start * 1000.0).round() as i64,
        (segment.end * 1000.0).round() as i64,
    )
}

fn write_doc(path: &Path, doc: &TimelineDoc) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write timeline to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, samples: &[i16], rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn session_audio(rate: u32) -> Vec<i16> {
        // Two speech bursts separated by a long pause.
        let mut samples = vec![0_i16; rate as usize / 2];
        samples.extend(vec![2000_i16; rate as usize * 2]);
        samples.extend(vec![0_i16; rate as usize]);
        samples.extend(vec![2000_i16; rate as usize * 2]);
        samples.extend(vec![0_i16; rate as usize / 2]);
        samples
    }

    #[test]
    fn detect_then_rank_merges_into_one_document() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("session.wav");
        let timeline = dir.path().join("timeline.json");
        let srt = dir.path().join("captions.srt");

        write_wav(&audio, &session_audio(16000), 16000);
        std::fs::write(
            &srt,
            "1\n00:00:00,600 --> 00:00:02,400\nwelcome back everyone\n\n2\n00:00:03,600 --> 00:00:05,400\nthis launch is absolutely amazing!!\n",
        )
        .unwrap();

        run_detect(&audio, &timeline).unwrap();
        let doc: TimelineDoc =
            serde_json::from_str(&std::fs::read_to_string(&timeline).unwrap()).unwrap();
        assert_eq!(doc.keep.len(), 2);
        assert!(doc.parameters.contains_key("silence_detection"));

        run_rank(&timeline, &srt, &timeline, 59.0, 3, "lexicon").unwrap();
        let doc: TimelineDoc =
            serde_json::from_str(&std::fs::read_to_string(&timeline).unwrap()).unwrap();

        // The detect stage's keys survive the merge.
        assert!(doc.parameters.contains_key("silence_detection"));
        assert!(doc.parameters.contains_key("highlight_ranking"));
        assert!(!doc.regions.is_empty());

        assert!(!doc.keep.is_empty());
        let total: f64 = doc.keep.iter().map(|c| c.duration()).sum();
        assert!(total <= 59.05);
        for clip in &doc.keep {
            assert!(clip.score.is_some());
            assert!(clip.reasons.is_some());
        }
        assert!(!doc.candidates.is_empty());
        assert!(!doc.variants.is_empty());
    }

    #[test]
    fn rank_missing_timeline_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let srt = dir.path().join("captions.srt");
        let err = run_rank(&missing, &srt, &missing, 59.0, 3, "neutral").unwrap_err();
        assert!(err.to_string().contains("timeline not found"));
    }

    #[test]
    fn rank_missing_captions_still_selects() {
        let dir = tempfile::tempdir().unwrap();
        let timeline = dir.path().join("timeline.json");
        let out = dir.path().join("ranked.json");
        std::fs::write(
            &timeline,
            r#"{"duration": 10.0, "keep": [{"start": 1.0, "end": 3.0}, {"start": 5.0, "end": 8.0}]}"#,
        )
        .unwrap();

        run_rank(&timeline, &dir.path().join("absent.srt"), &out, 59.0, 3, "neutral").unwrap();
        let doc: TimelineDoc =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(!doc.keep.is_empty());
    }

    #[test]
    fn candidate_loading_prefers_candidates_and_reads_energy_from_score() {
        let json = r#"{
            "duration": 10.0,
            "keep": [{"start": 0.0, "end": 1.0}],
            "candidates": [
                {"start": 1.0, "end": 2.0, "score": 5.5},
                {"start": 3.0, "end": 3.0}
            ]
        }"#;
        let doc: TimelineDoc = serde_json::from_str(json).unwrap();
        let segments = candidate_segments(&doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].energy, 5.5);
    }

    #[test]
    fn unknown_sentiment_falls_back_to_neutral() {
        let analyzer = select_sentiment("vader");
        assert_eq!(analyzer.name(), "neutral");
        assert_eq!(analyzer.score("amazing"), 0.0);
    }
}
