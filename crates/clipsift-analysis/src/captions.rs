//! SRT caption loading and segment alignment

use std::path::Path;

use clipsift_types::Caption;

/// Alignment jitter absorbed when matching captions to a segment.
const ALIGN_TOLERANCE_SECS: f64 = 0.25;

/// Padding applied around caption boundaries during refinement.
const REFINE_PAD_SECS: f64 = 0.15;

/// Minimum duration of a refined segment.
const REFINE_MIN_SECS: f64 = 0.1;

/// Errors raised while parsing the caption track.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("malformed caption timestamp: {0:?}")]
    Timestamp(String),
}

/// Parse an `HH:MM:SS,mmm` subtitle timestamp into seconds.
pub fn parse_timestamp(value: &str) -> Result<f64, CaptionError> {
    let bad = || CaptionError::Timestamp(value.to_string());

    let mut parts = value.trim().splitn(3, ':');
    let hours: u64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let minutes: u64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let rest = parts.next().ok_or_else(bad)?;
    let (seconds, millis) = rest.split_once(',').ok_or_else(bad)?;
    let seconds: u64 = seconds.parse().map_err(|_| bad())?;
    let millis: u64 = millis.parse().map_err(|_| bad())?;

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}

/// Parse SRT content into caption records.
///
/// Tolerant of blank-line variance: blocks are recognized by their
/// `start --> end` timing line, numeric index lines are skipped, and
/// multi-line text is joined with spaces.
pub fn parse_srt(content: &str) -> Result<Vec<Caption>, CaptionError> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut captions = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some((start_str, end_str)) = line.split_once("-->") {
            let start = parse_timestamp(start_str)?;
            let end = parse_timestamp(end_str)?;
            i += 1;
            let mut text_lines = Vec::new();
            while i < lines.len()
                && !lines[i].contains("-->")
                && !lines[i].chars().all(|c| c.is_ascii_digit())
            {
                text_lines.push(lines[i]);
                i += 1;
            }
            captions.push(Caption::new(start, end, text_lines.join(" ")));
        } else {
            i += 1;
        }
    }
    Ok(captions)
}

/// Load a caption track from disk. A missing file is a degraded input,
/// not an error: ranking continues with an empty caption set.
pub fn load_captions(path: &Path) -> anyhow::Result<Vec<Caption>> {
    if !path.exists() {
        tracing::warn!("caption track {} not found, ranking without text", path.display());
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let captions = parse_srt(&content)?;
    tracing::debug!(captions = captions.len(), "loaded caption track from {}", path.display());
    Ok(captions)
}

/// Positive overlap between two intervals, 0 when disjoint.
pub fn overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// Captions temporally overlapping `[start, end]`, with tolerance for
/// alignment jitter. Input must be sorted by start; the scan exits
/// early once captions begin past the window.
pub fn captions_for_segment<'a>(
    start: f64,
    end: f64,
    captions: &'a [Caption],
) -> Vec<&'a Caption> {
    let mut window = Vec::new();
    for caption in captions {
        if caption.end < start - ALIGN_TOLERANCE_SECS {
            continue;
        }
        if caption.start > end + ALIGN_TOLERANCE_SECS {
            break;
        }
        if overlap(start, end, caption.start, caption.end) > 0.0 {
            window.push(caption);
        }
    }
    window
}

/// Snap segment boundaries to the matched caption window, padded
/// slightly on both sides. An empty window leaves the segment as-is.
pub fn refine_bounds(start: f64, end: f64, window: &[&Caption]) -> (f64, f64) {
    if window.is_empty() {
        return (start, end);
    }
    let cap_start = window.iter().map(|c| c.start).fold(f64::INFINITY, f64::min);
    let cap_end = window.iter().map(|c| c.end).fold(f64::NEG_INFINITY, f64::max);
    let refined_start = (cap_start - REFINE_PAD_SECS).max(0.0);
    let refined_end = (cap_end + REFINE_PAD_SECS).max(refined_start + REFINE_MIN_SECS);
    (refined_start, refined_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_timestamp("00:00:01,500").unwrap(), 1.5);
        assert_eq!(parse_timestamp("01:02:03,250").unwrap(), 3723.25);
        assert_eq!(parse_timestamp(" 00:00:10,000 ").unwrap(), 10.0);
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert!(parse_timestamp("00:00:01.500").is_err());
        assert!(parse_timestamp("nonsense").is_err());
        assert!(parse_timestamp("00:01").is_err());
    }

    #[test]
    fn parses_srt_blocks() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nhello there\n\n2\n00:00:03,000 --> 00:00:04,500\nsecond line\nwraps here\n";
        let captions = parse_srt(srt).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "hello there");
        assert_eq!(captions[1].text, "second line wraps here");
        assert_eq!(captions[1].start, 3.0);
        assert_eq!(captions[1].end, 4.5);
    }

    #[test]
    fn tolerates_missing_blank_lines_and_indices() {
        let srt = "00:00:00,000 --> 00:00:01,000\nfirst\n2\n00:00:01,000 --> 00:00:02,000\nsecond";
        let captions = parse_srt(srt).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "first");
        assert_eq!(captions[1].text, "second");
    }

    #[test]
    fn window_matching_uses_tolerance_and_overlap() {
        let captions = vec![
            Caption::new(0.0, 1.0, "far before"),
            Caption::new(4.5, 5.5, "straddles start"),
            Caption::new(5.5, 6.5, "inside"),
            Caption::new(7.5, 8.5, "straddles end"),
            Caption::new(9.0, 10.0, "after"),
        ];
        let window = captions_for_segment(5.0, 8.0, &captions);
        let texts: Vec<&str> = window.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["straddles start", "inside", "straddles end"]);
    }

    #[test]
    fn touching_captions_do_not_match() {
        // Zero-length overlap fails the strict-positive test.
        let captions = vec![Caption::new(3.0, 5.0, "touches")];
        assert!(captions_for_segment(5.0, 8.0, &captions).is_empty());
    }

    #[test]
    fn refine_snaps_to_caption_bounds() {
        let caps = vec![Caption::new(5.0, 6.0, "a"), Caption::new(6.0, 8.0, "b")];
        let window: Vec<&Caption> = caps.iter().collect();
        let (start, end) = refine_bounds(4.0, 9.0, &window);
        assert!((start - 4.85).abs() < 1e-9);
        assert!((end - 8.15).abs() < 1e-9);
    }

    #[test]
    fn refine_without_captions_is_identity() {
        let (start, end) = refine_bounds(4.0, 9.0, &[]);
        assert_eq!((start, end), (4.0, 9.0));
    }

    #[test]
    fn refine_enforces_minimum_duration() {
        let caps = vec![Caption::new(0.05, 0.06, "blip")];
        let window: Vec<&Caption> = caps.iter().collect();
        let (start, end) = refine_bounds(0.0, 0.1, &window);
        assert!(end - start >= REFINE_MIN_SECS - 1e-9);
        assert!(start >= 0.0);
    }
}
