//! Segment splitting for oversized inputs.
//!
//! Long chapters blow past model context limits and push the model from
//! adaptation into summarization, so anything over the target size is cut
//! into segments along the strongest boundary available: section divider
//! lines first, then paragraph breaks, then sentence-ending punctuation,
//! then a hard character cut as the last resort. Segments are contiguous
//! slices of the trimmed input, so concatenating their primary texts in
//! order reproduces it exactly.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{Segment, SegmentConfig};

fn divider_regex() -> &'static Regex {
    static DIVIDER: OnceLock<Regex> = OnceLock::new();
    DIVIDER.get_or_init(|| Regex::new(r"\n[-─*═=]{3,}\n").expect("valid regex"))
}

fn paragraph_regex() -> &'static Regex {
    static PARAGRAPH: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH.get_or_init(|| Regex::new(r"\n{2,}").expect("valid regex"))
}

fn sentence_regex() -> &'static Regex {
    static SENTENCE: OnceLock<Regex> = OnceLock::new();
    SENTENCE.get_or_init(|| Regex::new(r"[。！？…!?.]+").expect("valid regex"))
}

/// Split the input into ordered segments of at most `target_size`
/// characters of primary text each, with optional overlap previews.
pub fn split_into_segments(text: &str, config: &SegmentConfig) -> Vec<Segment> {
    let trimmed = text.trim();
    let total_chars = trimmed.chars().count();

    if total_chars <= config.target_size {
        return vec![Segment {
            text: trimmed.to_string(),
            order: 0,
            overlap_preview: None,
        }];
    }

    let mut pieces: Vec<String> = Vec::new();
    for (start, end) in boundaries(trimmed, divider_regex()) {
        let section = &trimmed[start..end];
        if section.chars().count() <= config.target_size {
            pieces.push(section.to_string());
        } else {
            pack_paragraphs(section, config.target_size, &mut pieces);
        }
    }
    debug!(
        total_chars,
        pieces = pieces.len(),
        target = config.target_size,
        "input split"
    );

    let previews: Vec<Option<String>> = (0..pieces.len())
        .map(|i| {
            if config.overlap == 0 || i + 1 >= pieces.len() {
                None
            } else {
                Some(pieces[i + 1].chars().take(config.overlap).collect())
            }
        })
        .collect();

    pieces
        .into_iter()
        .zip(previews)
        .enumerate()
        .map(|(order, (text, overlap_preview))| Segment {
            text,
            order,
            overlap_preview,
        })
        .collect()
}

/// Byte ranges covering `text` completely, cut after every regex match so
/// the separator stays attached to the preceding piece.
fn boundaries(text: &str, separator: &Regex) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for found in separator.find_iter(text) {
        if found.end() > start {
            ranges.push((start, found.end()));
            start = found.end();
        }
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }
    ranges
}

/// Pack consecutive paragraphs until the next one would exceed the target.
/// A paragraph alone over the target falls through to sentence splitting.
fn pack_paragraphs(section: &str, target: usize, out: &mut Vec<String>) {
    let mut acc: Option<(usize, usize, usize)> = None; // start, end, chars

    for (start, end) in boundaries(section, paragraph_regex()) {
        let chars = section[start..end].chars().count();

        if chars > target {
            if let Some((s, e, _)) = acc.take() {
                out.push(section[s..e].to_string());
            }
            split_sentences(&section[start..end], target, out);
            continue;
        }

        acc = match acc {
            Some((s, e, c)) if c + chars > target => {
                out.push(section[s..e].to_string());
                Some((start, end, chars))
            }
            Some((s, _, c)) => Some((s, end, c + chars)),
            None => Some((start, end, chars)),
        };
    }

    if let Some((s, e, _)) = acc {
        out.push(section[s..e].to_string());
    }
}

/// Pack sentences the same way; a sentence alone over the target is
/// hard-cut at the character boundary, the only path that may break a
/// semantic unit.
fn split_sentences(paragraph: &str, target: usize, out: &mut Vec<String>) {
    let mut acc: Option<(usize, usize, usize)> = None;

    for (start, end) in boundaries(paragraph, sentence_regex()) {
        let chars = paragraph[start..end].chars().count();

        if chars > target {
            if let Some((s, e, _)) = acc.take() {
                out.push(paragraph[s..e].to_string());
            }
            hard_cut(&paragraph[start..end], target, out);
            continue;
        }

        acc = match acc {
            Some((s, e, c)) if c + chars > target => {
                out.push(paragraph[s..e].to_string());
                Some((start, end, chars))
            }
            Some((s, _, c)) => Some((s, end, c + chars)),
            None => Some((start, end, chars)),
        };
    }

    if let Some((s, e, _)) = acc {
        out.push(paragraph[s..e].to_string());
    }
}

fn hard_cut(text: &str, target: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == target {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        out.push(current);
    }
}

/// Pre-split statistics for user-facing reporting, without splitting
#[derive(Debug, Clone)]
pub struct SplitStats {
    pub total_chars: usize,
    pub estimated_segments: usize,
    pub needs_split: bool,
}

pub fn analyze_input(text: &str, target_size: usize) -> SplitStats {
    let total_chars = text.trim().chars().count();
    SplitStats {
        total_chars,
        estimated_segments: total_chars.div_ceil(target_size).max(1),
        needs_split: total_chars > target_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target_size: usize, overlap: usize) -> SegmentConfig {
        SegmentConfig {
            target_size,
            overlap,
        }
    }

    fn joined_primary(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_short_input_is_a_single_trimmed_segment() {
        let segments = split_into_segments("  a short tale \n", &config(100, 10));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "a short tale");
        assert!(segments[0].overlap_preview.is_none());
    }

    #[test]
    fn test_round_trip_over_paragraphs() {
        let text = "First paragraph, with some length to it.\n\nSecond paragraph, also sized.\n\nThird paragraph closes the piece.";
        let segments = split_into_segments(text, &config(50, 10));
        assert!(segments.len() > 1);
        assert_eq!(joined_primary(&segments), text.trim());
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.order, i);
            assert!(segment.char_count() <= 50);
        }
    }

    #[test]
    fn test_round_trip_survives_tiny_target() {
        let text = "One. Two! Three? 四。五！";
        let segments = split_into_segments(text, &config(1, 0));
        assert_eq!(joined_primary(&segments), text);
        for segment in &segments {
            assert_eq!(segment.char_count(), 1);
        }
    }

    #[test]
    fn test_divider_lines_split_first() {
        let body_a = "a".repeat(30);
        let body_b = "b".repeat(30);
        let text = format!("{body_a}\n---\n{body_b}");
        let segments = split_into_segments(&text, &config(40, 0));
        assert_eq!(segments.len(), 2);
        assert!(segments[0].text.starts_with(&body_a));
        assert_eq!(segments[1].text, body_b);
        assert_eq!(joined_primary(&segments), text);
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_sentences() {
        let text = format!("{}。{}。{}。", "甲".repeat(30), "乙".repeat(30), "丙".repeat(30));
        let segments = split_into_segments(&text, &config(40, 0));
        assert!(segments.len() >= 3);
        assert_eq!(joined_primary(&segments), text);
        for segment in &segments {
            assert!(segment.char_count() <= 40);
        }
    }

    #[test]
    fn test_unbreakable_run_is_hard_cut() {
        let text = "x".repeat(5_000);
        let segments = split_into_segments(&text, &config(2_000, 200));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].char_count(), 2_000);
        assert_eq!(segments[1].char_count(), 2_000);
        assert_eq!(segments[2].char_count(), 1_000);
        assert_eq!(joined_primary(&segments).chars().count(), 5_000);
    }

    #[test]
    fn test_overlap_preview_on_every_non_final_segment() {
        let text = "x".repeat(5_000);
        let segments = split_into_segments(&text, &config(2_000, 200));
        assert_eq!(
            segments[0].overlap_preview.as_ref().map(|p| p.chars().count()),
            Some(200)
        );
        assert!(segments[1].overlap_preview.is_some());
        assert!(segments.last().expect("segments").overlap_preview.is_none());
    }

    #[test]
    fn test_preview_matches_next_segment_prefix() {
        let text = "First paragraph, with some length to it.\n\nSecond paragraph, also sized for this.";
        let segments = split_into_segments(text, &config(45, 12));
        assert!(segments.len() >= 2);
        let preview = segments[0].overlap_preview.as_ref().expect("preview");
        assert!(segments[1].text.starts_with(preview.as_str()));
    }

    #[test]
    fn test_multibyte_hard_cut_lands_on_char_boundaries() {
        let text = "龙".repeat(250);
        let segments = split_into_segments(&text, &config(100, 20));
        assert_eq!(segments.len(), 3);
        assert_eq!(joined_primary(&segments), text);
    }

    #[test]
    fn test_analyze_input_stats() {
        let stats = analyze_input(&"x".repeat(4_500), 2_000);
        assert_eq!(stats.total_chars, 4_500);
        assert_eq!(stats.estimated_segments, 3);
        assert!(stats.needs_split);

        let stats = analyze_input("short", 2_000);
        assert_eq!(stats.estimated_segments, 1);
        assert!(!stats.needs_split);
    }
}
