use serde::{Deserialize, Serialize};

/// Configuration for segment splitting
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Maximum primary text size per segment, in characters
    pub target_size: usize,
    /// Characters of the following segment carried as read-only preview
    pub overlap: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            target_size: 2_000,
            overlap: 200,
        }
    }
}

/// Marker prepended to the overlap preview so downstream stages can tell
/// carried context apart from real content.
pub const OVERLAP_MARKER: &str = "[continuation preview >>]";

/// A contiguous slice of the source text processed as one independent
/// run of the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Primary text. Concatenating the primary texts of all segments in
    /// order reproduces the trimmed source exactly.
    pub text: String,
    /// Position in input order, starting at 0
    pub order: usize,
    /// First `overlap` characters of the next segment, absent on the final one
    pub overlap_preview: Option<String>,
}

impl Segment {
    /// Text handed to the stages: primary text plus the marked preview.
    /// The preview is additive context, never part of the round-trip.
    pub fn prompt_text(&self) -> String {
        match &self.overlap_preview {
            Some(preview) => format!("{}\n\n{} {}...", self.text, OVERLAP_MARKER, preview),
            None => self.text.clone(),
        }
    }

    /// Primary text length in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text_without_preview_is_identity() {
        let segment = Segment {
            text: "some text".to_string(),
            order: 0,
            overlap_preview: None,
        };
        assert_eq!(segment.prompt_text(), "some text");
    }

    #[test]
    fn test_prompt_text_marks_preview() {
        let segment = Segment {
            text: "first part".to_string(),
            order: 0,
            overlap_preview: Some("second part".to_string()),
        };
        let prompt = segment.prompt_text();
        assert!(prompt.starts_with("first part"));
        assert!(prompt.contains(OVERLAP_MARKER));
        assert!(prompt.ends_with("second part..."));
    }
}
