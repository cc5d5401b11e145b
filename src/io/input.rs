use std::path::Path;

use anyhow::{Context, Result};

/// Read the source text from disk
pub fn load_source_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read input file: {path:?}"))
}
