use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::models::{CharacterSheet, ScreenplayScene, SoundScene, StoryboardScene, WorkflowState};

/// Machine-readable dump of a completed run
#[derive(Debug, Serialize)]
struct RawData<'a> {
    novel_genre: &'a str,
    character_sheet: Option<&'a CharacterSheet>,
    screenplay_scenes: &'a [ScreenplayScene],
    storyboard_scenes: &'a [StoryboardScene],
    sound_scenes: &'a [SoundScene],
    revision_count: u32,
}

/// Paths written by [`save_results`]
#[derive(Debug)]
pub struct SavedPaths {
    pub script_path: PathBuf,
    pub data_path: PathBuf,
}

/// Write the human-readable script and the raw JSON dump into `dir`,
/// timestamped so repeated runs never clobber each other.
pub fn save_results(state: &WorkflowState, dir: &Path) -> Result<SavedPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {dir:?}"))?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    let script_path = dir.join(format!("final_script_{timestamp}.txt"));
    std::fs::write(&script_path, state.final_script.as_deref().unwrap_or(""))
        .with_context(|| format!("Failed to write final script: {script_path:?}"))?;
    info!("final script written to {script_path:?}");

    let raw = RawData {
        novel_genre: &state.novel_genre,
        character_sheet: state.character_sheet.as_ref(),
        screenplay_scenes: &state.screenplay_scenes,
        storyboard_scenes: &state.storyboard_scenes,
        sound_scenes: &state.sound_scenes,
        revision_count: state.iteration_count,
    };
    let data_path = dir.join(format!("raw_data_{timestamp}.json"));
    let json = serde_json::to_string_pretty(&raw).context("Failed to serialize raw data")?;
    std::fs::write(&data_path, json)
        .with_context(|| format!("Failed to write raw data: {data_path:?}"))?;
    info!("raw data written to {data_path:?}");

    Ok(SavedPaths {
        script_path,
        data_path,
    })
}
