use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::prompts::{render_template, CHARACTER_EXTRACTOR_TEMPLATE, TEMP_CHARACTER_EXTRACTOR};
use crate::llm::{extract_object, ContentGenerator};
use crate::models::{CharacterSheet, StageUpdate, WorkflowState};
use crate::stages::{StageName, StageNode};

/// Entry stage: extracts the character sheet from the source text.
///
/// Runs exactly once per segment. A failed extraction degrades to an empty
/// sheet so the run continues; the cost is visual consistency, not progress.
pub struct CharacterExtractor {
    generator: Arc<dyn ContentGenerator>,
}

impl CharacterExtractor {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl StageNode for CharacterExtractor {
    fn name(&self) -> StageName {
        StageName::CharacterExtractor
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        info!("character extractor: analyzing source text");

        let instructions = render_template(
            CHARACTER_EXTRACTOR_TEMPLATE,
            &[
                ("novel_genre", state.novel_genre.as_str()),
                ("novel_text", state.novel_text.as_str()),
            ],
        );
        debug!(prompt_chars = instructions.chars().count(), "extractor prompt built");

        let raw = self
            .generator
            .generate(
                &instructions,
                "Analyze the source text and output the character sheet JSON.",
                TEMP_CHARACTER_EXTRACTOR,
            )
            .await?;

        let sheet = match extract_object::<CharacterSheet>(&raw) {
            Ok(sheet) => {
                info!(
                    characters = sheet.main_characters.len(),
                    "character extractor: sheet complete"
                );
                sheet
            }
            Err(e) => {
                warn!("character extractor: parse failed ({e}), continuing with empty sheet");
                CharacterSheet {
                    main_characters: vec![],
                    world_visual_style: format!("extraction failed: {e}"),
                    color_palette: String::new(),
                }
            }
        };

        Ok(StageUpdate {
            character_sheet: Some(sheet),
            ..Default::default()
        })
    }
}
