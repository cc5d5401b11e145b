use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::prompts::{
    format_character_sheet, format_review_notes, render_template, STORYBOARD_TEMPLATE,
    TEMP_STORYBOARD,
};
use crate::llm::{extract_array, ContentGenerator};
use crate::models::{ReviewTarget, StageUpdate, StoryboardScene, WorkflowState};
use crate::stages::{StageName, StageNode};

/// Turns the screenplay into per-scene image-generation instructions. The
/// character sheet is injected into every prompt to keep the cast visually
/// consistent across scenes.
pub struct Storyboard {
    generator: Arc<dyn ContentGenerator>,
}

impl Storyboard {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl StageNode for Storyboard {
    fn name(&self) -> StageName {
        StageName::Storyboard
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        info!("storyboard: designing shots");

        let notes = format_review_notes(&state.review_notes, ReviewTarget::Storyboard);
        let screenplay = serde_json::to_string_pretty(&state.screenplay_scenes)?;
        let sheet = state
            .character_sheet
            .as_ref()
            .map(format_character_sheet)
            .unwrap_or_else(|| "(no character sheet extracted)".to_string());

        let instructions = render_template(
            STORYBOARD_TEMPLATE,
            &[
                ("novel_genre", state.novel_genre.as_str()),
                ("review_notes", notes.as_str()),
                ("character_sheet", sheet.as_str()),
                ("screenplay_scenes", screenplay.as_str()),
            ],
        );
        debug!(prompt_chars = instructions.chars().count(), "storyboard prompt built");

        let raw = self
            .generator
            .generate(
                &instructions,
                "Design the shots and output the storyboard JSON array.",
                TEMP_STORYBOARD,
            )
            .await?;

        let scenes = match extract_array::<StoryboardScene>(&raw) {
            Ok(scenes) => {
                info!(scenes = scenes.len(), "storyboard: shots complete");
                scenes
            }
            Err(e) => {
                warn!("storyboard: parse failed ({e}), substituting placeholder scene");
                vec![StoryboardScene {
                    scene_number: 0,
                    shot_type: "storyboard output could not be parsed".to_string(),
                    image_prompt: e.to_string(),
                    camera_movement: String::new(),
                    visual_notes: String::new(),
                }]
            }
        };

        Ok(StageUpdate {
            storyboard_scenes: Some(scenes),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GeneratorError;
    use crate::models::{CharacterProfile, CharacterSheet};
    use std::sync::Mutex;

    struct RecordingGenerator {
        response: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContentGenerator for RecordingGenerator {
        async fn generate(
            &self,
            instructions: &str,
            _: &str,
            _: f64,
        ) -> Result<String, GeneratorError> {
            self.seen
                .lock()
                .expect("lock poisoned")
                .push(instructions.to_string());
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_character_sheet_is_injected() {
        let generator = Arc::new(RecordingGenerator {
            response: "[]".to_string(),
            seen: Mutex::new(vec![]),
        });
        let stage = Storyboard::new(generator.clone());

        let mut state = WorkflowState::new("source", "wuxia");
        state.character_sheet = Some(CharacterSheet {
            main_characters: vec![CharacterProfile {
                name: "Su Lin".to_string(),
                image_keywords: "silver hair".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });

        stage.run(&state).await.unwrap();
        let seen = generator.seen.lock().expect("lock poisoned");
        assert!(seen[0].contains("silver hair"));
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_placeholder() {
        let generator = Arc::new(RecordingGenerator {
            response: "no".to_string(),
            seen: Mutex::new(vec![]),
        });
        let stage = Storyboard::new(generator);
        let state = WorkflowState::new("source", "wuxia");

        let update = stage.run(&state).await.unwrap();
        let scenes = update.storyboard_scenes.expect("placeholder written");
        assert_eq!(scenes[0].scene_number, 0);
        assert!(scenes[0].shot_type.contains("could not be parsed"));
    }
}
