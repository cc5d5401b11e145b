use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::prompts::{format_review_notes, render_template, SOUND_DESIGNER_TEMPLATE, TEMP_SOUND_DESIGNER};
use crate::llm::{extract_array, ContentGenerator};
use crate::models::{ReviewTarget, SoundScene, StageUpdate, WorkflowState};
use crate::stages::{StageName, StageNode};

/// Scores each scene with the three-layer sound plan (ambience, foley,
/// BGM mood), reading both upstream tracks.
pub struct SoundDesigner {
    generator: Arc<dyn ContentGenerator>,
}

impl SoundDesigner {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl StageNode for SoundDesigner {
    fn name(&self) -> StageName {
        StageName::SoundDesigner
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        info!("sound designer: scoring scenes");

        let notes = format_review_notes(&state.review_notes, ReviewTarget::SoundDesigner);
        let screenplay = serde_json::to_string_pretty(&state.screenplay_scenes)?;
        let storyboard = serde_json::to_string_pretty(&state.storyboard_scenes)?;

        let instructions = render_template(
            SOUND_DESIGNER_TEMPLATE,
            &[
                ("novel_genre", state.novel_genre.as_str()),
                ("review_notes", notes.as_str()),
                ("screenplay_scenes", screenplay.as_str()),
                ("storyboard_scenes", storyboard.as_str()),
            ],
        );
        debug!(prompt_chars = instructions.chars().count(), "sound prompt built");

        let raw = self
            .generator
            .generate(
                &instructions,
                "Design the sound plan and output the sound JSON array.",
                TEMP_SOUND_DESIGNER,
            )
            .await?;

        let scenes = match extract_array::<SoundScene>(&raw) {
            Ok(scenes) => {
                info!(scenes = scenes.len(), "sound designer: plan complete");
                scenes
            }
            Err(e) => {
                warn!("sound designer: parse failed ({e}), substituting placeholder scene");
                vec![SoundScene {
                    scene_number: 0,
                    ambience: "sound output could not be parsed".to_string(),
                    foley: e.to_string(),
                    bgm_mood: String::new(),
                }]
            }
        };

        Ok(StageUpdate {
            sound_scenes: Some(scenes),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GeneratorError;

    struct CannedGenerator(String);

    #[async_trait]
    impl ContentGenerator for CannedGenerator {
        async fn generate(&self, _: &str, _: &str, _: f64) -> Result<String, GeneratorError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_sound_plan_parses() {
        let generator = Arc::new(CannedGenerator(
            r#"[{"scene_number": 1, "ambience": "wind", "foley": "footsteps", "bgm_mood": "rising dread"}]"#.to_string(),
        ));
        let stage = SoundDesigner::new(generator);
        let state = WorkflowState::new("source", "wuxia");

        let update = stage.run(&state).await.unwrap();
        let scenes = update.sound_scenes.expect("scenes written");
        assert_eq!(scenes[0].bgm_mood, "rising dread");
        assert!(update.screenplay_scenes.is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_placeholder() {
        let generator = Arc::new(CannedGenerator("static noise".to_string()));
        let stage = SoundDesigner::new(generator);
        let state = WorkflowState::new("source", "wuxia");

        let update = stage.run(&state).await.unwrap();
        let scenes = update.sound_scenes.expect("placeholder written");
        assert_eq!(scenes[0].scene_number, 0);
        assert!(scenes[0].ambience.contains("could not be parsed"));
    }
}
