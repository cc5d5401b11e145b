use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::prompts::{format_review_notes, render_template, SCREENWRITER_TEMPLATE, TEMP_SCREENWRITER};
use crate::llm::{extract_array, ContentGenerator};
use crate::models::{ReviewTarget, ScreenplayScene, StageUpdate, WorkflowState};
use crate::stages::{StageName, StageNode};

/// Adapts the source text into numbered screenplay scenes. On revision
/// passes the reviewer's notes addressed to this stage take priority over
/// the default adaptation rules.
pub struct Screenwriter {
    generator: Arc<dyn ContentGenerator>,
}

impl Screenwriter {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl StageNode for Screenwriter {
    fn name(&self) -> StageName {
        StageName::Screenwriter
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        info!("screenwriter: drafting scenes");

        let notes = format_review_notes(&state.review_notes, ReviewTarget::Screenwriter);
        let instructions = render_template(
            SCREENWRITER_TEMPLATE,
            &[
                ("novel_genre", state.novel_genre.as_str()),
                ("review_notes", notes.as_str()),
                ("novel_text", state.novel_text.as_str()),
            ],
        );
        debug!(prompt_chars = instructions.chars().count(), "screenwriter prompt built");

        let raw = self
            .generator
            .generate(
                &instructions,
                "Adapt the source text and output the screenplay scene JSON array.",
                TEMP_SCREENWRITER,
            )
            .await?;

        let scenes = match extract_array::<ScreenplayScene>(&raw) {
            Ok(scenes) => {
                info!(scenes = scenes.len(), "screenwriter: draft complete");
                scenes
            }
            Err(e) => {
                warn!("screenwriter: parse failed ({e}), substituting placeholder scene");
                vec![ScreenplayScene {
                    scene_number: 0,
                    setting: "screenwriter output could not be parsed".to_string(),
                    action: e.to_string(),
                    dialogue: vec![],
                    visual_hint: String::new(),
                }]
            }
        };

        Ok(StageUpdate {
            screenplay_scenes: Some(scenes),
            ..Default::default()
        })
    }
}
