use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::{
    HumanTarget, ReviewNote, ScreenplayScene, SoundScene, StageUpdate, StoryboardScene,
    WorkflowState,
};
use crate::stages::{StageName, StageNode};

/// Read-only snapshot shown to the human before they decide
#[derive(Debug)]
pub struct DraftPreview<'a> {
    pub cast_names: Vec<String>,
    pub first_screenplay: Option<&'a ScreenplayScene>,
    pub first_storyboard: Option<&'a StoryboardScene>,
    pub first_sound: Option<&'a SoundScene>,
    pub scene_count: usize,
}

impl<'a> DraftPreview<'a> {
    pub fn from_state(state: &'a WorkflowState) -> Self {
        Self {
            cast_names: state
                .character_sheet
                .as_ref()
                .map(|s| s.cast_names())
                .unwrap_or_default(),
            first_screenplay: state.screenplay_scenes.first(),
            first_storyboard: state.storyboard_scenes.first(),
            first_sound: state.sound_scenes.first(),
            scene_count: state.screenplay_scenes.len(),
        }
    }
}

/// The human's routing decision: hand the draft to the director, or send
/// one note to one stage.
#[derive(Debug, Clone)]
pub struct HumanDecision {
    pub target: HumanTarget,
    pub note: Option<ReviewNote>,
}

/// Capability boundary for the interactive decision. The engine blocks on
/// this call; the presentation medium behind it is not the core's concern.
pub trait HumanDecisionSource: Send + Sync {
    fn decide(&self, preview: &DraftPreview<'_>) -> Result<HumanDecision>;
}

/// Optional one-shot human checkpoint before the director.
///
/// Runs only when enabled and not yet consumed; in every other case it is
/// a zero-effect passthrough to the director. Sending a note to a stage
/// consumes the checkpoint for the rest of the segment's run.
pub struct HumanReview {
    source: Arc<dyn HumanDecisionSource>,
    enabled: bool,
}

impl HumanReview {
    pub fn new(source: Arc<dyn HumanDecisionSource>, enabled: bool) -> Self {
        Self { source, enabled }
    }
}

#[async_trait]
impl StageNode for HumanReview {
    fn name(&self) -> StageName {
        StageName::HumanReview
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        if !self.enabled {
            return Ok(StageUpdate {
                human_target: Some(HumanTarget::Director),
                ..Default::default()
            });
        }

        if state.human_review_consumed {
            info!("human review: already consumed, passing through to director");
            return Ok(StageUpdate {
                human_target: Some(HumanTarget::Director),
                ..Default::default()
            });
        }

        let preview = DraftPreview::from_state(state);
        let decision = self.source.decide(&preview)?;

        match decision.target {
            HumanTarget::Director => {
                info!("human review: approved, handing to director");
                Ok(StageUpdate {
                    human_target: Some(HumanTarget::Director),
                    review_notes: Some(vec![]),
                    ..Default::default()
                })
            }
            target => {
                info!(?target, "human review: note sent, checkpoint consumed");
                Ok(StageUpdate {
                    human_target: Some(target),
                    review_notes: Some(decision.note.into_iter().collect()),
                    human_review_consumed: Some(true),
                    ..Default::default()
                })
            }
        }
    }
}
