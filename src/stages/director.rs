use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::engine::router::primary_revision_target;
use crate::llm::prompts::{render_template, DIRECTOR_TEMPLATE, TEMP_DIRECTOR};
use crate::llm::{extract_object, ContentGenerator};
use crate::models::{
    DialogueKind, ReviewDecision, RevisionTarget, StageUpdate, Verdict, WorkflowState,
};
use crate::stages::{StageName, StageNode};

/// Capability boundary for the review decision itself. The director stage
/// owns the loop mechanics (iteration counting, ceiling, routing); the
/// oracle owns the judgement.
#[async_trait]
pub trait ReviewOracle: Send + Sync {
    async fn evaluate(&self, state: &WorkflowState, iteration: u32) -> Result<ReviewDecision>;
}

/// LLM-backed review oracle. A response that cannot be parsed defaults to
/// approval: a mute reviewer must not be able to stall the pipeline.
pub struct LlmReviewOracle {
    generator: Arc<dyn ContentGenerator>,
}

impl LlmReviewOracle {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ReviewOracle for LlmReviewOracle {
    async fn evaluate(&self, state: &WorkflowState, iteration: u32) -> Result<ReviewDecision> {
        let iteration_text = iteration.to_string();
        let screenplay = serde_json::to_string_pretty(&state.screenplay_scenes)?;
        let storyboard = serde_json::to_string_pretty(&state.storyboard_scenes)?;
        let sound = serde_json::to_string_pretty(&state.sound_scenes)?;

        let instructions = render_template(
            DIRECTOR_TEMPLATE,
            &[
                ("iteration", iteration_text.as_str()),
                ("novel_text", state.novel_text.as_str()),
                ("screenplay_scenes", screenplay.as_str()),
                ("storyboard_scenes", storyboard.as_str()),
                ("sound_scenes", sound.as_str()),
            ],
        );
        debug!(prompt_chars = instructions.chars().count(), "director prompt built");

        let raw = self
            .generator
            .generate(
                &instructions,
                "Review the draft and output your decision JSON.",
                TEMP_DIRECTOR,
            )
            .await?;

        match extract_object::<ReviewDecision>(&raw) {
            Ok(decision) => Ok(decision),
            Err(e) => {
                warn!("director: decision parse failed ({e}), defaulting to approval");
                Ok(ReviewDecision {
                    decision: Verdict::Approve,
                    feedbacks: vec![],
                    summary: format!("decision unreadable, approved by default: {e}"),
                })
            }
        }
    }
}

/// Review checkpoint: approves or rejects the accumulated draft.
///
/// The iteration count is incremented before the ceiling is evaluated.
/// Once the incremented count exceeds the ceiling the draft is approved
/// unconditionally, from whatever scenes exist, without consulting the
/// oracle. That forced path is the loop's sole termination guarantee.
pub struct Director {
    oracle: Arc<dyn ReviewOracle>,
    max_revisions: u32,
}

impl Director {
    pub fn new(oracle: Arc<dyn ReviewOracle>, max_revisions: u32) -> Self {
        Self { oracle, max_revisions }
    }

    fn approve(&self, state: &WorkflowState, iteration: u32, summary: &str) -> StageUpdate {
        info!(iteration, "director: approved ({summary})");
        StageUpdate {
            revision_target: Some(RevisionTarget::Approved),
            approved: Some(true),
            iteration_count: Some(iteration),
            review_notes: Some(vec![]),
            final_script: Some(render_final_script(state)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl StageNode for Director {
    fn name(&self) -> StageName {
        StageName::Director
    }

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate> {
        let iteration = state.iteration_count + 1;

        if iteration > self.max_revisions {
            warn!(
                max_revisions = self.max_revisions,
                "director: revision ceiling reached, forcing approval"
            );
            return Ok(self.approve(state, iteration, "ceiling override"));
        }

        info!(iteration, "director: reviewing draft");
        let decision = self.oracle.evaluate(state, iteration).await?;

        match decision.decision {
            Verdict::Approve => Ok(self.approve(state, iteration, &decision.summary)),
            Verdict::Revise => {
                let target = primary_revision_target(&decision.feedbacks);
                if target == RevisionTarget::Approved {
                    // Revise verdict with no usable targets collapses to approval
                    return Ok(self.approve(state, iteration, "revise with no targets"));
                }
                info!(iteration, ?target, notes = decision.feedbacks.len(), "director: revision requested");
                for note in &decision.feedbacks {
                    info!("  [{} / {}] {}", note.target.display_name(), note.scene_label(), note.issue);
                }
                Ok(StageUpdate {
                    revision_target: Some(target),
                    approved: Some(false),
                    iteration_count: Some(iteration),
                    review_notes: Some(decision.feedbacks),
                    ..Default::default()
                })
            }
        }
    }
}

/// Render the three tracks into the human-readable production script,
/// joining storyboard and sound entries to screenplay scenes by scene
/// number. Missing counterparts are simply skipped, so a segment with
/// mismatched tracks still renders.
pub fn render_final_script(state: &WorkflowState) -> String {
    let mut lines: Vec<String> = Vec::new();
    let rule = "=".repeat(60);
    let scene_rule = "-".repeat(40);

    lines.push(rule.clone());
    lines.push("PRODUCTION SCRIPT — FINAL CUT".to_string());
    lines.push(format!("Genre: {}", state.novel_genre));
    lines.push(rule.clone());

    let storyboard_by_number: HashMap<u32, _> = state
        .storyboard_scenes
        .iter()
        .map(|s| (s.scene_number, s))
        .collect();
    let sound_by_number: HashMap<u32, _> = state
        .sound_scenes
        .iter()
        .map(|s| (s.scene_number, s))
        .collect();

    for scene in &state.screenplay_scenes {
        lines.push(format!("\n{scene_rule}"));
        lines.push(format!("[Scene {}]  {}", scene.scene_number, scene.setting));
        lines.push(scene_rule.clone());

        if !scene.action.is_empty() {
            lines.push(format!("\nAction: {}", scene.action));
        }

        if !scene.dialogue.is_empty() {
            lines.push("\nDialogue:".to_string());
            for line in &scene.dialogue {
                match line.kind {
                    DialogueKind::Vo => lines.push(format!("   [VO] {}", line.line)),
                    DialogueKind::Os => lines.push(format!("   [OS] {}", line.line)),
                    DialogueKind::Dialogue => {
                        lines.push(format!("   {}: \"{}\"", line.character, line.line))
                    }
                }
            }
        }

        if let Some(shot) = storyboard_by_number.get(&scene.scene_number) {
            lines.push(format!("\nStoryboard: {}", shot.shot_type));
            lines.push(format!("   Camera: {}", shot.camera_movement));
            lines.push(format!("   Image prompt:\n   {}", shot.image_prompt));
            if !shot.visual_notes.is_empty() {
                lines.push(format!("   Visual notes: {}", shot.visual_notes));
            }
        }

        if let Some(sound) = sound_by_number.get(&scene.scene_number) {
            lines.push("\nSound:".to_string());
            lines.push(format!("   Ambience: {}", sound.ambience));
            lines.push(format!("   Foley: {}", sound.foley));
            lines.push(format!("   BGM: {}", sound.bgm_mood));
        }

        if !scene.visual_hint.is_empty() {
            lines.push(format!("\nVisual memo: {}", scene.visual_hint));
        }
    }

    lines.push(format!("\n{rule}"));
    lines.push(format!(
        "End of script — {} scenes",
        state.screenplay_scenes.len()
    ));
    lines.push(rule);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewNote, ReviewTarget, ScreenplayScene, SoundScene, StoryboardScene, GLOBAL_SCENE};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedOracle(ReviewDecision);

    #[async_trait]
    impl ReviewOracle for FixedOracle {
        async fn evaluate(&self, _: &WorkflowState, _: u32) -> Result<ReviewDecision> {
            Ok(self.0.clone())
        }
    }

    struct CountingOracle(AtomicU32);

    #[async_trait]
    impl ReviewOracle for CountingOracle {
        async fn evaluate(&self, _: &WorkflowState, _: u32) -> Result<ReviewDecision> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ReviewDecision::default())
        }
    }

    fn reject_decision(target: ReviewTarget) -> ReviewDecision {
        ReviewDecision {
            decision: Verdict::Revise,
            feedbacks: vec![ReviewNote {
                target,
                scene_number: GLOBAL_SCENE,
                issue: "weak".to_string(),
                instruction: "fix".to_string(),
            }],
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_approval_clears_notes_and_renders_script() {
        let director = Director::new(Arc::new(FixedOracle(ReviewDecision::default())), 3);
        let mut state = WorkflowState::new("source", "wuxia");
        state.screenplay_scenes = vec![ScreenplayScene {
            scene_number: 1,
            setting: "gate".to_string(),
            ..Default::default()
        }];

        let update = director.run(&state).await.unwrap();
        assert_eq!(update.revision_target, Some(RevisionTarget::Approved));
        assert_eq!(update.approved, Some(true));
        assert_eq!(update.iteration_count, Some(1));
        assert_eq!(update.review_notes, Some(vec![]));
        assert!(update.final_script.expect("script").contains("[Scene 1]"));
    }

    #[tokio::test]
    async fn test_rejection_stores_notes_and_target() {
        let director = Director::new(
            Arc::new(FixedOracle(reject_decision(ReviewTarget::Storyboard))),
            3,
        );
        let state = WorkflowState::new("source", "wuxia");

        let update = director.run(&state).await.unwrap();
        assert_eq!(update.revision_target, Some(RevisionTarget::Storyboard));
        assert_eq!(update.approved, Some(false));
        assert_eq!(update.review_notes.map(|n| n.len()), Some(1));
        assert!(update.final_script.is_none());
    }

    #[tokio::test]
    async fn test_ceiling_overrun_skips_oracle_entirely() {
        let oracle = Arc::new(CountingOracle(AtomicU32::new(0)));
        let director = Director::new(oracle.clone(), 3);
        let mut state = WorkflowState::new("source", "wuxia");
        state.iteration_count = 3;

        let update = director.run(&state).await.unwrap();
        assert_eq!(oracle.0.load(Ordering::SeqCst), 0, "forced path never consults the oracle");
        assert_eq!(update.approved, Some(true));
        assert_eq!(update.iteration_count, Some(4));
        assert!(update.final_script.is_some(), "artifact synthesized even on forced approval");
    }

    #[tokio::test]
    async fn test_ceiling_zero_forces_approval_on_first_visit() {
        let oracle = Arc::new(CountingOracle(AtomicU32::new(0)));
        let director = Director::new(oracle.clone(), 0);
        let state = WorkflowState::new("source", "wuxia");

        let update = director.run(&state).await.unwrap();
        assert_eq!(oracle.0.load(Ordering::SeqCst), 0);
        assert_eq!(update.iteration_count, Some(1));
        assert_eq!(update.approved, Some(true));
    }

    #[test]
    fn test_render_joins_tracks_by_scene_number() {
        let mut state = WorkflowState::new("source", "wuxia");
        state.screenplay_scenes = vec![
            ScreenplayScene {
                scene_number: 1,
                setting: "gate".to_string(),
                ..Default::default()
            },
            ScreenplayScene {
                scene_number: 2,
                setting: "hall".to_string(),
                ..Default::default()
            },
        ];
        // Storyboard only covers scene 2; sound only covers scene 1
        state.storyboard_scenes = vec![StoryboardScene {
            scene_number: 2,
            shot_type: "wide shot".to_string(),
            ..Default::default()
        }];
        state.sound_scenes = vec![SoundScene {
            scene_number: 1,
            ambience: "wind".to_string(),
            ..Default::default()
        }];

        let script = render_final_script(&state);
        assert!(script.contains("[Scene 1]  gate"));
        assert!(script.contains("[Scene 2]  hall"));
        assert!(script.contains("wide shot"));
        assert!(script.contains("Ambience: wind"));
        assert!(script.contains("End of script — 2 scenes"));
    }
}
