pub mod router;

pub use router::{next_stage, primary_revision_target, Route};

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::chunker::split_into_segments;
use crate::llm::ContentGenerator;
use crate::merge::{apply_scene_offset, merge_states};
use crate::models::{Segment, SegmentConfig, StageUpdate, WorkflowState};
use crate::stages::{
    CharacterExtractor, Director, HumanDecisionSource, HumanReview, ReviewOracle, Screenwriter,
    SoundDesigner, StageName, StageNode, Storyboard,
};

/// Workflow knobs, immutable for the duration of one run
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Review passes before the director force-approves
    pub max_revisions: u32,
    /// Whether the one-shot human checkpoint is active
    pub human_review: bool,
    /// Segment splitting parameters
    pub segment: SegmentConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_revisions: 3,
            human_review: false,
            segment: SegmentConfig::default(),
        }
    }
}

/// Output surface of a full run
#[derive(Debug)]
pub struct PipelineResult {
    /// Merged machine-readable state (approved, globally numbered)
    pub state: WorkflowState,
    /// Segments the input was split into
    pub segment_count: usize,
    /// Total screenplay scenes across all segments
    pub total_scenes: usize,
    /// Review passes consumed (max across segments)
    pub total_iterations: u32,
}

/// Drives one segment's state through the stage graph, and whole inputs
/// through split -> per-segment runs -> merge.
///
/// Single-threaded by design: segments run strictly in input order because
/// a segment's scene-number offset depends on completed earlier segments.
pub struct WorkflowEngine {
    character_extractor: CharacterExtractor,
    screenwriter: Screenwriter,
    storyboard: Storyboard,
    sound_designer: SoundDesigner,
    human_review: HumanReview,
    director: Director,
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        oracle: Arc<dyn ReviewOracle>,
        decision_source: Arc<dyn HumanDecisionSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            character_extractor: CharacterExtractor::new(generator.clone()),
            screenwriter: Screenwriter::new(generator.clone()),
            storyboard: Storyboard::new(generator.clone()),
            sound_designer: SoundDesigner::new(generator),
            human_review: HumanReview::new(decision_source, config.human_review),
            director: Director::new(oracle, config.max_revisions),
            config,
        }
    }

    /// Split the input, run every segment in order, and merge the results.
    pub async fn run(&self, novel_text: &str, novel_genre: &str) -> Result<PipelineResult> {
        let segments = split_into_segments(novel_text, &self.config.segment);
        info!(segments = segments.len(), "pipeline start");

        let mut completed: Vec<WorkflowState> = Vec::with_capacity(segments.len());
        let mut scene_offset: u32 = 0;

        for segment in &segments {
            if segments.len() > 1 {
                info!(
                    segment = segment.order + 1,
                    of = segments.len(),
                    chars = segment.char_count(),
                    first_scene = scene_offset + 1,
                    "processing segment"
                );
            }

            let mut state = self.run_segment(segment, novel_genre).await?;
            apply_scene_offset(&mut state, scene_offset);
            scene_offset += state.screenplay_scenes.len() as u32;
            completed.push(state);
        }

        let state = if completed.len() == 1 {
            completed.remove(0)
        } else {
            info!(segments = completed.len(), "merging segment results");
            merge_states(completed, novel_genre)
        };

        Ok(PipelineResult {
            segment_count: segments.len(),
            total_scenes: state.screenplay_scenes.len(),
            total_iterations: state.iteration_count,
            state,
        })
    }

    /// Run one segment's state machine from extraction to Terminal.
    pub async fn run_segment(&self, segment: &Segment, novel_genre: &str) -> Result<WorkflowState> {
        let mut state = WorkflowState::new(segment.prompt_text(), novel_genre);
        let mut current = StageName::CharacterExtractor;

        loop {
            debug!(stage = %current, "running stage");
            let update = self.run_stage(current, &state).await.with_context(|| {
                format!("segment {}: stage {} failed", segment.order + 1, current)
            })?;
            update.apply(&mut state);

            match next_stage(current, &state, self.config.human_review) {
                Route::Stage(next) => current = next,
                Route::Terminal => break,
            }
        }

        info!(
            segment = segment.order + 1,
            scenes = state.screenplay_scenes.len(),
            iterations = state.iteration_count,
            "segment complete"
        );
        Ok(state)
    }

    async fn run_stage(&self, name: StageName, state: &WorkflowState) -> Result<StageUpdate> {
        match name {
            StageName::CharacterExtractor => self.character_extractor.run(state).await,
            StageName::Screenwriter => self.screenwriter.run(state).await,
            StageName::Storyboard => self.storyboard.run(state).await,
            StageName::SoundDesigner => self.sound_designer.run(state).await,
            StageName::HumanReview => self.human_review.run(state).await,
            StageName::Director => self.director.run(state).await,
        }
    }
}
