pub mod character_extractor;
pub mod director;
pub mod human_review;
pub mod screenwriter;
pub mod sound_designer;
pub mod storyboard;

pub use character_extractor::CharacterExtractor;
pub use director::{render_final_script, Director, LlmReviewOracle, ReviewOracle};
pub use human_review::{DraftPreview, HumanDecision, HumanDecisionSource, HumanReview};
pub use screenwriter::Screenwriter;
pub use sound_designer::SoundDesigner;
pub use storyboard::Storyboard;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{StageUpdate, WorkflowState};

/// Names of the workflow graph's nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    CharacterExtractor,
    Screenwriter,
    Storyboard,
    SoundDesigner,
    HumanReview,
    Director,
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::CharacterExtractor => "character_extractor",
            Self::Screenwriter => "screenwriter",
            Self::Storyboard => "storyboard",
            Self::SoundDesigner => "sound_designer",
            Self::HumanReview => "human_review",
            Self::Director => "director",
        };
        f.write_str(name)
    }
}

/// One unit of transformation over the shared state.
///
/// A stage returns a sparse [`StageUpdate`]; fields it does not write stay
/// unchanged. Stages fail closed: a response that cannot be parsed degrades
/// to placeholder output so the run always reaches a terminal state. Only
/// transport-level generator failures propagate as errors.
#[async_trait]
pub trait StageNode: Send + Sync {
    fn name(&self) -> StageName;

    async fn run(&self, state: &WorkflowState) -> Result<StageUpdate>;
}
