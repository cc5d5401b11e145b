use crate::models::{HumanTarget, ReviewNote, ReviewTarget, RevisionTarget, WorkflowState};
use crate::stages::StageName;

/// Where the engine goes after a stage completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Stage(StageName),
    Terminal,
}

/// Pure routing table for the workflow graph.
///
/// The fixed chain is extractor -> screenwriter -> storyboard -> sound
/// designer; conditional edges sit after the sound designer, the human
/// checkpoint, and the director. Cycles exist only through the draft
/// stages and are bounded by the director's iteration ceiling.
pub fn next_stage(current: StageName, state: &WorkflowState, human_review_enabled: bool) -> Route {
    match current {
        StageName::CharacterExtractor => Route::Stage(StageName::Screenwriter),
        StageName::Screenwriter => Route::Stage(StageName::Storyboard),
        StageName::Storyboard => Route::Stage(StageName::SoundDesigner),
        StageName::SoundDesigner => {
            if human_review_enabled && !state.human_review_consumed {
                Route::Stage(StageName::HumanReview)
            } else {
                Route::Stage(StageName::Director)
            }
        }
        StageName::HumanReview => match state.human_target {
            HumanTarget::Director => Route::Stage(StageName::Director),
            HumanTarget::Screenwriter => Route::Stage(StageName::Screenwriter),
            HumanTarget::Storyboard => Route::Stage(StageName::Storyboard),
            HumanTarget::SoundDesigner => Route::Stage(StageName::SoundDesigner),
        },
        StageName::Director => match state.revision_target {
            RevisionTarget::Approved => Route::Terminal,
            RevisionTarget::Screenwriter => Route::Stage(StageName::Screenwriter),
            RevisionTarget::Storyboard => Route::Stage(StageName::Storyboard),
            RevisionTarget::SoundDesigner => Route::Stage(StageName::SoundDesigner),
        },
    }
}

/// Pick the primary revision target when one review pass names several
/// stages. Priority: screenwriter > storyboard > sound designer; revising
/// an upstream stage re-runs everything downstream of it anyway.
pub fn primary_revision_target(notes: &[ReviewNote]) -> RevisionTarget {
    let has = |target: ReviewTarget| notes.iter().any(|n| n.target == target);

    if has(ReviewTarget::Screenwriter) {
        RevisionTarget::Screenwriter
    } else if has(ReviewTarget::Storyboard) {
        RevisionTarget::Storyboard
    } else if has(ReviewTarget::SoundDesigner) {
        RevisionTarget::SoundDesigner
    } else {
        RevisionTarget::Approved
    }
}
