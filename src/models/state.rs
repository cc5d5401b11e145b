use serde::{Deserialize, Serialize};

use crate::models::{
    CharacterSheet, HumanTarget, ReviewNote, RevisionTarget, ScreenplayScene, SoundScene,
    StoryboardScene,
};

/// Shared state for one segment's run through the workflow graph.
///
/// Created fresh per segment, mutated in place by each stage's
/// [`StageUpdate`], discarded after the merge folds it into the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Source text for this segment (immutable after creation)
    pub novel_text: String,
    /// Genre tag steering prompt style (immutable after creation)
    pub novel_genre: String,

    /// Cast roster, produced once by the extraction stage
    pub character_sheet: Option<CharacterSheet>,

    /// The three creative tracks, keyed by scene number
    pub screenplay_scenes: Vec<ScreenplayScene>,
    pub storyboard_scenes: Vec<StoryboardScene>,
    pub sound_scenes: Vec<SoundScene>,

    /// Outstanding review notes; cleared whenever a checkpoint approves
    pub review_notes: Vec<ReviewNote>,
    /// Where the director last routed the run
    pub revision_target: RevisionTarget,
    /// Review passes consumed so far
    pub iteration_count: u32,

    /// Once true, the human checkpoint is bypassed for the rest of the run.
    /// Monotonic: never resets to false within a run.
    pub human_review_consumed: bool,
    /// Routing decision recorded by the human checkpoint
    pub human_target: HumanTarget,

    pub approved: bool,
    pub final_script: Option<String>,
}

impl WorkflowState {
    pub fn new(novel_text: impl Into<String>, novel_genre: impl Into<String>) -> Self {
        Self {
            novel_text: novel_text.into(),
            novel_genre: novel_genre.into(),
            character_sheet: None,
            screenplay_scenes: Vec::new(),
            storyboard_scenes: Vec::new(),
            sound_scenes: Vec::new(),
            review_notes: Vec::new(),
            revision_target: RevisionTarget::Approved,
            iteration_count: 0,
            human_review_consumed: false,
            human_target: HumanTarget::Director,
            approved: false,
            final_script: None,
        }
    }

    /// Whether the three tracks carry the same number of scenes
    pub fn tracks_aligned(&self) -> bool {
        self.screenplay_scenes.len() == self.storyboard_scenes.len()
            && self.screenplay_scenes.len() == self.sound_scenes.len()
    }
}

/// Sparse update returned by a stage: only the fields a stage writes are
/// set, everything else stays untouched when applied.
#[derive(Debug, Clone, Default)]
pub struct StageUpdate {
    pub character_sheet: Option<CharacterSheet>,
    pub screenplay_scenes: Option<Vec<ScreenplayScene>>,
    pub storyboard_scenes: Option<Vec<StoryboardScene>>,
    pub sound_scenes: Option<Vec<SoundScene>>,
    pub review_notes: Option<Vec<ReviewNote>>,
    pub revision_target: Option<RevisionTarget>,
    pub iteration_count: Option<u32>,
    pub human_review_consumed: Option<bool>,
    pub human_target: Option<HumanTarget>,
    pub approved: Option<bool>,
    pub final_script: Option<String>,
}

impl StageUpdate {
    /// Merge this update into the state. `human_review_consumed` is
    /// monotonic: a `Some(false)` after the flag is already set keeps it set.
    pub fn apply(self, state: &mut WorkflowState) {
        if let Some(sheet) = self.character_sheet {
            state.character_sheet = Some(sheet);
        }
        if let Some(scenes) = self.screenplay_scenes {
            state.screenplay_scenes = scenes;
        }
        if let Some(scenes) = self.storyboard_scenes {
            state.storyboard_scenes = scenes;
        }
        if let Some(scenes) = self.sound_scenes {
            state.sound_scenes = scenes;
        }
        if let Some(notes) = self.review_notes {
            state.review_notes = notes;
        }
        if let Some(target) = self.revision_target {
            state.revision_target = target;
        }
        if let Some(count) = self.iteration_count {
            state.iteration_count = count;
        }
        if let Some(consumed) = self.human_review_consumed {
            state.human_review_consumed = state.human_review_consumed || consumed;
        }
        if let Some(target) = self.human_target {
            state.human_target = target;
        }
        if let Some(approved) = self.approved {
            state.approved = approved;
        }
        if let Some(script) = self.final_script {
            state.final_script = Some(script);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_leaves_state_unchanged() {
        let mut state = WorkflowState::new("text", "wuxia");
        state.iteration_count = 2;
        state.approved = true;
        StageUpdate::default().apply(&mut state);
        assert_eq!(state.iteration_count, 2);
        assert!(state.approved);
        assert_eq!(state.novel_text, "text");
    }

    #[test]
    fn test_partial_update_touches_only_named_fields() {
        let mut state = WorkflowState::new("text", "wuxia");
        state.screenplay_scenes = vec![ScreenplayScene::default()];
        let update = StageUpdate {
            iteration_count: Some(1),
            approved: Some(true),
            ..Default::default()
        };
        update.apply(&mut state);
        assert_eq!(state.iteration_count, 1);
        assert!(state.approved);
        assert_eq!(state.screenplay_scenes.len(), 1);
    }

    #[test]
    fn test_human_review_consumed_is_monotonic() {
        let mut state = WorkflowState::new("text", "wuxia");
        let set = StageUpdate {
            human_review_consumed: Some(true),
            ..Default::default()
        };
        set.apply(&mut state);
        assert!(state.human_review_consumed);

        let unset = StageUpdate {
            human_review_consumed: Some(false),
            ..Default::default()
        };
        unset.apply(&mut state);
        assert!(state.human_review_consumed, "flag must never reset");
    }
}
