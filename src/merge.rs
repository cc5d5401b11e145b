//! Merging completed per-segment states into one globally numbered result.
//!
//! Segments run independently and number their scenes from 1, so each
//! completed state is shifted by the count of screenplay scenes produced
//! before it. As long as the three tracks of a segment have the same
//! cardinality this yields gap-free, strictly increasing global numbers; a
//! mismatched segment is logged and merged anyway, since rendering joins
//! tracks by number and simply skips missing counterparts.

use tracing::warn;

use crate::models::{HumanTarget, RevisionTarget, WorkflowState};
use crate::stages::render_final_script;

/// Shift every scene number in all three tracks by `offset`
pub fn apply_scene_offset(state: &mut WorkflowState, offset: u32) {
    if offset == 0 {
        return;
    }
    for scene in &mut state.screenplay_scenes {
        scene.scene_number += offset;
    }
    for scene in &mut state.storyboard_scenes {
        scene.scene_number += offset;
    }
    for scene in &mut state.sound_scenes {
        scene.scene_number += offset;
    }
}

/// Fold completed segment states (already offset, in input order) into one
/// approved aggregate and re-render the final script from it.
///
/// The character sheet is taken from the first segment only: one
/// extraction pass is assumed to characterize the whole work.
pub fn merge_states(states: Vec<WorkflowState>, novel_genre: &str) -> WorkflowState {
    let mut merged = WorkflowState::new(String::new(), novel_genre);
    merged.revision_target = RevisionTarget::Approved;
    merged.human_target = HumanTarget::Director;
    merged.human_review_consumed = true;
    merged.approved = true;

    let mut novel_parts: Vec<String> = Vec::with_capacity(states.len());

    for (index, state) in states.into_iter().enumerate() {
        if !state.tracks_aligned() {
            warn!(
                segment = index + 1,
                screenplay = state.screenplay_scenes.len(),
                storyboard = state.storyboard_scenes.len(),
                sound = state.sound_scenes.len(),
                "segment tracks have mismatched scene counts, merging best-effort"
            );
        }

        if index == 0 {
            merged.character_sheet = state.character_sheet;
        }
        merged.iteration_count = merged.iteration_count.max(state.iteration_count);
        novel_parts.push(state.novel_text);
        merged.screenplay_scenes.extend(state.screenplay_scenes);
        merged.storyboard_scenes.extend(state.storyboard_scenes);
        merged.sound_scenes.extend(state.sound_scenes);
    }

    merged.novel_text = novel_parts.join("\n\n");
    merged.final_script = Some(render_final_script(&merged));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CharacterSheet, ScreenplayScene, SoundScene, StoryboardScene};

    fn state_with_scenes(count: u32) -> WorkflowState {
        let mut state = WorkflowState::new("part", "wuxia");
        for n in 1..=count {
            state.screenplay_scenes.push(ScreenplayScene {
                scene_number: n,
                ..Default::default()
            });
            state.storyboard_scenes.push(StoryboardScene {
                scene_number: n,
                ..Default::default()
            });
            state.sound_scenes.push(SoundScene {
                scene_number: n,
                ..Default::default()
            });
        }
        state
    }

    fn screenplay_numbers(state: &WorkflowState) -> Vec<u32> {
        state.screenplay_scenes.iter().map(|s| s.scene_number).collect()
    }

    #[test]
    fn test_offset_shifts_all_three_tracks() {
        let mut state = state_with_scenes(2);
        apply_scene_offset(&mut state, 4);
        assert_eq!(screenplay_numbers(&state), vec![5, 6]);
        assert_eq!(state.storyboard_scenes[0].scene_number, 5);
        assert_eq!(state.sound_scenes[1].scene_number, 6);
    }

    #[test]
    fn test_merged_numbering_is_gap_free() {
        // Segments with 4 and 3 scenes merge to 1..=4 then 5..=7
        let first = state_with_scenes(4);
        let mut second = state_with_scenes(3);
        apply_scene_offset(&mut second, 4);

        let merged = merge_states(vec![first, second], "wuxia");
        assert_eq!(screenplay_numbers(&merged), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(merged.approved);
        assert!(merged
            .final_script
            .as_ref()
            .expect("script rendered")
            .contains("[Scene 7]"));
    }

    #[test]
    fn test_character_sheet_taken_from_first_segment_only() {
        let mut first = state_with_scenes(1);
        first.character_sheet = Some(CharacterSheet {
            world_visual_style: "from first".to_string(),
            ..Default::default()
        });
        let mut second = state_with_scenes(1);
        second.character_sheet = Some(CharacterSheet {
            world_visual_style: "from second".to_string(),
            ..Default::default()
        });
        apply_scene_offset(&mut second, 1);

        let merged = merge_states(vec![first, second], "wuxia");
        assert_eq!(
            merged.character_sheet.expect("sheet").world_visual_style,
            "from first"
        );
    }

    #[test]
    fn test_iteration_count_is_max_across_segments() {
        let mut first = state_with_scenes(1);
        first.iteration_count = 2;
        let mut second = state_with_scenes(1);
        second.iteration_count = 4;

        let merged = merge_states(vec![first, second], "wuxia");
        assert_eq!(merged.iteration_count, 4);
    }

    #[test]
    fn test_mismatched_tracks_merge_without_panicking() {
        let mut lopsided = state_with_scenes(2);
        lopsided.sound_scenes.pop();

        let merged = merge_states(vec![lopsided], "wuxia");
        assert_eq!(merged.screenplay_scenes.len(), 2);
        assert_eq!(merged.sound_scenes.len(), 1);
        // Scene 2 renders without a sound counterpart
        assert!(merged.final_script.expect("script").contains("[Scene 2]"));
    }
}
