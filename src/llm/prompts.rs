use crate::models::{CharacterSheet, ReviewNote, ReviewTarget};

// Per-stage sampling temperatures. Creative stages run warm, analytical
// stages run cold.
pub const TEMP_CHARACTER_EXTRACTOR: f64 = 0.3;
pub const TEMP_SCREENWRITER: f64 = 0.7;
pub const TEMP_STORYBOARD: f64 = 0.6;
pub const TEMP_SOUND_DESIGNER: f64 = 0.5;
pub const TEMP_DIRECTOR: f64 = 0.2;

pub const CHARACTER_EXTRACTOR_TEMPLATE: &str = r#"You are a story analyst preparing a {novel_genre} web novel for adaptation into a motion-comic production.

Read the source text and extract a character sheet covering every named character that appears, plus the overall visual direction of the world.

Rules:
1. Include every named character; infer appearance from context where the text is silent.
2. `image_keywords` must be English keywords usable verbatim in an image-generation prompt.
3. `role` is one of: protagonist, antagonist, supporting.
4. Output ONLY a JSON object with this shape:
{"main_characters": [{"name": "...", "name_romanized": "...", "role": "...", "appearance": "...", "personality": "...", "visual_signature": "...", "image_keywords": "..."}], "world_visual_style": "...", "color_palette": "..."}

Source text:
{novel_text}"#;

pub const SCREENWRITER_TEMPLATE: &str = r#"You are a screenwriter adapting a {novel_genre} web novel into a motion-comic screenplay.

Rules:
1. Adjust dialogue register to the genre. Never flatten the emotional arc.
2. Interior monologue must become VO or OS lines, never be dropped.
3. Exposition-only passages become narration plus a `visual_hint` for the storyboard.
4. Number scenes from 1 in source order.
5. Output ONLY a JSON array of scenes with this shape:
[{"scene_number": 1, "setting": "...", "action": "...", "dialogue": [{"character": "...", "line": "...", "type": "VO|OS|DIALOGUE"}], "visual_hint": "..."}]

Revision notes from review (these override the rules above where they conflict):
{review_notes}

Source text:
{novel_text}"#;

pub const STORYBOARD_TEMPLATE: &str = r#"You are a storyboard artist turning a motion-comic screenplay ({novel_genre}) into image-generation instructions.

Rules:
1. Every `image_prompt` covers subject, environment, lighting, and camera.
2. Use standard shot vocabulary (wide shot, close-up, over-the-shoulder, ...).
3. Append the genre style tags and aspect ratio to every prompt.
4. Narration-only scenes become establishing shots based on the scene's `visual_hint`.
5. Keep character visuals consistent with the character sheet below; the listed image keywords are mandatory.
6. Output ONLY a JSON array, one entry per screenplay scene, same scene numbers:
[{"scene_number": 1, "shot_type": "...", "image_prompt": "...", "camera_movement": "...", "visual_notes": "..."}]

Revision notes from review (these override the rules above where they conflict):
{review_notes}

{character_sheet}

Screenplay scenes:
{screenplay_scenes}"#;

pub const SOUND_DESIGNER_TEMPLATE: &str = r#"You are a sound designer scoring a {novel_genre} motion comic.

For every scene design three layers: ambience, foley, and a BGM mood arc.

Rules:
1. All three layers are required for every scene.
2. Never stack more than three simultaneous sound elements.
3. Thin out ambience under dialogue-heavy scenes.
4. Describe the BGM as an emotional arc, not a track name.
5. Output ONLY a JSON array, one entry per screenplay scene, same scene numbers:
[{"scene_number": 1, "ambience": "...", "foley": "...", "bgm_mood": "..."}]

Revision notes from review (these override the rules above where they conflict):
{review_notes}

Screenplay scenes:
{screenplay_scenes}

Storyboard scenes:
{storyboard_scenes}"#;

pub const DIRECTOR_TEMPLATE: &str = r#"You are the director reviewing a motion-comic adaptation draft (review round {iteration}).

Judge the three tracks against the source text on four axes:
1. Fidelity (screenwriter): the plot must not drift from the source.
2. Emotional tension (screenwriter + sound): the arc must rise and fall.
3. Visual richness (storyboard): frames must be full and varied.
4. Sonic clarity (sound designer): the mix must not turn to mud.

Decide APPROVE or REVISE. When revising, name the stage each problem belongs to.
Output ONLY a JSON object:
{"decision": "APPROVE|REVISE", "feedbacks": [{"target_agent": "screenwriter|storyboard|sound_designer", "scene_number": 1, "issue": "...", "instruction": "..."}], "summary": "..."}
Use scene_number -1 for notes that apply to the whole draft.

Source text:
{novel_text}

Screenplay scenes:
{screenplay_scenes}

Storyboard scenes:
{storyboard_scenes}

Sound scenes:
{sound_scenes}"#;

/// Replace `{key}` placeholders with their values. Plain substitution, so
/// the literal braces in the JSON shape examples above survive untouched.
pub fn render_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in substitutions {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Format the notes addressed to one stage for prompt injection
pub fn format_review_notes(notes: &[ReviewNote], target: ReviewTarget) -> String {
    if notes.is_empty() {
        return "None (first draft)".to_string();
    }

    let relevant: Vec<&ReviewNote> = notes.iter().filter(|n| n.target == target).collect();
    if relevant.is_empty() {
        return format!("No notes for the {}", target.display_name());
    }

    relevant
        .iter()
        .map(|n| format!("[{}] {}\n-> instruction: {}", n.scene_label(), n.issue, n.instruction))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the character sheet as a prompt section for the storyboard stage
pub fn format_character_sheet(sheet: &CharacterSheet) -> String {
    if sheet.main_characters.is_empty() {
        return "(no character sheet extracted)".to_string();
    }

    let mut lines = Vec::new();
    lines.push("## World visual direction".to_string());
    lines.push(format!("- Overall style: {}", sheet.world_visual_style));
    lines.push(format!(
        "- Color palette (must appear in every prompt): `{}`",
        sheet.color_palette
    ));
    lines.push(String::new());
    lines.push("## Character visual sheet (do not deviate)".to_string());

    for character in &sheet.main_characters {
        lines.push(format!("\n### {} ({})", character.name, character.role));
        lines.push(format!("- Appearance: {}", character.appearance));
        lines.push(format!("- Signature visual: {}", character.visual_signature));
        lines.push(format!(
            "- Mandatory image keywords: `{}`",
            character.image_keywords
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CharacterProfile, GLOBAL_SCENE};

    #[test]
    fn test_render_template_preserves_json_braces() {
        let rendered = render_template(
            r#"genre: {novel_genre}, shape: {"n": 1}"#,
            &[("novel_genre", "wuxia")],
        );
        assert_eq!(rendered, r#"genre: wuxia, shape: {"n": 1}"#);
    }

    #[test]
    fn test_format_notes_empty_means_first_draft() {
        assert_eq!(
            format_review_notes(&[], ReviewTarget::Screenwriter),
            "None (first draft)"
        );
    }

    #[test]
    fn test_format_notes_filters_by_target() {
        let notes = vec![
            ReviewNote {
                target: ReviewTarget::Storyboard,
                scene_number: 2,
                issue: "frame is empty".to_string(),
                instruction: "add a foreground subject".to_string(),
            },
            ReviewNote {
                target: ReviewTarget::SoundDesigner,
                scene_number: GLOBAL_SCENE,
                issue: "too loud".to_string(),
                instruction: "duck the bgm".to_string(),
            },
        ];

        let formatted = format_review_notes(&notes, ReviewTarget::Storyboard);
        assert!(formatted.contains("frame is empty"));
        assert!(!formatted.contains("too loud"));

        let none = format_review_notes(&notes, ReviewTarget::Screenwriter);
        assert!(none.contains("No notes"));
    }

    #[test]
    fn test_character_sheet_lists_mandatory_keywords() {
        let sheet = CharacterSheet {
            main_characters: vec![CharacterProfile {
                name: "Su Lin".to_string(),
                role: "protagonist".to_string(),
                image_keywords: "silver hair, blue glowing sword".to_string(),
                ..Default::default()
            }],
            world_visual_style: "misty mountain peaks".to_string(),
            color_palette: "indigo and silver".to_string(),
        };
        let formatted = format_character_sheet(&sheet);
        assert!(formatted.contains("Su Lin"));
        assert!(formatted.contains("blue glowing sword"));
        assert!(formatted.contains("indigo and silver"));
    }
}
