use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::models::{HumanTarget, ReviewNote, ReviewTarget, GLOBAL_SCENE};
use crate::stages::{DraftPreview, HumanDecision, HumanDecisionSource};

/// Console-backed decision source for the human checkpoint: prints a
/// draft preview to stdout and reads the decision from stdin.
pub struct ConsoleDecisionSource;

impl ConsoleDecisionSource {
    fn prompt_line(&self, label: &str) -> Result<String> {
        print!("{label}: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read decision from stdin")?;
        Ok(line.trim().to_string())
    }

    fn print_preview(&self, preview: &DraftPreview<'_>) {
        println!("\n{}", "=".repeat(50));
        println!("HUMAN REVIEW — first-pass draft ({} scenes)", preview.scene_count);
        println!("{}", "=".repeat(50));

        if !preview.cast_names.is_empty() {
            println!("Cast: {}", preview.cast_names.join(", "));
        }
        if let Some(scene) = preview.first_screenplay {
            println!("\n[screenplay, scene {}] {}", scene.scene_number, scene.setting);
            println!("  action: {}", truncate_chars(&scene.action, 80));
        }
        if let Some(scene) = preview.first_storyboard {
            println!("\n[storyboard, scene {}] shot: {}", scene.scene_number, scene.shot_type);
            println!("  prompt: {}", truncate_chars(&scene.image_prompt, 100));
        }
        if let Some(scene) = preview.first_sound {
            println!("\n[sound, scene {}] bgm: {}", scene.scene_number, truncate_chars(&scene.bgm_mood, 80));
        }
        println!("\n{}", "-".repeat(50));
    }
}

impl HumanDecisionSource for ConsoleDecisionSource {
    fn decide(&self, preview: &DraftPreview<'_>) -> Result<HumanDecision> {
        self.print_preview(preview);

        println!("Choose an action:");
        println!("  [0] Approve — hand the draft to the director");
        println!("  [1] Send a note to the screenwriter");
        println!("  [2] Send a note to the storyboard artist");
        println!("  [3] Send a note to the sound designer");
        let choice = self.prompt_line("Enter 0-3 (default 0)")?;

        let (human_target, review_target) = match choice.as_str() {
            "1" => (HumanTarget::Screenwriter, ReviewTarget::Screenwriter),
            "2" => (HumanTarget::Storyboard, ReviewTarget::Storyboard),
            "3" => (HumanTarget::SoundDesigner, ReviewTarget::SoundDesigner),
            _ => {
                return Ok(HumanDecision {
                    target: HumanTarget::Director,
                    note: None,
                })
            }
        };

        let issue = self.prompt_line("Describe the problem")?;
        let instruction = self.prompt_line("Give the revision instruction")?;
        let scene_number = self
            .prompt_line("Which scene? (-1 for the whole draft)")?
            .parse::<i32>()
            .unwrap_or(GLOBAL_SCENE);

        Ok(HumanDecision {
            target: human_target,
            note: Some(ReviewNote {
                target: review_target,
                scene_number,
                issue,
                instruction,
            }),
        })
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
