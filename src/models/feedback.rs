use serde::{Deserialize, Serialize};

/// Creative stage a review note is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTarget {
    Screenwriter,
    Storyboard,
    SoundDesigner,
}

impl ReviewTarget {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Screenwriter => "screenwriter",
            Self::Storyboard => "storyboard",
            Self::SoundDesigner => "sound designer",
        }
    }
}

/// Scene number used by notes that apply to the whole draft
pub const GLOBAL_SCENE: i32 = -1;

/// One review note from the director or the human checkpoint.
/// Immutable once created; the targeted stage reads it on its next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewNote {
    #[serde(rename = "target_agent")]
    pub target: ReviewTarget,
    /// -1 means the note applies globally, not to one scene
    #[serde(default = "default_global_scene")]
    pub scene_number: i32,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub instruction: String,
}

fn default_global_scene() -> i32 {
    GLOBAL_SCENE
}

impl ReviewNote {
    pub fn scene_label(&self) -> String {
        if self.scene_number == GLOBAL_SCENE {
            "global".to_string()
        } else {
            format!("scene {}", self.scene_number)
        }
    }
}

/// The director's verdict on one review pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "APPROVE")]
    Approve,
    #[serde(rename = "REVISE")]
    Revise,
}

impl Default for Verdict {
    fn default() -> Self {
        Self::Approve
    }
}

/// Parsed director decision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewDecision {
    #[serde(default)]
    pub decision: Verdict,
    #[serde(default)]
    pub feedbacks: Vec<ReviewNote>,
    #[serde(default)]
    pub summary: String,
}

/// Main revision routing value written by the director
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionTarget {
    Screenwriter,
    Storyboard,
    SoundDesigner,
    Approved,
}

impl From<ReviewTarget> for RevisionTarget {
    fn from(target: ReviewTarget) -> Self {
        match target {
            ReviewTarget::Screenwriter => Self::Screenwriter,
            ReviewTarget::Storyboard => Self::Storyboard,
            ReviewTarget::SoundDesigner => Self::SoundDesigner,
        }
    }
}

/// Routing value written by the human checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanTarget {
    Director,
    Screenwriter,
    Storyboard,
    SoundDesigner,
}

impl Default for HumanTarget {
    fn default() -> Self {
        Self::Director
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_note_deserializes_wire_format() {
        let json = r#"{
            "target_agent": "sound_designer",
            "scene_number": 3,
            "issue": "too many layers",
            "instruction": "cut the ambience during dialogue"
        }"#;
        let note: ReviewNote = serde_json::from_str(json).unwrap();
        assert_eq!(note.target, ReviewTarget::SoundDesigner);
        assert_eq!(note.scene_number, 3);
        assert_eq!(note.scene_label(), "scene 3");
    }

    #[test]
    fn test_decision_defaults_to_approve() {
        let decision: ReviewDecision = serde_json::from_str("{}").unwrap();
        assert_eq!(decision.decision, Verdict::Approve);
        assert!(decision.feedbacks.is_empty());
    }

    #[test]
    fn test_global_scene_label() {
        let note = ReviewNote {
            target: ReviewTarget::Screenwriter,
            scene_number: GLOBAL_SCENE,
            issue: String::new(),
            instruction: String::new(),
        };
        assert_eq!(note.scene_label(), "global");
    }
}
