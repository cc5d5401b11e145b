use serde::{Deserialize, Serialize};

/// How a line of dialogue is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueKind {
    /// Narrator voiceover
    Vo,
    /// Inner monologue (off-screen)
    Os,
    /// Spoken on screen
    Dialogue,
}

impl Default for DialogueKind {
    fn default() -> Self {
        Self::Dialogue
    }
}

/// One dialogue line in a screenplay scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueLine {
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub line: String,
    #[serde(rename = "type", default)]
    pub kind: DialogueKind,
}

/// Screenplay output for one scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenplayScene {
    pub scene_number: u32,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    /// Hint for the storyboard stage when the scene is narration-only
    #[serde(default)]
    pub visual_hint: String,
}

/// Storyboard output for one scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryboardScene {
    pub scene_number: u32,
    #[serde(default)]
    pub shot_type: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub camera_movement: String,
    #[serde(default)]
    pub visual_notes: String,
}

/// Sound design output for one scene: three layers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundScene {
    pub scene_number: u32,
    #[serde(default)]
    pub ambience: String,
    #[serde(default)]
    pub foley: String,
    #[serde(default)]
    pub bgm_mood: String,
}
