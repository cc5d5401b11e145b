use serde::{Deserialize, Serialize};

/// Profile for a single character, extracted once per run and injected into
/// downstream prompts so every storyboard frame renders the same person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Character name as it appears in the source text
    #[serde(default)]
    pub name: String,
    /// Romanized name for image-generation prompts
    #[serde(default)]
    pub name_romanized: String,
    /// Narrative role: protagonist / antagonist / supporting
    #[serde(default)]
    pub role: String,
    /// Physical appearance, prose form
    #[serde(default)]
    pub appearance: String,
    /// Personality traits
    #[serde(default)]
    pub personality: String,
    /// Signature visual element (e.g. a glowing blue sword)
    #[serde(default)]
    pub visual_signature: String,
    /// English keywords injected verbatim into image prompts
    #[serde(default)]
    pub image_keywords: String,
}

/// Cast roster plus world-level visual direction, produced by the
/// character-extraction stage and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterSheet {
    #[serde(default)]
    pub main_characters: Vec<CharacterProfile>,
    /// Overall visual style of the setting
    #[serde(default)]
    pub world_visual_style: String,
    /// Dominant color palette, English keywords for image prompts
    #[serde(default)]
    pub color_palette: String,
}

impl CharacterSheet {
    /// Comma-joined character names for summaries
    pub fn cast_names(&self) -> Vec<String> {
        self.main_characters.iter().map(|c| c.name.clone()).collect()
    }
}
