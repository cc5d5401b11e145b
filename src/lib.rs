pub mod chunker;
pub mod engine;
pub mod io;
pub mod llm;
pub mod merge;
pub mod models;
pub mod stages;

pub use chunker::{analyze_input, split_into_segments, SplitStats};
pub use engine::{EngineConfig, PipelineResult, WorkflowEngine};
pub use io::{load_source_text, save_results, ConsoleDecisionSource};
pub use llm::{ContentGenerator, GeneratorError, LlmConfig, OpenAiClient, ParseError};
pub use merge::{apply_scene_offset, merge_states};
pub use models::{
    CharacterSheet, ReviewNote, RevisionTarget, Segment, SegmentConfig, StageUpdate, WorkflowState,
    SUPPORTED_GENRES,
};
pub use stages::{render_final_script, LlmReviewOracle, ReviewOracle, StageName, StageNode};
