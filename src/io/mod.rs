pub mod console;
pub mod input;
pub mod output;

pub use console::ConsoleDecisionSource;
pub use input::load_source_text;
pub use output::{save_results, SavedPaths};
