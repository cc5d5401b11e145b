pub mod character;
pub mod feedback;
pub mod scene;
pub mod segment;
pub mod state;

pub use character::*;
pub use feedback::*;
pub use scene::*;
pub use segment::*;
pub use state::*;

/// Genres the prompt templates carry style guidance for
pub const SUPPORTED_GENRES: &[&str] = &[
    "xianxia/fantasy",
    "urban/modern",
    "cyberpunk/sci-fi",
    "period-romance",
    "wuxia",
    "post-apocalyptic",
    "campus/youth",
    "historical",
];
