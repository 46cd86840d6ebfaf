pub mod story_cleaner;

pub use story_cleaner::StoryCleaner;
