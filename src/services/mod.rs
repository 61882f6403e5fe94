pub mod grade_extractor;
pub mod prompt_builder;
pub mod text;

pub use grade_extractor::{extract, try_extract};
pub use prompt_builder::build_prompt;
pub use text::sanitize_text;
