//! Prompt builders. Pure functions: same input, same text.

mod descriptions;
mod recommendations;

pub use descriptions::{build_description_prompt, DESCRIPTION_SYSTEM_PROMPT};
pub use recommendations::{
    build_recommendation_prompt, difficulty_directive, RECOMMENDATION_SYSTEM_PROMPT,
};
