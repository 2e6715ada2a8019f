pub mod openai;
pub mod traits;
pub mod util;

pub use openai::{OpenAi, OpenAiPromptBuilder};
pub use traits::PromptBuilder;
