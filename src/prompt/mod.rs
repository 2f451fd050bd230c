pub mod console;
pub mod scripted;

pub use console::ConsolePrompter;
pub use scripted::ScriptedPrompter;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("prompt terminal failure: {0}")]
    Terminal(String),
}

pub trait Prompter {
    fn select_one(&self, prompt: &str, options: &[String]) -> Result<Option<usize>, PromptError>;
    fn select_many(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<Option<Vec<usize>>, PromptError>;
    fn input_text(&self, prompt: &str) -> Result<Option<String>, PromptError>;
    fn select_folder(&self, prompt: &str) -> Result<Option<PathBuf>, PromptError>;
}

pub fn choice_label<'a>(options: &'a [String], index: usize) -> Result<&'a str, PromptError> {
    options
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| PromptError::Terminal(format!("selection index {index} out of range")))
}
