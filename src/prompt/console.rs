use super::{PromptError, Prompter};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect, Select};
use std::path::PathBuf;

#[derive(Default)]
pub struct ConsolePrompter {
    theme: ColorfulTheme,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn terminal_error(err: dialoguer::Error) -> PromptError {
    PromptError::Terminal(err.to_string())
}

impl Prompter for ConsolePrompter {
    fn select_one(&self, prompt: &str, options: &[String]) -> Result<Option<usize>, PromptError> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(terminal_error)
    }

    fn select_many(
        &self,
        prompt: &str,
        options: &[String],
    ) -> Result<Option<Vec<usize>>, PromptError> {
        MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .interact_opt()
            .map_err(terminal_error)
    }

    fn input_text(&self, prompt: &str) -> Result<Option<String>, PromptError> {
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{prompt} (leave empty to cancel)"))
            .allow_empty(true)
            .interact_text()
            .map_err(terminal_error)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    fn select_folder(&self, prompt: &str) -> Result<Option<PathBuf>, PromptError> {
        Ok(self.input_text(prompt)?.map(PathBuf::from))
    }
}
