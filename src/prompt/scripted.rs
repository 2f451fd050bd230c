use super::{PromptError, Prompter};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    selections: Mutex<VecDeque<Option<usize>>>,
    multi_selections: Mutex<VecDeque<Option<Vec<usize>>>>,
    texts: Mutex<VecDeque<Option<String>>>,
    folders: Mutex<VecDeque<Option<PathBuf>>>,
    transcript: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_selection(&self, reply: Option<usize>) {
        lock(&self.selections).push_back(reply);
    }

    pub fn queue_multi_selection(&self, reply: Option<Vec<usize>>) {
        lock(&self.multi_selections).push_back(reply);
    }

    pub fn queue_text(&self, reply: Option<&str>) {
        lock(&self.texts).push_back(reply.map(str::to_string));
    }

    pub fn queue_folder(&self, reply: Option<PathBuf>) {
        lock(&self.folders).push_back(reply);
    }

    pub fn transcript(&self) -> Vec<String> {
        lock(&self.transcript).clone()
    }

    fn record(&self, kind: &str, prompt: &str) {
        lock(&self.transcript).push(format!("{kind}: {prompt}"));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Prompter for ScriptedPrompter {
    fn select_one(&self, prompt: &str, _options: &[String]) -> Result<Option<usize>, PromptError> {
        self.record("select_one", prompt);
        Ok(lock(&self.selections).pop_front().flatten())
    }

    fn select_many(
        &self,
        prompt: &str,
        _options: &[String],
    ) -> Result<Option<Vec<usize>>, PromptError> {
        self.record("select_many", prompt);
        Ok(lock(&self.multi_selections).pop_front().flatten())
    }

    fn input_text(&self, prompt: &str) -> Result<Option<String>, PromptError> {
        self.record("input_text", prompt);
        Ok(lock(&self.texts).pop_front().flatten())
    }

    fn select_folder(&self, prompt: &str) -> Result<Option<PathBuf>, PromptError> {
        self.record("select_folder", prompt);
        Ok(lock(&self.folders).pop_front().flatten())
    }
}
