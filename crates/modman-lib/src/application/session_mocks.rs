//! Mock session providers for command handler tests

use crate::api::modrinth::CatalogClient;
use crate::application::config::AppConfig;
use crate::application::session::{CommandSession, InteractiveProvider};
use crate::display::MockDisplayProvider;
use anyhow::Result;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted answers for prompts; records every prompt it sees
#[derive(Clone, Default)]
pub struct MockInteractiveProvider {
    confirm_answer: Option<bool>,
    selections: Arc<Mutex<VecDeque<Option<usize>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockInteractiveProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every confirmation with `answer` instead of the default
    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirm_answer = Some(answer);
        self
    }

    /// Queue the answer to the next fuzzy selection; `None` cancels it
    pub fn with_selection(self, selection: Option<usize>) -> Self {
        if let Ok(mut queue) = self.selections.lock() {
            queue.push_back(selection);
        }
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }
}

impl InteractiveProvider for MockInteractiveProvider {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.record(prompt);
        Ok(self.confirm_answer.unwrap_or(default))
    }

    fn fuzzy_select(&self, prompt: &str, options: &[String]) -> Result<Option<usize>> {
        self.record(prompt);
        if options.is_empty() {
            return Ok(None);
        }
        let queued = self
            .selections
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        Ok(queued.unwrap_or(Some(0)).filter(|&index| index < options.len()))
    }
}

pub type MockCommandSession = CommandSession<MockDisplayProvider, MockInteractiveProvider>;

/// Config pointing at `workdir` with no log file and quick network settings
pub fn test_config(workdir: &Path) -> AppConfig {
    AppConfig {
        workdir: Some(workdir.to_path_buf()),
        no_log_file: true,
        net_timeout: 5,
        retries: 1,
        yes: true,
        ..AppConfig::default()
    }
}

/// Session over `catalog` rooted at `workdir`; keep clones of the providers to inspect them
pub fn mock_session(
    workdir: &Path,
    catalog: Arc<dyn CatalogClient>,
    display: MockDisplayProvider,
    interactive: MockInteractiveProvider,
) -> Result<MockCommandSession> {
    CommandSession::new_with_providers(display, interactive, test_config(workdir), catalog)
}
