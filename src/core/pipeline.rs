use std::sync::Arc;

use serde::Serialize;

use super::commands::{Builtins, CommandError, MetricsSource, ProcFs};
use super::config::Settings;
use super::state::WorkingDir;
use super::translate::Translator;
use crate::process::ProcessExecutor;
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Output(String),
    Error(String),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Outcome::Output(text) | Outcome::Error(text) => text,
        }
    }
}

impl From<Result<String, CommandError>> for Outcome {
    fn from(result: Result<String, CommandError>) -> Self {
        match result {
            Ok(output) => Outcome::Output(output),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}
pub struct Pipeline {
    translator: Translator,
    builtins: Builtins,
    executor: ProcessExecutor,
    dir: WorkingDir,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Self {
        Self::with_source(settings, Arc::new(ProcFs::new()))
    }

    pub fn with_source(settings: &Settings, source: Arc<dyn MetricsSource>) -> Self {
        let dir = WorkingDir::new(&settings.workdir);
        Self {
            translator: Translator::new(),
            builtins: Builtins::new(dir.clone(), source, settings.cpu_interval),
            executor: ProcessExecutor::new(&settings.shell, settings.timeout),
            dir,
        }
    }

    pub fn working_dir(&self) -> &WorkingDir {
        &self.dir
    }

    pub async fn run(&self, raw: &str) -> Result<String, CommandError> {
        if raw.is_empty() {
            return Err(CommandError::MissingCommand);
        }

        let command = self.translator.translate(raw);
        if let Some(result) = self.builtins.dispatch(&command).await {
            return result;
        }

        // the directory is fixed at spawn time; a later cd does not move a running command
        let cwd = self.dir.get()?;
        self.executor
            .execute(&command, &cwd)
            .await
            .map_err(CommandError::from)
    }

    pub async fn handle(&self, raw: &str) -> Outcome {
        let outcome = Outcome::from(self.run(raw).await);
        if outcome.is_error() {
            tracing::debug!(command = raw, error = outcome.text(), "command failed");
        }
        outcome
    }
}
