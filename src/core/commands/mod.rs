use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

mod cd;
pub mod metrics;

pub use cd::CdCommand;
pub use metrics::{CpuCommand, MemoryCommand, MetricsSource, ProcFs};

use crate::core::state::WorkingDir;
use crate::process::ProcessError;
#[derive(Debug)]
pub enum CommandError {
    MissingCommand,
    DirectoryNotFound(String),
    DirectoryChange(String),
    Failed(String),
    TimedOut,
    Execution(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::MissingCommand => write!(f, "No command provided"),
            CommandError::DirectoryNotFound(dir) => write!(f, "Directory not found: {}", dir),
            CommandError::DirectoryChange(msg) => write!(f, "{}", msg),
            CommandError::Failed(stderr) => write!(f, "{}", stderr),
            CommandError::TimedOut => write!(f, "Command timed out."),
            CommandError::Execution(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::TimedOut(_) => CommandError::TimedOut,
            ProcessError::ExitFailure { stderr, .. } => CommandError::Failed(stderr),
            other => CommandError::Execution(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Execution(err.to_string())
    }
}

pub(crate) trait Command {
    async fn execute(&self, args: &str) -> Result<String, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cpu(CpuCommand),
    Memory(MemoryCommand),
}

impl Command for CommandType {
    async fn execute(&self, args: &str) -> Result<String, CommandError> {
        match self {
            CommandType::Cpu(cmd) => cmd.execute(args).await,
            CommandType::Memory(cmd) => cmd.execute(args).await,
        }
    }
}
#[derive(Clone)]
pub struct Builtins {
    commands: BTreeMap<&'static str, CommandType>,
    cd: CdCommand,
}

impl Builtins {
    pub fn new(dir: WorkingDir, source: Arc<dyn MetricsSource>, cpu_interval: Duration) -> Self {
        let mut commands = BTreeMap::new();
        commands.insert(
            "cpu",
            CommandType::Cpu(CpuCommand::new(source.clone(), cpu_interval)),
        );
        commands.insert("memory", CommandType::Memory(MemoryCommand::new(source)));

        Self {
            commands,
            cd: CdCommand::new(dir),
        }
    }

    // None: not a builtin, the shell gets it
    pub async fn dispatch(&self, command: &str) -> Option<Result<String, CommandError>> {
        if let Some(cmd) = self.commands.get(command) {
            return Some(cmd.execute("").await);
        }

        let trimmed = command.trim();
        if trimmed.starts_with("cd ") {
            let target = trimmed
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim_start())
                .unwrap_or_default();
            return Some(self.cd.execute(target).await);
        }

        None
    }
}
