use super::{Command, CommandError};
use crate::core::state::{absolutize, WorkingDir};
#[derive(Clone)]
pub struct CdCommand {
    dir: WorkingDir,
}

impl CdCommand {
    pub fn new(dir: WorkingDir) -> Self {
        Self { dir }
    }

    pub fn change(&self, target: &str) -> Result<String, CommandError> {
        let mut current = self.dir.lock()?;
        // an absolute target replaces the base entirely
        let prospective = current.join(target);

        if !prospective.is_dir() {
            return Err(CommandError::DirectoryNotFound(target.to_string()));
        }

        let resolved = absolutize(&prospective);
        tracing::info!(from = %current.display(), to = %resolved.display(), "changed directory");
        *current = resolved;
        Ok(format!("Changed directory to: {}", current.display()))
    }
}

impl Command for CdCommand {
    async fn execute(&self, args: &str) -> Result<String, CommandError> {
        self.change(args)
    }
}
