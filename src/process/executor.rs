use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use super::{signal, ProcessError};

pub const DEFAULT_SHELL: &str = "/bin/sh";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

// the command string goes to the shell untouched
#[derive(Clone, Debug)]
pub struct ProcessExecutor {
    shell: PathBuf,
    timeout: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, DEFAULT_TIMEOUT)
    }
}

impl ProcessExecutor {
    pub fn new(shell: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }
    pub async fn execute(&self, line: &str, cwd: &Path) -> Result<String, ProcessError> {
        let output = self.spawn_process(line, cwd).await?;
        if !output.status.success() {
            return Err(ProcessError::ExitFailure {
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    pub async fn spawn_process(&self, line: &str, cwd: &Path) -> Result<ProcessOutput, ProcessError> {
        let mut command = std::process::Command::new(&self.shell);
        command
            .arg("-c")
            .arg(line)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // own group, so a timeout can take out the whole pipeline
            .process_group(0);

        let mut command = tokio::process::Command::from(command);
        command.kill_on_drop(true);

        let child = command.spawn().map_err(ProcessError::Spawn)?;
        let pid = child.id();
        tracing::debug!(command = line, cwd = %cwd.display(), pid, "spawned");

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(ProcessError::Capture)?,
            Err(_) => {
                if let Some(pid) = pid {
                    if let Err(e) = signal::kill_group(pid) {
                        tracing::warn!(pid, error = %e, "failed to kill timed out process group");
                    }
                }
                tracing::warn!(command = line, timeout = ?self.timeout, "command timed out");
                return Err(ProcessError::TimedOut(self.timeout));
            }
        };

        Ok(ProcessOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
