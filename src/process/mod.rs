use std::fmt;
use std::time::Duration;

pub mod executor;
pub mod signal;

pub use executor::{ProcessExecutor, ProcessOutput};

#[derive(Debug)]
pub enum ProcessError {
    Spawn(std::io::Error),
    Capture(std::io::Error),
    TimedOut(Duration),
    ExitFailure { code: Option<i32>, stderr: String },
    SignalError(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn(e) => write!(f, "{}", e),
            ProcessError::Capture(e) => write!(f, "{}", e),
            ProcessError::TimedOut(after) => {
                write!(f, "Command timed out after {}s", after.as_secs_f64())
            }
            ProcessError::ExitFailure { stderr, .. } => write!(f, "{}", stderr),
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}
