use crate::core::config::ConfigError;

#[derive(Debug)]
pub enum AppError {
    Readline(rustyline::error::ReadlineError),
    Io(std::io::Error),
    Bind(String, std::io::Error),
    ConfigError(ConfigError),
    FlagError(String),
    CtrlC(String),
}

impl From<rustyline::error::ReadlineError> for AppError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        AppError::Readline(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<ctrlc::Error> for AppError {
    fn from(err: ctrlc::Error) -> Self {
        AppError::CtrlC(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::ConfigError(err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Readline(e) => write!(f, "Readline error: {}", e),
            AppError::Io(e) => write!(f, "IO error: {}", e),
            AppError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
            AppError::ConfigError(e) => write!(f, "Config error: {}", e),
            AppError::FlagError(msg) => write!(f, "Flag error: {}", msg),
            AppError::CtrlC(msg) => write!(f, "Ctrl-C error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
