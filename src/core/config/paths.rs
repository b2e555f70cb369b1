use super::ConfigError;
use std::path::PathBuf;

pub const RC_FILE: &str = ".termgaterc";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    // from --config, so a missing file is an error
    pub required: bool,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

        Ok(ConfigPaths {
            rc_path: home.join(RC_FILE),
            required: false,
        })
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        ConfigPaths {
            rc_path: path.into(),
            required: true,
        }
    }
}
