use std::{env, fmt, path::PathBuf, time::Duration};

mod loader;
mod paths;

use loader::ConfigLoader;
pub use paths::ConfigPaths;

use crate::flags::Flags;
use crate::process::executor::{DEFAULT_SHELL, DEFAULT_TIMEOUT};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CPU_INTERVAL: Duration = Duration::from_secs(1);
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub cpu_interval: Duration,
    pub shell: PathBuf,
    pub workdir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            cpu_interval: DEFAULT_CPU_INTERVAL,
            shell: PathBuf::from(DEFAULT_SHELL),
            workdir: env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "host" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.host = value.to_string();
            }
            "port" => self.port = parse_number(key, value)?,
            "timeout" => {
                let secs: u64 = parse_number(key, value)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.timeout = Duration::from_secs(secs);
            }
            "cpu_interval" => self.cpu_interval = Duration::from_millis(parse_number(key, value)?),
            "shell" => self.shell = PathBuf::from(value),
            "workdir" => {
                let dir = PathBuf::from(value);
                if !dir.is_dir() {
                    return Err(ConfigError::InvalidValue(key.to_string(), value.to_string()));
                }
                self.workdir = dir;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn apply_flags(&mut self, flags: &Flags) -> Result<(), ConfigError> {
        for key in ["host", "port", "timeout", "workdir"] {
            if let Some(value) = flags.get_value(key) {
                self.set(key, value)?;
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))
}

pub struct Config {
    paths: ConfigPaths,
    settings: Settings,
    exports: Vec<(String, String)>,
}

impl Config {
    pub fn with_paths(paths: ConfigPaths) -> Self {
        Config {
            paths,
            settings: Settings::default(),
            exports: Vec::new(),
        }
    }
    pub fn from_flags(flags: &Flags) -> Result<Self, ConfigError> {
        let paths = match flags.get_value("config") {
            Some(path) => ConfigPaths::explicit(path),
            None => ConfigPaths::new()?,
        };
        let mut config = Self::with_paths(paths);
        config.load()?;
        config.settings.apply_flags(flags)?;
        Ok(config)
    }

    pub fn load(&mut self) -> Result<(), ConfigError> {
        let paths = self.paths.clone();
        let loader = ConfigLoader::new(&paths);
        loader.load_configs(self)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }
    pub fn exports(&self) -> &[(String, String)] {
        &self.exports
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ConfigFileNotFound(String),
    UnknownKey(String),
    InvalidValue(String, String),
    Syntax(usize, String),
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::UnknownKey(key) => write!(f, "Unknown setting: {}", key),
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::Syntax(line, text) => write!(f, "Syntax error on line {}: {}", line, text),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "127.0.0.1:5000");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.cpu_interval, Duration::from_secs(1));
        assert_eq!(settings.shell, PathBuf::from("/bin/sh"));
    }

    #[test]
    fn test_set_values() {
        let mut settings = Settings::default();
        settings.set("host", "0.0.0.0").unwrap();
        settings.set("port", "8080").unwrap();
        settings.set("timeout", "3").unwrap();
        settings.set("cpu_interval", "250").unwrap();
        settings.set("workdir", "/").unwrap();

        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.cpu_interval, Duration::from_millis(250));
        assert_eq!(settings.workdir, PathBuf::from("/"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("port", "http"),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            settings.set("port", "70000"),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            settings.set("timeout", "0"),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            settings.set("workdir", "/definitely/not/here"),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            settings.set("colour", "red"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_flags_override_rc_file() {
        let temp = tempfile::tempdir().unwrap();
        let rc = temp.path().join("rc");
        std::fs::write(&rc, "set port=7000\nset timeout=4\n").unwrap();

        let mut flags = Flags::new();
        flags
            .parse(&[
                "--config".to_string(),
                rc.to_string_lossy().to_string(),
                "--port".to_string(),
                "9000".to_string(),
            ])
            .unwrap();

        let config = Config::from_flags(&flags).unwrap();
        assert_eq!(config.settings().port, 9000);
        assert_eq!(config.settings().timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let mut flags = Flags::new();
        flags
            .parse(&["-c".to_string(), "/definitely/not/here.rc".to_string()])
            .unwrap();
        assert!(matches!(
            Config::from_flags(&flags),
            Err(ConfigError::ConfigFileNotFound(_))
        ));
    }
}
