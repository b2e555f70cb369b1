use std::{env, fs, path::Path};

use super::{Config, ConfigError, ConfigPaths};

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load_configs(&self, config: &mut Config) -> Result<(), ConfigError> {
        let path = &self.paths.rc_path;
        if self.paths.required && !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }
        self.source_if_exists(path, config)
    }

    fn source_if_exists(&self, path: &Path, config: &mut Config) -> Result<(), ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            for (index, line) in content.lines().enumerate() {
                self.process_line(index + 1, line, config)?;
            }
            tracing::debug!(path = %path.display(), "loaded rc file");
        }
        Ok(())
    }

    fn process_line(&self, number: usize, line: &str, config: &mut Config) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        match line {
            s if s.starts_with("set ") => self.process_setting(number, &s["set ".len()..], config),
            s if s.starts_with("export ") => {
                self.process_env_var(number, &s["export ".len()..], config)
            }
            _ => Ok(()),
        }
    }

    fn process_setting(&self, number: usize, def: &str, config: &mut Config) -> Result<(), ConfigError> {
        let (key, value) = def
            .split_once('=')
            .ok_or_else(|| ConfigError::Syntax(number, def.to_string()))?;
        config.settings.set(key.trim(), unquote(value.trim()))
    }

    fn process_env_var(&self, number: usize, var_def: &str, config: &mut Config) -> Result<(), ConfigError> {
        let (name, value) = var_def
            .split_once('=')
            .ok_or_else(|| ConfigError::Syntax(number, var_def.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::Syntax(number, var_def.to_string()));
        }

        let value = expand_value(unquote(value.trim()));
        // spawned shells inherit this
        env::set_var(name, &value);
        config.exports.push((name.to_string(), value));
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

// $NAME and ${NAME}; unset names are left as written
fn expand_value(value: &str) -> String {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('$') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        match env::var(name) {
            Ok(found) if !name.is_empty() => expanded.push_str(&found),
            _ => expanded.push_str(&rest[start..start + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    expanded.push_str(rest);
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn create_temp_config_file(dir: &Path, content: &str) -> PathBuf {
        let file_path = dir.join("termgaterc");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn load(path: PathBuf) -> Result<Config, ConfigError> {
        let mut config = Config::with_paths(ConfigPaths::explicit(path));
        config.load()?;
        Ok(config)
    }

    #[test]
    fn test_source_settings_and_exports() {
        let temp = tempfile::tempdir().unwrap();
        let content = r#"
            # comments and blank lines are skipped

            set host = "0.0.0.0"
            set port=8081
            set cpu_interval='200'
            export TERMGATE_LOADER_TEST="test value"
            alias ll='ls -la'
        "#;
        let config = load(create_temp_config_file(temp.path(), content)).unwrap();

        assert_eq!(config.settings().host, "0.0.0.0");
        assert_eq!(config.settings().port, 8081);
        assert_eq!(config.settings().cpu_interval, Duration::from_millis(200));
        assert_eq!(env::var("TERMGATE_LOADER_TEST").unwrap(), "test value");
        assert_eq!(
            config.exports(),
            &[("TERMGATE_LOADER_TEST".to_string(), "test value".to_string())]
        );
    }

    #[test]
    fn test_export_expands_home() {
        let temp = tempfile::tempdir().unwrap();
        let home = env::var("HOME").unwrap_or_default();
        let config = load(create_temp_config_file(
            temp.path(),
            "export TERMGATE_EXPAND_TEST=$HOME/bin\n",
        ))
        .unwrap();

        assert_eq!(config.exports()[0].1, format!("{}/bin", home));
    }

    #[test]
    fn test_expand_value_forms() {
        env::set_var("TERMGATE_EXPAND_NAME", "x");
        assert_eq!(expand_value("$TERMGATE_EXPAND_NAME/y"), "x/y");
        assert_eq!(expand_value("${TERMGATE_EXPAND_NAME}y"), "xy");
        assert_eq!(expand_value("$TERMGATE_NOT_SET_ANYWHERE"), "$TERMGATE_NOT_SET_ANYWHERE");
        assert_eq!(expand_value("cost: $"), "cost: $");
        assert_eq!(expand_value("${open"), "${open");
    }

    #[test]
    fn test_syntax_errors_carry_line_number() {
        let temp = tempfile::tempdir().unwrap();
        let path = create_temp_config_file(temp.path(), "set port=1\nset timeout\n");
        assert!(matches!(load(path), Err(ConfigError::Syntax(2, _))));

        let path = create_temp_config_file(temp.path(), "export =value\n");
        assert!(matches!(load(path), Err(ConfigError::Syntax(1, _))));
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = create_temp_config_file(temp.path(), "set verbosity=3\n");
        assert!(matches!(load(path), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn test_optional_rc_may_be_missing() {
        let paths = ConfigPaths {
            rc_path: PathBuf::from("/definitely/not/here.rc"),
            required: false,
        };
        let mut config = Config::with_paths(paths);
        assert!(config.load().is_ok());
        assert_eq!(config.settings(), &crate::core::config::Settings::default());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("plain"), "plain");
    }
}
