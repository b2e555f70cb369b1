use crate::error::AppError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = BTreeMap::new();

        let table = [
            ("help", "-h", "--help", false, "Print this help message"),
            ("version", "-v", "--version", false, "Show version information"),
            ("config", "-c", "--config", true, "Specify custom config file path"),
            ("quiet", "-q", "--quiet", false, "Only log warnings and errors"),
            ("debug", "-d", "--debug", false, "Enable debug output"),
            ("repl", "-r", "--repl", false, "Run an interactive console instead of serving"),
            ("host", "-H", "--host", true, "Address to bind (default 127.0.0.1)"),
            ("port", "-p", "--port", true, "Port to listen on (default 5000)"),
            ("timeout", "-t", "--timeout", true, "Command timeout in seconds (default 10)"),
            ("workdir", "-w", "--workdir", true, "Starting working directory"),
        ];

        for (name, short, long, takes_value, description) in table {
            flags.insert(
                name.to_string(),
                Flag {
                    short: short.to_string(),
                    long: long.to_string(),
                    description: description.to_string(),
                    takes_value,
                    value: None,
                },
            );
        }

        Flags { flags }
    }
    pub fn parse(&mut self, args: &[String]) -> Result<(), AppError> {
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let (name, inline) = match arg.split_once('=') {
                Some((name, value)) if name.starts_with("--") => (name, Some(value)),
                _ => (arg.as_str(), None),
            };

            let flag = self
                .flags
                .values_mut()
                .find(|flag| name == flag.short || name == flag.long)
                .ok_or_else(|| AppError::FlagError(format!("Unknown argument {}", arg)))?;

            flag.value = match (flag.takes_value, inline) {
                (true, Some(value)) => Some(value.to_string()),
                (true, None) => Some(
                    args.next()
                        .cloned()
                        .ok_or_else(|| AppError::FlagError(format!("{} requires a value", name)))?,
                ),
                (false, None) => Some(String::new()),
                (false, Some(_)) => {
                    return Err(AppError::FlagError(format!("{} takes no value", name)))
                }
            };
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(|f| f.value.is_some())
    }
    pub fn get_value(&self, name: &str) -> Option<&String> {
        match self.flags.get(name) {
            Some(flag) if flag.takes_value => flag.value.as_ref(),
            _ => None,
        }
    }

    pub fn print_help(&self) {
        println!("Usage: termgate [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            let long = if flag.takes_value {
                format!("{} <value>", flag.long)
            } else {
                flag.long.clone()
            };
            println!("  {}, {:<20} {}", flag.short, long, flag.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_switches() {
        let mut flags = Flags::new();
        flags.parse(&args(&["-d", "--repl"])).unwrap();
        assert!(flags.is_set("debug"));
        assert!(flags.is_set("repl"));
        assert!(!flags.is_set("quiet"));
        assert_eq!(flags.get_value("debug"), None);
    }

    #[test]
    fn test_values() {
        let mut flags = Flags::new();
        flags
            .parse(&args(&["--port", "8080", "-H", "0.0.0.0", "-t", "3"]))
            .unwrap();
        assert_eq!(flags.get_value("port").map(String::as_str), Some("8080"));
        assert_eq!(flags.get_value("host").map(String::as_str), Some("0.0.0.0"));
        assert_eq!(flags.get_value("timeout").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_inline_values() {
        let mut flags = Flags::new();
        flags
            .parse(&args(&["--workdir=/tmp", "--host=::1"]))
            .unwrap();
        assert_eq!(flags.get_value("workdir").map(String::as_str), Some("/tmp"));
        assert_eq!(flags.get_value("host").map(String::as_str), Some("::1"));

        let mut flags = Flags::new();
        assert!(matches!(
            flags.parse(&args(&["--debug=yes"])),
            Err(AppError::FlagError(_))
        ));
    }

    #[test]
    fn test_missing_value() {
        let mut flags = Flags::new();
        assert!(matches!(
            flags.parse(&args(&["--port"])),
            Err(AppError::FlagError(_))
        ));
    }

    #[test]
    fn test_unknown_argument() {
        let mut flags = Flags::new();
        assert!(matches!(
            flags.parse(&args(&["--colour"])),
            Err(AppError::FlagError(_))
        ));
    }
}
