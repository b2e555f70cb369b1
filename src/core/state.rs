use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::commands::CommandError;
#[derive(Clone, Debug)]
pub struct WorkingDir {
    current: Arc<Mutex<PathBuf>>,
}

impl WorkingDir {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            current: Arc::new(Mutex::new(absolutize(&start.into()))),
        }
    }

    pub fn get(&self) -> Result<PathBuf, CommandError> {
        Ok(self.lock()?.clone())
    }

    pub fn set(&self, path: impl Into<PathBuf>) -> Result<(), CommandError> {
        *self.lock()? = absolutize(&path.into());
        Ok(())
    }
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, PathBuf>, CommandError> {
        self.current
            .lock()
            .map_err(|e| CommandError::DirectoryChange(e.to_string()))
    }
}

// lexical only, symlinks are left alone
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // popping past the root stays at the root
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
