//! Remembered source folder
//!
//! The CLI stores the last source root in a one-line text file so a later
//! run without arguments picks up where the previous one left off.

use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Default location of the remembered-folder file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.txt";

/// Persisted last source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastFolder {
    config_path: PathBuf,
}

impl LastFolder {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Remembered folder, if the file exists and still names a directory
    pub fn load(&self) -> Option<PathBuf> {
        let content = std::fs::read_to_string(&self.config_path).ok()?;
        let folder = PathBuf::from(content.trim());
        if folder.as_os_str().is_empty() || !folder.is_dir() {
            log::debug!(
                "Ignoring remembered folder {:?} from {:?}",
                folder,
                self.config_path
            );
            return None;
        }
        Some(folder)
    }

    pub fn store(&self, folder: &Path) -> Result<()> {
        std::fs::write(&self.config_path, folder.to_string_lossy().as_bytes())
            .with_context(|| format!("Failed to write config file: {:?}", self.config_path))
    }
}

impl Default for LastFolder {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}
