//! Configuration file discovery and loading

use super::CodelistConfig;
use crate::error::CodelistError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Config file names in discovery priority order
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".codelistrc.json",
    ".codelistrc.toml",
    "codelist.yaml",
    "codelist.yml",
    "codelist.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    ///
    /// Each directory is checked for [`CONFIG_FILE_NAMES`] in order, moving up
    /// until a config is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| CodelistError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<CodelistConfig> {
        let config = CodelistConfig::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from path or auto-discover
    ///
    /// An explicit path must exist. Without one, discovery starts at
    /// `start_dir` (or the current directory) and falls back to the defaults
    /// when nothing is found.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<CodelistConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(CodelistError::config_error(format!(
                    "Config file not found: {}. Run 'codelist config init' to create one.",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found; using defaults");
                Ok(CodelistConfig::default())
            }
        }
    }
}
