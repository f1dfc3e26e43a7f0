use std::path::PathBuf;

use tracing::debug;

use super::config::Configuration;
use crate::error::GuardResult;
use crate::helpers::{read_optional, write_private};

/// Key/value backend the settings page reads from and writes to
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> GuardResult<Configuration>;
    fn save(&self, config: &Configuration) -> GuardResult<()>;
}

/// Settings kept as a JSON document on disk
#[derive(Clone, Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> GuardResult<Configuration> {
        match read_optional(&self.path)? {
            None => {
                debug!(path = ?self.path, "no settings file, using defaults");
                Ok(Configuration::default())
            }
            Some(content) if content.trim().is_empty() => Ok(Configuration::default()),
            Some(content) => Ok(serde_json::from_str(&content)?),
        }
    }

    fn save(&self, config: &Configuration) -> GuardResult<()> {
        let mut json = serde_json::to_string_pretty(config)?;
        json.push('\n');
        // holds the plain password
        write_private(&self.path, &json)?;
        Ok(())
    }
}
