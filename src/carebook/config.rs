use crate::error::{CareError, Result};
use crate::query::page::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_CONFIRMATION_CODE: &str = "2012";

pub const KEYS: [&str; 2] = ["page-size", "confirmation-code"];

/// Configuration for carebook, stored in <data dir>/config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CarebookConfig {
    /// Records per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Shared code that must be entered to confirm a deletion
    #[serde(default = "default_confirmation_code")]
    pub confirmation_code: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_confirmation_code() -> String {
    DEFAULT_CONFIRMATION_CODE.to_string()
}

impl Default for CarebookConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            confirmation_code: default_confirmation_code(),
        }
    }
}

impl CarebookConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CareError::Io)?;
        let config: CarebookConfig =
            serde_json::from_str(&content).map_err(CareError::Serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values `set` would refuse, for hand-edited files.
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CareError::InvalidInput(
                "page-size must be at least 1".to_string(),
            ));
        }
        if self.confirmation_code.is_empty() {
            return Err(CareError::InvalidInput(
                "confirmation-code cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CareError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CareError::Serialization)?;
        fs::write(config_path, content).map_err(CareError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page-size" => Some(self.page_size.to_string()),
            "confirmation-code" => Some(self.confirmation_code.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "page-size" => {
                let size: usize = value.trim().parse().map_err(|_| {
                    CareError::InvalidInput(format!("page-size must be a number, got '{}'", value))
                })?;
                if size == 0 {
                    return Err(CareError::InvalidInput(
                        "page-size must be at least 1".to_string(),
                    ));
                }
                self.page_size = size;
            }
            "confirmation-code" => {
                if value.is_empty() {
                    return Err(CareError::InvalidInput(
                        "confirmation-code cannot be empty".to_string(),
                    ));
                }
                self.confirmation_code = value.to_string();
            }
            other => {
                return Err(CareError::InvalidInput(format!(
                    "Unknown config key: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}
