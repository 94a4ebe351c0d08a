use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gm_engine::RulesConfig;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "gm.yaml";
const DEFAULT_DATA_FILE: &str = "data.json";
const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CliConfig {
    pub data_path: PathBuf,
    pub session: String,
    pub rules: RulesConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            session: DEFAULT_SESSION.to_string(),
            rules: RulesConfig::default(),
        }
    }
}

impl CliConfig {
    /// Read an explicit config file, or `gm.yaml` in the working directory if
    /// one exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg: CliConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config YAML: {}", path.display()))?;
        debug!(path = %path.display(), ?cfg, "config loaded");
        Ok(cfg)
    }

    /// Command-line flags win over file values.
    pub fn with_overrides(mut self, data: Option<PathBuf>, session: Option<String>) -> Self {
        if let Some(data) = data {
            self.data_path = data;
        }
        if let Some(session) = session {
            self.session = session;
        }
        self
    }
}
