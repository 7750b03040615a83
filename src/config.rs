use crate::inline::DEFAULT_MAX_DEPTH;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub inline: Inline,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Inline {
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default)]
    pub allowed_dirs: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}
fn default_base_dir() -> String { ".".to_string() }
fn default_max_depth() -> usize { DEFAULT_MAX_DEPTH }

impl Default for Inline {
    fn default() -> Self {
        Self { base_dir: default_base_dir(), allowed_dirs: Vec::new(), max_depth: default_max_depth() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Logging {
    #[serde(default)]
    pub json: bool,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inline.max_depth == 0 { anyhow::bail!("max_depth must be > 0"); }
        if self.inline.base_dir.trim().is_empty() { anyhow::bail!("base_dir must not be empty"); }
        if let Some(i) = self.inline.allowed_dirs.iter().position(|d| d.trim().is_empty()) {
            anyhow::bail!("allowed_dirs[{i}] must not be empty");
        }
        Ok(())
    }
}
