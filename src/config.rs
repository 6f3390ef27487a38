/// Persisted engine configuration (`~/.symex/conf.toml`), following the
/// same serde+toml load/save shape used elsewhere in this codebase for
/// on-disk package manifests.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueueStrategy {
    Random,
    Bfs,
    Dfs,
}

impl Default for QueueStrategy {
    fn default() -> Self {
        QueueStrategy::Random
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub queue: QueueStrategy,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_solver_binary")]
    pub solver_binary: String,
}

fn default_max_depth() -> usize {
    512
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_seed() -> u64 {
    1
}

fn default_solver_binary() -> String {
    "z3".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: default_max_depth(),
            timeout_secs: default_timeout_secs(),
            queue: QueueStrategy::default(),
            seed: default_seed(),
            solver_binary: default_solver_binary(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::from_file(path).unwrap_or_default()
    }
}

/// `~/.symex/conf.toml`, mirroring the package manager's own per-user
/// config directory layout.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".symex").join("conf.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = EngineConfig::default();
        let toml = cfg.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed.max_depth, cfg.max_depth);
        assert_eq!(parsed.queue, cfg.queue);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed = EngineConfig::from_toml("max_depth = 64").unwrap();
        assert_eq!(parsed.max_depth, 64);
        assert_eq!(parsed.timeout_secs, default_timeout_secs());
    }
}
