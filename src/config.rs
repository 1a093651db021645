// Configuration for the demo binary and embedding hosts
//
// YAML-backed, load-or-default-and-warn: a missing file is not an error, a
// malformed one is.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::placement::PlacementOptions;

/// Settings for a bridge demo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Directory for rotating log files
    pub log_dir: String,

    /// Debug-level logging
    pub debug_mode: bool,

    /// Mirror logs to the console (noisy next to a live progress bar)
    pub console_log: bool,

    /// Initial surface title
    pub title: String,

    /// Number of workload steps to simulate
    pub steps: i32,

    /// Delay per simulated step, in milliseconds
    pub step_delay_ms: u64,

    /// Defeat the fill animation on the final step
    pub suppress_final_animation: bool,

    /// Surface placement relative to an owner window (ignored by the
    /// terminal surface)
    pub placement: PlacementOptions,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            debug_mode: false,
            console_log: false,
            title: "Working...".to_string(),
            steps: 100,
            step_delay_ms: 40,
            suppress_final_animation: true,
            placement: PlacementOptions::default(),
        }
    }
}

/// Loads and saves the bridge configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    const CONFIG_FILE: &'static str = "progress-bridge.yaml";

    /// Create a manager rooted at the given directory, creating it if
    /// needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(Self::CONFIG_FILE),
            config_dir,
        })
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist.
    pub fn load(&self) -> Result<BridgeConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(BridgeConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: BridgeConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the configuration.
    pub fn save(&self, config: &BridgeConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.steps, 100);
        assert!(!config.debug_mode);
        assert!(config.suppress_final_animation);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: BridgeConfig = serde_yaml_ng::from_str("title: Cleaning\nsteps: 20\n").unwrap();
        assert_eq!(config.title, "Cleaning");
        assert_eq!(config.steps, 20);
        // Unspecified fields come from Default
        assert_eq!(config.step_delay_ms, 40);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = BridgeConfig {
            title: "Scanning".to_string(),
            steps: 7,
            ..BridgeConfig::default()
        };
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: BridgeConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
