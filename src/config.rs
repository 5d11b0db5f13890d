//! Configuration management for molasses
//!
//! Stores settings in ~/.config/molasses/config.json. The tier list is
//! fully resolved and validated here before the first analysis pass runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::{InterestingSet, DEFAULT_INTERESTING_SYMBOLS};
use crate::error::FrictionError;
use crate::overlay::AnchorStrategy;
use crate::region::{FrictionMode, LimitTier, TierList};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Severity tiers, ascending by line threshold.
    pub tiers: Vec<LimitTier>,
    /// Whether letters and digits count as typing for cadence purposes.
    #[serde(default = "default_true")]
    pub interesting_alphanumeric: bool,
    /// Punctuation/whitespace that also counts as typing. Set to "" for the
    /// restrictive letters-and-digits-only behavior.
    #[serde(default = "default_symbols")]
    pub interesting_symbols: String,
    /// Overlay left-edge anchoring strategy.
    #[serde(default)]
    pub anchor: AnchorStrategy,
    /// Fixed seed for the corruption RNG; random when absent.
    #[serde(default)]
    pub corruption_seed: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_symbols() -> String {
    DEFAULT_INTERESTING_SYMBOLS.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tiers: vec![
                LimitTier {
                    line_threshold: 25,
                    color: [120, 120, 120],
                    mode: FrictionMode::Silent,
                },
                LimitTier {
                    line_threshold: 40,
                    color: [180, 180, 60],
                    mode: FrictionMode::ForcedMarker {
                        noise_distance: 8,
                        marker: '·',
                    },
                },
                LimitTier {
                    line_threshold: 60,
                    color: [200, 60, 60],
                    mode: FrictionMode::RandomCorruption {
                        alphabet: vec!['#', '%', 'q', 'z', 'x'],
                        count_per_keystroke: 2,
                    },
                },
            ],
            interesting_alphanumeric: true,
            interesting_symbols: default_symbols(),
            anchor: AnchorStrategy::default(),
            corruption_seed: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("molasses"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from the default location, creating it with the
    /// compiled-in defaults on first run.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_or_create(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`, or write the defaults there so the user has a file
    /// to edit next time.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        if let Err(err) = config.save_to(path) {
            eprintln!("  Warning: could not write default config: {}", err);
        }
        config
    }

    /// Load config from a specific path, or return defaults. A corrupt file
    /// is preserved next to the original so the user's tiers aren't lost.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => {
                    preserve_corrupt_config(path, &content);
                    eprintln!(
                        "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                        err
                    );
                }
            }
        }
        Self::default()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        write_config_atomic(path, &content).map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Validate the tier list and produce the ordered form the resolver
    /// needs. Runs before any analysis pass.
    pub fn resolved_tiers(&self) -> Result<TierList, FrictionError> {
        if self.tiers.is_empty() {
            return Err(FrictionError::InvalidInput("config defines no tiers"));
        }
        for tier in &self.tiers {
            if let FrictionMode::RandomCorruption {
                alphabet,
                count_per_keystroke,
            } = &tier.mode
            {
                if alphabet.is_empty() {
                    return Err(FrictionError::InvalidInput(
                        "random corruption tier has an empty alphabet",
                    ));
                }
                if *count_per_keystroke == 0 {
                    return Err(FrictionError::InvalidInput(
                        "random corruption tier inserts zero characters",
                    ));
                }
            }
        }
        Ok(TierList::new(self.tiers.clone()))
    }

    pub fn interesting_set(&self) -> InterestingSet {
        InterestingSet::new(
            self.interesting_alphanumeric,
            self.interesting_symbols.chars(),
        )
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/molasses/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

fn write_config_atomic(path: &Path, content: &str) -> Result<(), String> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(|e| e.to_string())?;

    file.write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_resolve() {
        let config = Config::default();
        let tiers = config.resolved_tiers().unwrap();
        assert!(tiers.resolve(24).is_none());
        assert_eq!(tiers.resolve(25).unwrap().line_threshold, 25);
        assert_eq!(tiers.resolve(999).unwrap().line_threshold, 60);
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.corruption_seed = Some(7);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.corruption_seed, Some(7));
        assert_eq!(loaded.tiers, config.tiers);
    }

    #[test]
    fn test_first_run_writes_the_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molasses").join("config.json");

        let created = Config::load_or_create(&path);
        assert!(path.exists());
        assert_eq!(created.tiers, Config::default().tiers);

        // Second run loads the file it wrote
        let loaded = Config::load_or_create(&path);
        assert_eq!(loaded.tiers, created.tiers);
    }

    #[test]
    fn test_config_location_names_the_config_file() {
        assert!(Config::config_location().ends_with("config.json"));
    }

    #[test]
    fn test_corrupt_file_is_preserved_and_defaults_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.tiers.len(), Config::default().tiers.len());
        assert!(dir.path().join("config.json.corrupt").exists());
    }

    #[test]
    fn test_empty_alphabet_is_rejected() {
        let mut config = Config::default();
        config.tiers = vec![LimitTier {
            line_threshold: 5,
            color: [0, 0, 0],
            mode: FrictionMode::RandomCorruption {
                alphabet: Vec::new(),
                count_per_keystroke: 1,
            },
        }];
        assert!(matches!(
            config.resolved_tiers(),
            Err(FrictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_no_tiers_is_rejected() {
        let config = Config {
            tiers: Vec::new(),
            ..Config::default()
        };
        assert!(config.resolved_tiers().is_err());
    }
}
