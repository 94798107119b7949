use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DedupeError, Result};
use crate::models::DEFAULT_TITLE_AUTHOR_SEPARATOR;

/// Root application configuration, loaded from `~/.config/bingo-dedupe/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub matching: MatchingConfig,
    pub authors: AuthorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub dupes_file: String,
    pub ignores_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum oracle score (0–100) for a candidate to be offered.
    pub match_score: u8,
    /// Re-open already-resolved keys for another look.
    pub rescan_keys: bool,
    pub title_author_separator: String,
    /// Tokens never offered as match candidates.
    pub banned_matches: Vec<String>,
    /// Processed items between checkpoint saves; 0 disables checkpoints.
    pub autosave_interval: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorsConfig {
    /// Substrings rewritten to `", "` when normalizing multi-author keys.
    pub multi_author_joiners: Vec<String>,
    /// Run the second pass over individual names split out of multi-author keys.
    pub single_author_pass: bool,
}

// ─── Defaults ──────────────────────────────────────────────

/// Common surnames and short tokens that fuzzy-match far too many authors.
pub const DEFAULT_BANNED_MATCHES: &[&str] = &[
    "âge", "Anderson", "BO", "Brown", "Butler", "Catlin", "CED", "Clarke", "Das", "DC",
    "Elliot", "Gabriel", "H A", "H.A.", "Hearn", "Hearne", "Henry", "Hubert", "Jae", "Jill",
    "Jordan", "Kindred", "Lee", "Martin", "McKenzie", "Neal", "Noc", "ONE", "P", "Palt",
    "Philip", "Pike", "Rith", "Rowe", "SIU", "Soph", "SUI", "Tan", "Taylor", "Tuí", "Umi",
    "Vaughan", "Watt", "Williams",
];

pub const DEFAULT_MULTI_AUTHOR_JOINERS: &[&str] = &[
    ";", " , ", ", & ", " & ", " & & ", ", and ", " and ", ", with ", " with ",
];

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("bingo-dedupe");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
            dupes_file: "resolved_duplicates.json".to_string(),
            ignores_file: "ignored_duplicates.json".to_string(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            match_score: 90,
            rescan_keys: false,
            title_author_separator: DEFAULT_TITLE_AUTHOR_SEPARATOR.to_string(),
            banned_matches: DEFAULT_BANNED_MATCHES.iter().map(|s| s.to_string()).collect(),
            autosave_interval: 25,
        }
    }
}

impl Default for AuthorsConfig {
    fn default() -> Self {
        Self {
            multi_author_joiners: DEFAULT_MULTI_AUTHOR_JOINERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            single_author_pass: true,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bingo-dedupe/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BINGO_DEDUPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bingo-dedupe")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.matching.match_score > 100 {
            return Err(DedupeError::Configuration(format!(
                "match_score must be between 0 and 100, got {}",
                self.matching.match_score
            )));
        }
        if self.matching.title_author_separator.is_empty() {
            return Err(DedupeError::Configuration(
                "title_author_separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_data_dir(&mut self, path: PathBuf) {
        self.storage.data_dir = path.to_string_lossy().to_string();
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// Path to the resolved duplicates record.
    pub fn dupes_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.dupes_file)
    }

    /// Path to the ignored duplicates record.
    pub fn ignores_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.ignores_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.matching.match_score, 90);
        assert_eq!(cfg.matching.title_author_separator, " /// ");
        assert!(cfg.matching.banned_matches.iter().any(|b| b == "Lee"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.matching.match_score = 80;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.match_score, 80);
        assert_eq!(loaded.storage.dupes_file, cfg.storage.dupes_file);
        assert_eq!(
            loaded.authors.multi_author_joiners,
            cfg.authors.multi_author_joiners
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nmatch_score = 85\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.match_score, 85);
        assert_eq!(loaded.matching.autosave_interval, 25);
        assert_eq!(loaded.storage.ignores_file, "ignored_duplicates.json");
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nmatch_score = 120\n").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(DedupeError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg =
            AppConfig::load_from(Path::new("/tmp/nonexistent_bingo_dedupe_config.toml")).unwrap();
        assert_eq!(cfg.matching.match_score, 90);
    }

    #[test]
    fn test_derived_paths() {
        let mut cfg = AppConfig::default();
        cfg.set_data_dir(PathBuf::from("/srv/bingo"));
        assert_eq!(
            cfg.dupes_path(),
            PathBuf::from("/srv/bingo/resolved_duplicates.json")
        );
        assert_eq!(
            cfg.ignores_path(),
            PathBuf::from("/srv/bingo/ignored_duplicates.json")
        );
    }
}
