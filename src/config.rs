use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_FUZZY_THRESHOLD, DEFAULT_GROUP_HEADER_PREFIX, DEFAULT_HIERARCHY_ID,
    DEFAULT_ITEMS_JSON, DEFAULT_MAP_CSV, DEFAULT_MODIFIER_CLASS_CEILING, DEFAULT_MODIFIER_CLASS_FLOOR,
    DEFAULT_MODS_JSON,
};
use crate::error::{CatalogError, Result};
use crate::pipeline::output::OutputPaths;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Everything a catalog build depends on. Identical settings over identical
/// tables give byte-identical artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub out_items_json: PathBuf,
    pub out_mods_json: PathBuf,
    pub out_map_csv: PathBuf,
    pub hierarchy_id: i64,
    pub fuzzy_threshold: f64,
    pub modifier_class_floor: i64,
    pub modifier_class_ceiling: i64,
    pub group_header_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            out_items_json: PathBuf::from(DEFAULT_ITEMS_JSON),
            out_mods_json: PathBuf::from(DEFAULT_MODS_JSON),
            out_map_csv: PathBuf::from(DEFAULT_MAP_CSV),
            hierarchy_id: DEFAULT_HIERARCHY_ID,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            modifier_class_floor: DEFAULT_MODIFIER_CLASS_FLOOR,
            modifier_class_ceiling: DEFAULT_MODIFIER_CLASS_CEILING,
            group_header_prefix: DEFAULT_GROUP_HEADER_PREFIX.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fuzzy_threshold.is_finite() || !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(CatalogError::Config(format!(
                "fuzzy_threshold must be within [0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.modifier_class_floor >= self.modifier_class_ceiling {
            return Err(CatalogError::Config(format!(
                "modifier_class_floor ({}) must be below modifier_class_ceiling ({})",
                self.modifier_class_floor, self.modifier_class_ceiling
            )));
        }
        if self.modifier_class_ceiling.checked_sub(self.modifier_class_floor).is_none() {
            return Err(CatalogError::Config(format!(
                "modifier class range {}..{} is too wide",
                self.modifier_class_floor, self.modifier_class_ceiling
            )));
        }
        if self.group_header_prefix.trim().is_empty() {
            return Err(CatalogError::Config("group_header_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Class codes whose definitions are bucketed into modifier groups
    pub fn modifier_range(&self) -> Range<i64> {
        self.modifier_class_floor..self.modifier_class_ceiling
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            items_json: self.out_items_json.clone(),
            mods_json: self.out_mods_json.clone(),
            map_csv: self.out_map_csv.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load from `path`, or from `config.toml` when no path is given. A
    /// missing default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", config_path.display(), e))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
