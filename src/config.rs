//! Findr configuration module.
//!
//! Handles loading, validating, and merging `findr.toml`. User files are
//! sparse: stock defaults are the base layer and only the keys present in the
//! file override them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Geoguessr Bollard Findr"
//! catalog = "bollards.yaml"   # Path or http(s) URL of the catalog document
//! base_path = ""              # Deployment prefix for the catalog and assets
//! image_dir = "images"        # Directory that catalog `src` values live in
//!
//! [[facets]]
//! key = "colors"              # Key in the catalog document
//! label = "Color"             # Heading shown in the filter sidebar
//! match = "all"               # all = item has every selected value
//! containment = "exact"       # exact | substring
//!
//! [[facets]]
//! key = "continent"
//! label = "Continent"
//! match = "any"               # any = item has one of the selected values
//!
//! [[facets]]
//! key = "side"
//! label = "Side"
//! match = "any"
//! ```
//!
//! ## Overrides
//!
//! `facets` is an array, so a file that declares any `[[facets]]` replaces the
//! whole stock list. The `FINDR_BASE_PATH` environment variable, when set,
//! replaces `base_path` after the file is merged.
//!
//! Unknown keys are rejected to catch typos early.

use crate::facets::{self, FacetSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable that overrides [`FindrConfig::base_path`].
pub const BASE_PATH_ENV: &str = "FINDR_BASE_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `findr.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FindrConfig {
    /// Page title.
    pub title: String,
    /// Location of the catalog document: a path or an http(s) URL.
    pub catalog: String,
    /// Deployment prefix applied to the catalog location and image assets.
    pub base_path: String,
    /// Directory, relative to `base_path`, that image `src` values resolve in.
    pub image_dir: String,
    /// Active facet dimensions, in sidebar order.
    pub facets: Vec<FacetSpec>,
}

impl Default for FindrConfig {
    fn default() -> Self {
        Self {
            title: "Geoguessr Bollard Findr".to_string(),
            catalog: "bollards.yaml".to_string(),
            base_path: String::new(),
            image_dir: "images".to_string(),
            facets: facets::default_specs(),
        }
    }
}

impl FindrConfig {
    /// Validate that the config describes a usable page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.trim().is_empty() {
            return Err(ConfigError::Validation("catalog must not be empty".into()));
        }
        let mut seen = BTreeSet::new();
        for spec in &self.facets {
            if spec.key.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "facets.key must not be empty".into(),
                ));
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "facet '{}' is declared more than once",
                    spec.key
                )));
            }
        }
        Ok(())
    }

    /// Replace `base_path` when an override is present.
    pub fn with_base_path_override(mut self, value: Option<String>) -> Self {
        if let Some(base_path) = value {
            self.base_path = base_path;
        }
        self
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FindrConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<FindrConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FindrConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `findr.toml` from `path`, falling back to stock defaults when it is
/// missing, and apply the `FINDR_BASE_PATH` override.
pub fn load_config(path: &Path) -> Result<FindrConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    let config = resolve_config(overlay)?;
    Ok(config.with_base_path_override(std::env::var(BASE_PATH_ENV).ok()))
}

/// Returns a fully-commented stock `findr.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Bollard Findr Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Page title.
title = "Geoguessr Bollard Findr"

# Catalog document: a local path or an http(s) URL.
# The format follows the extension: .yaml/.yml, .json or .toml
# (anything else is read as YAML).
catalog = "bollards.yaml"

# Deployment prefix, prepended to the catalog location (unless it is a URL)
# and to every image. Overridden by the FINDR_BASE_PATH environment variable.
base_path = ""

# Directory the catalog's `src` values are resolved in.
image_dir = "images"

# ---------------------------------------------------------------------------
# Facets
# ---------------------------------------------------------------------------
# One [[facets]] entry per filter dimension, in sidebar order.
# Declaring any [[facets]] replaces this whole list.
#
#   key          key of the dimension in the catalog document
#   label        heading shown above the checkboxes (defaults to key)
#   match        "all": an image must carry every selected value
#                "any": an image must carry at least one selected value
#   containment  "exact": values compare by equality
#                "substring": a selected value matches any value containing it

[[facets]]
key = "colors"
label = "Color"
match = "all"
containment = "exact"

[[facets]]
key = "continent"
label = "Continent"
match = "any"
containment = "exact"

[[facets]]
key = "side"
label = "Side"
match = "any"
containment = "exact"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::{Containment, MatchMode};
    use tempfile::TempDir;

    #[test]
    fn default_config_has_stock_facets() {
        let config = FindrConfig::default();
        let keys: Vec<&str> = config.facets.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["colors", "continent", "side"]);
        assert_eq!(config.facets[0].match_mode, MatchMode::All);
        assert_eq!(config.facets[1].match_mode, MatchMode::Any);
        assert_eq!(config.catalog, "bollards.yaml");
        assert_eq!(config.image_dir, "images");
        assert!(config.base_path.is_empty());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = resolve_config(load_raw_config(&tmp.path().join("findr.toml")).unwrap()).unwrap();
        assert_eq!(config, FindrConfig::default());
    }

    #[test]
    fn load_config_reads_sparse_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("findr.toml");
        fs::write(&path, "catalog = \"https://example.org/bollards.json\"\n").unwrap();

        let config = resolve_config(load_raw_config(&path).unwrap()).unwrap();
        assert_eq!(config.catalog, "https://example.org/bollards.json");
        // Defaults preserved
        assert_eq!(config.image_dir, "images");
        assert_eq!(config.facets.len(), 3);
    }

    #[test]
    fn declared_facets_replace_stock_list() {
        let overlay: toml::Value = toml::from_str(
            r#"
[[facets]]
key = "side"
match = "all"
containment = "substring"
"#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.facets.len(), 1);
        assert_eq!(config.facets[0].key, "side");
        assert_eq!(config.facets[0].match_mode, MatchMode::All);
        assert_eq!(config.facets[0].containment, Containment::Substring);
        assert_eq!(config.facets[0].display_label(), "side");
    }

    #[test]
    fn facet_match_defaults_to_all_exact() {
        let overlay: toml::Value = toml::from_str("[[facets]]\nkey = \"material\"\n").unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.facets[0].match_mode, MatchMode::All);
        assert_eq!(config.facets[0].containment, Containment::Exact);
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("findr.toml");
        fs::write(&path, "catalog = [unclosed").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("catalogue = \"x.yaml\"").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn unknown_facet_key_rejected() {
        let overlay: toml::Value =
            toml::from_str("[[facets]]\nkey = \"side\"\nmode = \"any\"\n").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn unknown_match_mode_rejected() {
        let overlay: toml::Value =
            toml::from_str("[[facets]]\nkey = \"side\"\nmatch = \"some\"\n").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn validate_duplicate_facet() {
        let mut config = FindrConfig::default();
        config.facets.push(FacetSpec::new("colors", MatchMode::Any));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("colors"));
    }

    #[test]
    fn validate_empty_facet_key() {
        let mut config = FindrConfig::default();
        config.facets.push(FacetSpec::new(" ", MatchMode::Any));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_catalog() {
        let config = FindrConfig {
            catalog: String::new(),
            ..FindrConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(FindrConfig::default().validate().is_ok());
    }

    #[test]
    fn base_path_override() {
        let config = FindrConfig::default().with_base_path_override(Some("/findr".into()));
        assert_eq!(config.base_path, "/findr");
        let config = config.with_base_path_override(None);
        assert_eq!(config.base_path, "/findr");
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"image_dir = "images""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"image_dir = "photos""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("image_dir").unwrap().as_str(), Some("photos"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[[facets]]\nkey = \"side\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("facets").unwrap().as_array().unwrap().len(), 1);
        assert!(merged.get("catalog").is_some());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: FindrConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, FindrConfig::default());
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("facets").is_some());
    }
}
